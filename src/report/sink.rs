// src/report/sink.rs

//! Output sinks for everything the user sees on the terminal.
//!
//! Diagnostics go through `tracing` (stderr). The sinks here carry the
//! user-facing stream: status lines, build reports, build problems and the
//! child process's own output.

use std::io::{self, Write};

use owo_colors::{OwoColorize, Stream};

/// Destination for user-facing output.
///
/// Shared between the controller and the tasks forwarding a child's output,
/// hence `Send + Sync`.
pub trait Reporter: Send + Sync {
    fn info(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);
    /// Plain, uncoloured text (build reports).
    fn report(&self, text: &str);
    /// Raw bytes from the child's stdout, written verbatim.
    fn child_output(&self, bytes: &[u8]);
}

/// Writes everything to stdout: info green, warnings yellow, errors red.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }

    /// Reset the terminal and print the exit hint.
    pub fn clear_console(&self) {
        self.write_raw(b"\x1bc");
        self.info("⌃C to exit.");
    }

    fn write_raw(&self, bytes: &[u8]) {
        let mut out = io::stdout().lock();
        // A closed stdout leaves nothing useful to do with the error.
        let _ = out.write_all(bytes);
        let _ = out.flush();
    }

    fn write_line(&self, line: &str) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{line}");
        let _ = out.flush();
    }
}

impl Reporter for ConsoleReporter {
    fn info(&self, message: &str) {
        self.write_line(&format!(
            "{}",
            message.if_supports_color(Stream::Stdout, |s| s.green())
        ));
    }

    fn warning(&self, message: &str) {
        self.write_line(&format!(
            "{}",
            message.if_supports_color(Stream::Stdout, |s| s.yellow())
        ));
    }

    fn error(&self, message: &str) {
        self.write_line(&format!(
            "{}",
            message.if_supports_color(Stream::Stdout, |s| s.red())
        ));
    }

    fn report(&self, text: &str) {
        self.write_raw(text.as_bytes());
    }

    fn child_output(&self, bytes: &[u8]) {
        self.write_raw(bytes);
    }
}
