// src/report/mod.rs

//! Build reports and the sinks they are written to.
//!
//! - [`format`] turns a `BuildResult` into text.
//! - [`sink`] defines the `Reporter` trait and the console implementation.

pub mod format;
pub mod sink;

pub use format::{format, format_list, format_problems};
pub use sink::{ConsoleReporter, Reporter};
