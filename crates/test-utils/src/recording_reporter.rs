use std::sync::Mutex;

use livebuild::report::Reporter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sink {
    Info,
    Warning,
    Error,
    Report,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub sink: Sink,
    pub text: String,
}

/// Reporter that keeps everything it is given, in order.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    lines: Mutex<Vec<Line>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<Line> {
        self.lines.lock().unwrap().clone()
    }

    /// Texts written to `sink`, in order.
    pub fn texts(&self, sink: Sink) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|l| l.sink == sink)
            .map(|l| l.text)
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.texts(Sink::Error)
    }

    pub fn warnings(&self) -> Vec<String> {
        self.texts(Sink::Warning)
    }

    pub fn reports(&self) -> Vec<String> {
        self.texts(Sink::Report)
    }

    /// Everything the child wrote to stdout, concatenated.
    pub fn child_stdout(&self) -> String {
        self.texts(Sink::Child).concat()
    }

    fn push(&self, sink: Sink, text: String) {
        self.lines.lock().unwrap().push(Line { sink, text });
    }
}

impl Reporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.push(Sink::Info, message.to_string());
    }

    fn warning(&self, message: &str) {
        self.push(Sink::Warning, message.to_string());
    }

    fn error(&self, message: &str) {
        self.push(Sink::Error, message.to_string());
    }

    fn report(&self, text: &str) {
        self.push(Sink::Report, text.to_string());
    }

    fn child_output(&self, bytes: &[u8]) {
        self.push(Sink::Child, String::from_utf8_lossy(bytes).into_owned());
    }
}
