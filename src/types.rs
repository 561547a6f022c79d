// src/types.rs

use std::fmt;

/// A program plus its ordered argument list.
///
/// Either supplied once on the command line (after `--`) and reused for every
/// build, or derived afresh from each build result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteCommand {
    pub command: String,
    pub args: Vec<String>,
}

impl ExecuteCommand {
    pub fn new<I, S>(command: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a command from a raw argv (`["python", "run.py"]`).
    ///
    /// Returns `None` for an empty argv so callers can fall back to the
    /// default command.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (command, args) = argv.split_first()?;
        Some(Self {
            command: command.clone(),
            args: args.to_vec(),
        })
    }
}

impl fmt::Display for ExecuteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command)?;
        for arg in &self.args {
            // Inline programs can be large; keep log lines readable.
            if arg.len() > 60 || arg.contains('\n') {
                write!(f, " <{} bytes>", arg.len())?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}
