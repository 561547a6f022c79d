// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LivebuildError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid glob pattern: {0}")]
    PatternError(#[from] globset::Error),

    #[error("File watch error: {0}")]
    WatchError(#[from] notify::Error),

    #[error(transparent)]
    Engine(#[from] EngineFailure),

    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("No UTF-8 content in artifact store at {0:?}")]
    StoreRead(PathBuf),

    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// The build engine could not produce a result at all.
///
/// This is distinct from a build that finished with errors: those arrive as a
/// regular `BuildResult` whose error list is non-empty.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct EngineFailure {
    pub message: String,
    /// Extended detail text (e.g. captured stderr of the build command).
    pub details: Option<String>,
}

impl EngineFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        let details = details.into();
        if !details.trim().is_empty() {
            self.details = Some(details);
        }
        self
    }
}

/// An error already shown to the user on the error sink.
///
/// `main` sets the exit code for it without printing it again.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct Reported(pub LivebuildError);

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, LivebuildError>;
