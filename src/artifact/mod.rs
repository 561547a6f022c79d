// src/artifact/mod.rs

//! From a build result to the command that runs it.
//!
//! - [`locator`] finds the primary entry artifact (on disk or in memory).
//! - [`resolver`] turns it into an `ExecuteCommand`, unless the user gave
//!   their own command.

pub mod locator;
pub mod resolver;

pub use locator::{artifact_path, resolve_path, ArtifactLocator, ArtifactRef};
pub use resolver::CommandResolver;
