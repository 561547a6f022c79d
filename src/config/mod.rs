// src/config/mod.rs

//! Configuration loading and validation for livebuild.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and evaluate its target source (`loader.rs`).
//! - Validate engine/run settings and build targets (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{
    BuildConfiguration, BuildTarget, ConfigFile, ConfigSource, EngineSection, OutputSection,
    RawConfigFile, RunSection,
};
pub use validate::{validate_build, validate_raw};
