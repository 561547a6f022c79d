// src/watch/mod.rs

//! File watching and the command-driven build engine.
//!
//! This module is responsible for:
//! - Compiling `watch` / `exclude` glob patterns from `[engine]`.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Running the bundler after each relevant change and turning its JSON
//!   stats into build events for the controller.

pub mod engine;
pub mod path_utils;
pub mod patterns;

pub use engine::{is_source_change, parse_stats, run_build, BuildJob, CommandEngine};
pub use patterns::WatchFilter;
