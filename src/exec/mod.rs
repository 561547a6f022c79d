// src/exec/mod.rs

//! Process execution layer.
//!
//! This module runs the built program using `tokio::process::Command` and
//! keeps at most one instance alive.
//!
//! - [`launcher`] provides the `ProcessLauncher`/`ChildHandle` traits and the
//!   production `TokioLauncher`; tests swap in a fake launcher.
//! - [`child`] spawns a single process and forwards its output and exit code.
//! - [`supervisor`] owns the current-child slot and enforces kill-before-spawn.

pub mod child;
pub mod launcher;
pub mod supervisor;

pub use child::{spawn_child, ChildProcess};
pub use launcher::{ChildHandle, ProcessLauncher, TokioLauncher};
pub use supervisor::Supervisor;
