// src/build/mod.rs

//! Build results produced by the bundler on every rebuild.

pub mod stats;

pub use stats::{Asset, BuildResult, EntryPoint, Problem};
