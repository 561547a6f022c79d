#![allow(dead_code)]

use livebuild::build::{Asset, BuildResult, EntryPoint, Problem};
use livebuild::config::{BuildConfiguration, BuildTarget};

/// Builder for `BuildResult` to simplify test setup.
///
/// Starts out as a clean build with hash `"h1"` and time `10`.
pub struct BuildResultBuilder {
    result: BuildResult,
}

impl BuildResultBuilder {
    pub fn new() -> Self {
        Self {
            result: BuildResult {
                time: 10,
                hash: "h1".to_string(),
                ..Default::default()
            },
        }
    }

    pub fn hash(mut self, hash: &str) -> Self {
        self.result.hash = hash.to_string();
        self
    }

    pub fn time(mut self, ms: u64) -> Self {
        self.result.time = ms;
        self
    }

    /// Add an entry point whose assets are `assets`, plus an emitted asset
    /// record for each of them.
    pub fn entry(mut self, name: &str, assets: &[&str]) -> Self {
        self.result.entrypoints.push(EntryPoint {
            name: name.to_string(),
            assets: assets.iter().map(|a| a.to_string()).collect(),
        });
        for asset in assets {
            self = self.asset(asset, 100);
        }
        self
    }

    pub fn asset(mut self, name: &str, size: u64) -> Self {
        self.result.assets.push(Asset {
            name: name.to_string(),
            size,
            emitted: true,
        });
        self
    }

    pub fn error(mut self, message: &str) -> Self {
        self.result.errors.push(Problem::new(message));
        self
    }

    pub fn warning(mut self, message: &str) -> Self {
        self.result.warnings.push(Problem::new(message));
        self
    }

    pub fn child(mut self, child: BuildResult) -> Self {
        self.result.children.push(child);
        self
    }

    pub fn build(self) -> BuildResult {
        self.result
    }
}

impl Default for BuildResultBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A clean build whose only entry point `main` produces `bundle.js`.
pub fn bundle_build(hash: &str) -> BuildResult {
    BuildResultBuilder::new()
        .hash(hash)
        .entry("main", &["bundle.js"])
        .build()
}

/// Single-target configuration writing to `output_path`.
pub fn single_target(output_path: &str) -> BuildConfiguration {
    BuildConfiguration::single(BuildTarget::new("", output_path))
}
