// src/config/model.rs

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::errors::Result;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [engine]
/// command = "npx webpack --json"
/// watch = ["src/**/*.js"]
/// exclude = ["**/*.tmp.js"]
///
/// [run]
/// runtime = "node"
///
/// [[target]]
/// context = ""
/// [target.output]
/// path = "dist"
/// filename = "[name].js"
/// ```
///
/// Targets come either from the static `[[target]]` list or from the stdout of
/// the `targets_from` command (JSON), never both.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub run: RunSection,

    /// All build targets from `[[target]]`, in file order.
    #[serde(default)]
    pub target: Vec<BuildTarget>,

    /// Command printing the build targets as JSON on stdout.
    #[serde(default)]
    pub targets_from: Option<String>,
}

/// `[engine]` section: how to run the bundler and which files trigger a
/// rebuild.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    /// Build command; must print the bundler's JSON stats on stdout.
    #[serde(default = "default_engine_command")]
    pub command: String,

    /// Glob patterns (relative to the config directory) that trigger a rebuild.
    #[serde(default = "default_watch")]
    pub watch: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,

    /// Quiet period after a change before the rebuild starts.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_engine_command() -> String {
    "npx webpack --json".to_string()
}

fn default_watch() -> Vec<String> {
    vec!["**/*".to_string()]
}

fn default_debounce_ms() -> u64 {
    100
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            command: default_engine_command(),
            watch: default_watch(),
            exclude: Vec::new(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// `[run]` section: how a built artifact is executed when no override command
/// is given on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunSection {
    #[serde(default = "default_runtime")]
    pub runtime: String,

    /// Flag telling the runtime to evaluate its next argument as a program.
    #[serde(default = "default_inline_flag")]
    pub inline_flag: String,
}

fn default_runtime() -> String {
    "node".to_string()
}

fn default_inline_flag() -> String {
    "-e".to_string()
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            runtime: default_runtime(),
            inline_flag: default_inline_flag(),
        }
    }
}

/// One bundler configuration entry.
///
/// Shaped like a bundler config object so that JSON printed by a
/// `targets_from` command deserializes directly; unknown keys (`entry`,
/// `externals`, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildTarget {
    /// Base directory for resolving relative output paths.
    #[serde(default)]
    pub context: String,

    pub output: OutputSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputSection {
    pub path: String,

    #[serde(default = "default_filename")]
    pub filename: String,
}

fn default_filename() -> String {
    "[name].js".to_string()
}

impl BuildTarget {
    pub fn new(context: impl Into<String>, output_path: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            output: OutputSection {
                path: output_path.into(),
                filename: default_filename(),
            },
        }
    }
}

/// The resolved set of build targets for one watch session.
///
/// Only the first target's output settings are used to locate the artifact to
/// run; the rest matter for reporting and for the engine's output handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfiguration {
    targets: Vec<BuildTarget>,
}

impl BuildConfiguration {
    pub fn new(targets: Vec<BuildTarget>) -> Self {
        Self { targets }
    }

    pub fn single(target: BuildTarget) -> Self {
        Self::new(vec![target])
    }

    pub fn first(&self) -> Option<&BuildTarget> {
        self.targets.first()
    }

    pub fn targets(&self) -> &[BuildTarget] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Where build targets come from before they are resolved.
pub enum ConfigSource {
    Static(BuildConfiguration),
    Factory(Box<dyn FnOnce() -> anyhow::Result<BuildConfiguration> + Send>),
}

impl fmt::Debug for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Static(cfg) => f.debug_tuple("Static").field(cfg).finish(),
            ConfigSource::Factory(_) => f.debug_tuple("Factory").finish_non_exhaustive(),
        }
    }
}

impl ConfigSource {
    /// Evaluate the source once and validate the resulting targets.
    pub fn resolve(self) -> Result<BuildConfiguration> {
        let build = match self {
            ConfigSource::Static(build) => build,
            ConfigSource::Factory(factory) => factory().map_err(|e| {
                crate::errors::LivebuildError::ConfigError(format!(
                    "configuration factory failed: {e:#}"
                ))
            })?,
        };
        crate::config::validate::validate_build(&build)?;
        Ok(build)
    }
}

/// Validated configuration with targets already resolved.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub engine: EngineSection,
    pub run: RunSection,
    pub build: BuildConfiguration,
}

impl ConfigFile {
    /// Validate a raw config and resolve its target source.
    ///
    /// `root` is the directory a `targets_from` command runs in.
    pub fn resolve(raw: RawConfigFile, root: &Path) -> Result<Self> {
        crate::config::validate::validate_raw(&raw)?;

        let source = match raw.targets_from {
            Some(command) => crate::config::loader::factory_source(command, root.to_path_buf()),
            None => ConfigSource::Static(BuildConfiguration::new(raw.target)),
        };

        Ok(Self {
            engine: raw.engine,
            run: raw.run,
            build: source.resolve()?,
        })
    }
}
