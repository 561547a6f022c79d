// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, bail};
use serde::Deserialize;
use tracing::debug;

use crate::config::model::{BuildConfiguration, BuildTarget, ConfigFile, ConfigSource, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** validate anything
/// or run a `targets_from` command. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path, validate it and resolve its targets.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` default functions).
/// - Checks engine/run settings and glob patterns.
/// - Evaluates the target source (static list or `targets_from` command) once.
pub fn load_and_validate(path: impl AsRef<Path>, root: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    ConfigFile::resolve(raw_config, root.as_ref())
}

/// A bundler config module may export one entry or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(BuildTarget),
    Many(Vec<BuildTarget>),
}

/// Build a [`ConfigSource::Factory`] that runs `command` in `root` and parses
/// its stdout as JSON build targets.
pub fn factory_source(command: String, root: PathBuf) -> ConfigSource {
    ConfigSource::Factory(Box::new(move || run_targets_command(&command, &root)))
}

fn run_targets_command(command: &str, root: &Path) -> anyhow::Result<BuildConfiguration> {
    debug!(cmd = %command, root = ?root, "evaluating targets_from command");

    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        c
    };

    let output = cmd
        .current_dir(root)
        .output()
        .with_context(|| format!("running targets_from command `{command}`"))?;

    if !output.status.success() {
        bail!(
            "`{command}` exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let parsed: OneOrMany = serde_json::from_slice(&output.stdout)
        .with_context(|| format!("parsing targets printed by `{command}`"))?;

    let targets = match parsed {
        OneOrMany::One(target) => vec![target],
        OneOrMany::Many(targets) => targets,
    };

    Ok(BuildConfiguration::new(targets))
}
