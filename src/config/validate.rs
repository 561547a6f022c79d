// src/config/validate.rs

use globset::Glob;

use crate::config::model::{BuildConfiguration, RawConfigFile};
use crate::errors::{LivebuildError, Result};

/// Checks that can run before the target source is evaluated.
pub fn validate_raw(cfg: &RawConfigFile) -> Result<()> {
    validate_target_source(cfg)?;
    validate_engine(cfg)?;
    validate_run(cfg)?;
    Ok(())
}

/// Checks on the resolved targets, whichever source they came from.
pub fn validate_build(build: &BuildConfiguration) -> Result<()> {
    if build.is_empty() {
        return Err(LivebuildError::ConfigError(
            "config must define at least one build target".to_string(),
        ));
    }

    for (idx, target) in build.targets().iter().enumerate() {
        if target.output.path.trim().is_empty() {
            return Err(LivebuildError::ConfigError(format!(
                "target #{} has an empty output.path",
                idx + 1
            )));
        }
    }

    Ok(())
}

fn validate_target_source(cfg: &RawConfigFile) -> Result<()> {
    match (&cfg.targets_from, cfg.target.is_empty()) {
        (Some(_), false) => Err(LivebuildError::ConfigError(
            "use either [[target]] sections or `targets_from`, not both".to_string(),
        )),
        (None, true) => Err(LivebuildError::ConfigError(
            "config must contain at least one [[target]] section or a `targets_from` command"
                .to_string(),
        )),
        (Some(cmd), true) if cmd.trim().is_empty() => Err(LivebuildError::ConfigError(
            "`targets_from` must not be empty".to_string(),
        )),
        _ => Ok(()),
    }
}

fn validate_engine(cfg: &RawConfigFile) -> Result<()> {
    if cfg.engine.command.trim().is_empty() {
        return Err(LivebuildError::ConfigError(
            "[engine].command must not be empty".to_string(),
        ));
    }

    for pattern in cfg.engine.watch.iter().chain(cfg.engine.exclude.iter()) {
        Glob::new(pattern).map_err(|e| {
            LivebuildError::ConfigError(format!("invalid glob '{pattern}' in [engine]: {e}"))
        })?;
    }

    Ok(())
}

fn validate_run(cfg: &RawConfigFile) -> Result<()> {
    if cfg.run.runtime.trim().is_empty() {
        return Err(LivebuildError::ConfigError(
            "[run].runtime must not be empty".to_string(),
        ));
    }
    if cfg.run.inline_flag.trim().is_empty() {
        return Err(LivebuildError::ConfigError(
            "[run].inline_flag must not be empty".to_string(),
        ));
    }
    Ok(())
}
