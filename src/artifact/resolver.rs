// src/artifact/resolver.rs

//! Decide which command runs after a successful build.

use crate::artifact::locator::{ArtifactLocator, ArtifactRef};
use crate::build::BuildResult;
use crate::config::{BuildConfiguration, RunSection};
use crate::errors::Result;
use crate::types::ExecuteCommand;

#[derive(Debug, Clone)]
pub struct CommandResolver {
    locator: ArtifactLocator,
    run: RunSection,
    override_command: Option<ExecuteCommand>,
}

impl CommandResolver {
    pub fn new(
        locator: ArtifactLocator,
        run: RunSection,
        override_command: Option<ExecuteCommand>,
    ) -> Self {
        Self {
            locator,
            run,
            override_command,
        }
    }

    /// The user-supplied command, when one was given at startup.
    pub fn override_command(&self) -> Option<&ExecuteCommand> {
        self.override_command.as_ref()
    }

    /// Resolve the command for this build.
    ///
    /// An override always wins and the build result is not inspected at all.
    pub fn resolve(&self, config: &BuildConfiguration, result: &BuildResult) -> Result<ExecuteCommand> {
        if let Some(cmd) = &self.override_command {
            return Ok(cmd.clone());
        }

        let args = match self.locator.locate(config, result)? {
            ArtifactRef::File(path) => vec![path.to_string_lossy().into_owned()],
            ArtifactRef::Inline(source) => vec![self.run.inline_flag.clone(), source],
        };

        Ok(ExecuteCommand {
            command: self.run.runtime.clone(),
            args,
        })
    }
}
