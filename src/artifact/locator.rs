// src/artifact/locator.rs

//! Find the artifact a successful build should run.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::build::BuildResult;
use crate::config::BuildConfiguration;
use crate::errors::{LivebuildError, Result};
use crate::store::ArtifactStore;

/// The located entry artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactRef {
    /// Absolute path of the artifact on disk.
    File(PathBuf),
    /// The artifact's source text, read from the in-memory store.
    Inline(String),
}

/// Resolves the primary entry artifact of a build.
#[derive(Debug, Clone)]
pub struct ArtifactLocator {
    base_dir: PathBuf,
    store: Arc<dyn ArtifactStore>,
    in_memory: bool,
}

impl ArtifactLocator {
    /// `base_dir` is the directory the bundler runs in; relative contexts and
    /// output paths are resolved against it.
    pub fn new(base_dir: impl Into<PathBuf>, store: Arc<dyn ArtifactStore>, in_memory: bool) -> Self {
        Self {
            base_dir: base_dir.into(),
            store,
            in_memory,
        }
    }

    pub fn locate(&self, config: &BuildConfiguration, result: &BuildResult) -> Result<ArtifactRef> {
        let path = artifact_path(&self.base_dir, config, result)?;

        if !self.in_memory {
            return Ok(ArtifactRef::File(path));
        }

        debug!(path = ?path, "reading artifact from in-memory store");
        let bytes = self.store.read(&path)?;
        let source = String::from_utf8(bytes).map_err(|_| LivebuildError::StoreRead(path))?;
        Ok(ArtifactRef::Inline(source))
    }
}

/// Absolute path of the first entry point's first asset, placed in the first
/// target's output directory.
pub fn artifact_path(
    base_dir: &Path,
    config: &BuildConfiguration,
    result: &BuildResult,
) -> Result<PathBuf> {
    let target = config.first().ok_or_else(|| {
        LivebuildError::ArtifactNotFound("configuration has no build targets".to_string())
    })?;

    let asset = result.first_entry_asset().ok_or_else(|| {
        LivebuildError::ArtifactNotFound(format!(
            "build {} reported no entry point assets",
            result.primary().hash
        ))
    })?;

    Ok(resolve_path(
        base_dir,
        [target.context.as_str(), target.output.path.as_str(), asset],
    ))
}

/// Join `segments` onto `base` the way a shell `cd` chain would: an absolute
/// segment restarts from itself, empty segments are skipped, and `.`/`..` are
/// collapsed lexically.
pub fn resolve_path<'a>(base: &Path, segments: impl IntoIterator<Item = &'a str>) -> PathBuf {
    let mut joined = base.to_path_buf();
    for segment in segments {
        if !segment.is_empty() {
            joined.push(segment);
        }
    }
    normalize(&joined)
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `/..` stays `/`.
                if !out.pop() && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
