// src/watch/patterns.rs

use std::fmt;
use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::{BuildConfiguration, EngineSection};
use crate::errors::Result;
use crate::watch::path_utils::relative_str;

/// Compiled watch/exclude glob patterns deciding which changes rebuild.
///
/// The patterns are relative to the project root; the watcher passes relative
/// paths (e.g. `"src/index.js"`) into [`WatchFilter::matches`].
#[derive(Clone)]
pub struct WatchFilter {
    watch_set: GlobSet,
    exclude_set: GlobSet,
}

impl fmt::Debug for WatchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchFilter")
            .field("watch", &self.watch_set.len())
            .field("exclude", &self.exclude_set.len())
            .finish()
    }
}

impl WatchFilter {
    pub fn new(watch: &[String], exclude: &[String]) -> Result<Self> {
        Ok(Self {
            watch_set: build_globset(watch)?,
            exclude_set: build_globset(exclude)?,
        })
    }

    /// Build the filter for an engine session.
    ///
    /// Every target's output directory that lies under `root` is excluded on
    /// top of the configured patterns; otherwise each build would trigger the
    /// next one.
    pub fn for_session(engine: &EngineSection, build: &BuildConfiguration, root: &Path) -> Result<Self> {
        let mut exclude = engine.exclude.clone();
        exclude.extend(output_dir_excludes(build, root));
        Self::new(&engine.watch, &exclude)
    }

    /// Returns true if a change to `rel_path` should trigger a rebuild.
    pub fn matches(&self, rel_path: &str) -> bool {
        self.watch_set.is_match(rel_path) && !self.exclude_set.is_match(rel_path)
    }
}

fn output_dir_excludes(build: &BuildConfiguration, root: &Path) -> Vec<String> {
    build
        .targets()
        .iter()
        .filter_map(|target| {
            let out = crate::artifact::resolve_path(
                root,
                [target.context.as_str(), target.output.path.as_str()],
            );
            relative_str(root, &out)
        })
        .filter(|rel| !rel.is_empty())
        .flat_map(|rel| {
            // The directory entry itself is created on the first build.
            let dir = escape_glob(&rel);
            [format!("{dir}/**"), dir]
        })
        .collect()
}

fn escape_glob(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    for c in literal.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '{' | '}') {
            out.push('[');
            out.push(c);
            out.push(']');
        } else {
            out.push(c);
        }
    }
    out
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat)?);
    }
    Ok(builder.build()?)
}
