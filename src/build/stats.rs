// src/build/stats.rs

//! Structured build summary as emitted by the bundler's `--json` stats.
//!
//! Only the fields the controller and the report formatter need are modelled;
//! everything else in the stats document is ignored.

use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;

/// One build snapshot. Multi-target builds carry one child per target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BuildResult {
    /// Elapsed build time in milliseconds.
    #[serde(default)]
    pub time: u64,

    #[serde(default)]
    pub hash: String,

    #[serde(default)]
    pub errors: Vec<Problem>,

    #[serde(default)]
    pub warnings: Vec<Problem>,

    /// Entry points in the order the bundler listed them.
    #[serde(default, deserialize_with = "ordered_entrypoints")]
    pub entrypoints: Vec<EntryPoint>,

    #[serde(default)]
    pub assets: Vec<Asset>,

    #[serde(default)]
    pub children: Vec<BuildResult>,
}

impl BuildResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty() || self.children.iter().any(BuildResult::has_errors)
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty() || self.children.iter().any(BuildResult::has_warnings)
    }

    /// Errors of this result followed by those of every child.
    pub fn all_errors(&self) -> Vec<&Problem> {
        let mut out: Vec<&Problem> = self.errors.iter().collect();
        for child in &self.children {
            out.extend(child.all_errors());
        }
        out
    }

    pub fn all_warnings(&self) -> Vec<&Problem> {
        let mut out: Vec<&Problem> = self.warnings.iter().collect();
        for child in &self.children {
            out.extend(child.all_warnings());
        }
        out
    }

    /// The result used for artifact resolution: the first child when present.
    pub fn primary(&self) -> &BuildResult {
        self.children.first().unwrap_or(self)
    }

    /// Results rendered in the build report: every child, or `self` alone.
    pub fn parts(&self) -> Vec<&BuildResult> {
        if self.children.is_empty() {
            vec![self]
        } else {
            self.children.iter().collect()
        }
    }

    /// First asset of the first entry point of the primary result.
    pub fn first_entry_asset(&self) -> Option<&str> {
        self.primary()
            .entrypoints
            .first()
            .and_then(|ep| ep.assets.first())
            .map(String::as_str)
    }

    pub fn emitted_assets(&self) -> impl Iterator<Item = &Asset> {
        self.assets.iter().filter(|a| a.emitted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    pub name: String,
    pub assets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Asset {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub emitted: bool,
}

/// A build error or warning.
///
/// Older bundlers report plain strings, newer ones objects with a `message`
/// and the offending module.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawProblem")]
pub struct Problem {
    pub module: Option<String>,
    pub message: String,
}

impl Problem {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            module: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.module {
            Some(module) => write!(f, "{module}\n{}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawProblem {
    Text(String),
    Detailed {
        message: String,
        #[serde(default, rename = "moduleName")]
        module_name: Option<String>,
    },
}

impl From<RawProblem> for Problem {
    fn from(raw: RawProblem) -> Self {
        match raw {
            RawProblem::Text(message) => Problem {
                module: None,
                message,
            },
            RawProblem::Detailed {
                message,
                module_name,
            } => Problem {
                module: module_name,
                message,
            },
        }
    }
}

/// Entry point assets are plain names in older stats and `{ name, size }`
/// objects in newer ones.
#[derive(Deserialize)]
#[serde(untagged)]
enum AssetRef {
    Name(String),
    Object { name: String },
}

impl AssetRef {
    fn into_name(self) -> String {
        match self {
            AssetRef::Name(name) | AssetRef::Object { name } => name,
        }
    }
}

#[derive(Deserialize)]
struct RawEntryPoint {
    #[serde(default)]
    assets: Vec<AssetRef>,
}

/// Deserialize the `entrypoints` object into a list, keeping document order.
fn ordered_entrypoints<'de, D>(deserializer: D) -> Result<Vec<EntryPoint>, D::Error>
where
    D: Deserializer<'de>,
{
    struct EntryPointsVisitor;

    impl<'de> Visitor<'de> for EntryPointsVisitor {
        type Value = Vec<EntryPoint>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of entry point name to entry point")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut out = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, raw)) = map.next_entry::<String, RawEntryPoint>()? {
                out.push(EntryPoint {
                    name,
                    assets: raw.assets.into_iter().map(AssetRef::into_name).collect(),
                });
            }
            Ok(out)
        }
    }

    deserializer.deserialize_map(EntryPointsVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multi_target_stats_in_document_order() {
        let json = r#"{
            "hash": "abc",
            "time": 10,
            "errors": [],
            "warnings": [],
            "children": [
                {
                    "hash": "c1",
                    "time": 4,
                    "entrypoints": {
                        "zeta": { "assets": ["zeta.js"] },
                        "alpha": { "assets": [{ "name": "alpha.js", "size": 12 }] }
                    },
                    "assets": [
                        { "name": "zeta.js", "size": 120, "emitted": true },
                        { "name": "alpha.js", "size": 12, "emitted": false }
                    ]
                },
                {
                    "hash": "c2",
                    "entrypoints": { "bar": { "assets": ["bar.js"] } },
                    "assets": [{ "name": "bar.js", "size": 7, "emitted": true }]
                }
            ]
        }"#;

        let stats: BuildResult = serde_json::from_str(json).unwrap();
        assert_eq!(stats.children.len(), 2);
        let names: Vec<_> = stats.primary().entrypoints.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(stats.first_entry_asset(), Some("zeta.js"));
        assert_eq!(stats.primary().entrypoints[1].assets, vec!["alpha.js".to_string()]);
        assert_eq!(stats.parts().len(), 2);
    }

    #[test]
    fn child_errors_count_as_errors() {
        let json = r#"{
            "children": [
                { "errors": [] },
                { "errors": [{ "moduleName": "./index2.js", "message": "Module not found" }] }
            ]
        }"#;

        let stats: BuildResult = serde_json::from_str(json).unwrap();
        assert!(stats.has_errors());
        assert!(!stats.has_warnings());
        let errors = stats.all_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "./index2.js\nModule not found");
    }

    #[test]
    fn string_problems_and_missing_fields_default() {
        let stats: BuildResult =
            serde_json::from_str(r#"{ "warnings": ["size limit exceeded"] }"#).unwrap();
        assert!(stats.has_warnings());
        assert_eq!(stats.warnings[0], Problem::new("size limit exceeded"));
        assert_eq!(stats.time, 0);
        assert!(stats.first_entry_asset().is_none());
    }

    #[test]
    fn emitted_assets_skip_cached_outputs() {
        let stats = BuildResult {
            assets: vec![
                Asset { name: "a.js".into(), size: 1, emitted: true },
                Asset { name: "b.js".into(), size: 2, emitted: false },
            ],
            ..Default::default()
        };
        let names: Vec<_> = stats.emitted_assets().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["a.js"]);
    }
}
