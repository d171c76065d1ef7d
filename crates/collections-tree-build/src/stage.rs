//! Per-collection tree builds.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use collections_tree_core::{BuildWarning, Forest, TreeBuilder, TreeError, TreeOptions};

use crate::manifest::{Manifest, ManifestLookup, collection_paths};

/// Key of the forest built from every file.
pub const ALL_KEY: &str = "all";

/// Metadata key the trees are published under.
pub const METADATA_KEY: &str = "collections-tree";

/// Forests keyed by collection name, `all` first.
pub type TreeMap = IndexMap<String, Forest>;

/// Result of a stage run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeOutcome {
    /// Forest per collection plus the `all` aggregate.
    pub trees: TreeMap,
    /// Skipped entries and other non-fatal conditions.
    pub warnings: Vec<BuildWarning>,
}

impl TreeOutcome {
    /// Check if nothing was built.
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Check if there were any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Forest for one collection.
    pub fn tree(&self, name: &str) -> Option<&Forest> {
        self.trees.get(name)
    }

    /// The trees as a metadata object: `{"collections-tree": {...}}`.
    pub fn to_metadata(&self) -> Result<Value, serde_json::Error> {
        let mut metadata = serde_json::Map::new();
        metadata.insert(METADATA_KEY.to_string(), serde_json::to_value(&self.trees)?);
        Ok(Value::Object(metadata))
    }
}

/// Builds every collection's tree from a manifest.
#[derive(Debug)]
pub struct TreeStage {
    builder: TreeBuilder,
}

impl TreeStage {
    /// Create a stage for the given options.
    pub fn new(options: TreeOptions) -> Result<Self, TreeError> {
        Ok(Self {
            builder: TreeBuilder::new(options)?,
        })
    }

    /// Run the stage.
    ///
    /// Without collections data nothing is built: a warning is logged and
    /// recorded, and the outcome holds no trees.
    pub fn run(&self, manifest: &Manifest) -> TreeOutcome {
        let mut outcome = TreeOutcome::default();

        let Some(collections) = &manifest.collections else {
            warn!("no collections data found, skipping collections-tree");
            outcome.warnings.push(BuildWarning::missing_collections());
            return outcome;
        };

        let sort_key = &self.builder.options().sort_key;
        let lookup = ManifestLookup::new(manifest, sort_key);

        let mut per_collection: Vec<(&str, Vec<&str>)> = Vec::with_capacity(collections.len());
        for (name, entries) in collections {
            let paths = collection_paths(name, entries, sort_key, &mut outcome.warnings);
            per_collection.push((name.as_str(), paths));
        }

        let all_paths: Vec<&str> = if manifest.files.is_empty() {
            per_collection
                .iter()
                .flat_map(|(_, paths)| paths.iter().copied())
                .collect()
        } else {
            manifest.file_paths()
        };

        let mut build = |name: &str, paths: &[&str]| {
            let report = self.builder.build_report(paths, Some(&lookup));
            debug!(
                collection = name,
                paths = paths.len(),
                roots = report.forest.len(),
                "built tree"
            );
            outcome
                .warnings
                .extend(report.warnings.into_iter().map(|w| w.in_collection(name)));
            outcome.trees.insert(name.to_string(), report.forest);
        };

        build(ALL_KEY, &all_paths[..]);
        for (name, paths) in &per_collection {
            if *name == ALL_KEY {
                warn!("collection named {ALL_KEY:?} replaces the aggregate tree");
            }
            build(*name, &paths[..]);
        }

        outcome
    }
}

/// Build every collection's tree in one call.
pub fn build_trees(manifest: &Manifest, options: TreeOptions) -> Result<TreeOutcome, TreeError> {
    Ok(TreeStage::new(options)?.run(manifest))
}

#[cfg(test)]
mod tests {
    use collections_tree_core::WarningKind;
    use serde_json::json;

    use super::*;

    fn manifest(value: Value) -> Manifest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_missing_collections_is_a_noop() {
        let outcome = build_trees(
            &manifest(json!({ "files": { "a.md": {} } })),
            TreeOptions::default(),
        )
        .unwrap();

        assert!(outcome.is_empty());
        assert_eq!(outcome.warnings, vec![BuildWarning::missing_collections()]);
    }

    #[test]
    fn test_all_comes_first() {
        let outcome = build_trees(
            &manifest(json!({
                "files": { "about.md": {}, "articles/one.md": {} },
                "collections": { "articles": [{ "path": "articles/one.md" }] },
            })),
            TreeOptions::passthrough(),
        )
        .unwrap();

        let keys: Vec<_> = outcome.trees.keys().map(String::as_str).collect();
        assert_eq!(keys, [ALL_KEY, "articles"]);
        assert_eq!(outcome.tree(ALL_KEY).unwrap().len(), 2);
        assert_eq!(outcome.tree("articles").unwrap().len(), 1);
    }

    #[test]
    fn test_all_falls_back_to_collections() {
        let outcome = build_trees(
            &manifest(json!({
                "collections": {
                    "a": ["x/1.md"],
                    "b": ["x/2.md", "x/1.md"],
                },
            })),
            TreeOptions::passthrough(),
        )
        .unwrap();

        let all = outcome.tree(ALL_KEY).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all.roots()[0].children.len(), 2);
    }

    #[test]
    fn test_build_warnings_name_their_collection() {
        let outcome = build_trees(
            &manifest(json!({
                "collections": {
                    "a": ["x/1.md", ""],
                    "b": ["", "x/2.md"],
                },
            })),
            TreeOptions::passthrough(),
        )
        .unwrap();

        let subjects: Vec<_> = outcome
            .warnings
            .iter()
            .filter(|w| w.kind == WarningKind::EmptyPath)
            .map(|w| w.subject.as_str())
            .collect();
        assert_eq!(subjects, ["all#1", "all#2", "a#1", "b#0"]);
    }

    #[test]
    fn test_to_metadata() {
        let outcome = build_trees(
            &manifest(json!({ "collections": {} })),
            TreeOptions::default(),
        )
        .unwrap();
        let metadata = outcome.to_metadata().unwrap();
        assert_eq!(metadata, json!({ "collections-tree": { "all": [] } }));
    }
}
