//! Collection manifests and per-collection tree builds for collections-tree.
//!
//! # Overview
//!
//! `collections-tree-build` sits between a site build and the tree builder
//! in `collections-tree-core`. It:
//!
//! - **Loads manifests**: the file table plus named collections, from JSON
//! - **Extracts paths** from collection records through the sort key
//! - **Builds one forest per collection**, plus the `all` aggregate
//! - **Skips the pass** when no collections data exists, logging a warning
//!
//! # Example
//!
//! ```rust
//! use collections_tree_build::{Manifest, TreeOptions, build_trees};
//!
//! let manifest = Manifest::from_json_str(r#"{
//!     "files": { "articles/one.md": {}, "articles/two.md": {} },
//!     "collections": { "articles": [{ "path": "articles/one.md" }] }
//! }"#).unwrap();
//!
//! let outcome = build_trees(&manifest, TreeOptions::default()).unwrap();
//! let all = outcome.tree("all").unwrap();
//! assert_eq!(all.roots()[0].children.len(), 2);
//! ```

mod manifest;
mod stage;

pub use manifest::{Manifest, ManifestError, ManifestLookup, collection_paths, load_options};
pub use stage::{ALL_KEY, METADATA_KEY, TreeMap, TreeOutcome, TreeStage, build_trees};

// Re-export core types for convenience
pub use collections_tree_core::{
    BuildWarning, FileRule, Forest, ForestStats, NodeType, Record, TreeBuilder, TreeError,
    TreeNode, TreeOptions, WarningKind,
};
