//! Core types and the path-to-tree builder for collections-tree.
//!
//! This crate turns ordered lists of slash-delimited paths into forests of
//! folder/file nodes carrying display metadata (basename, title, extension,
//! type), optionally enriched with fields from per-path metadata records.
//!
//! ```
//! use collections_tree_core::{NodeType, TreeBuilder, TreeOptions};
//!
//! let builder = TreeBuilder::new(TreeOptions::passthrough()).unwrap();
//! let forest = builder.build(&["a/b/c.md", "a/b/d.md"], None);
//!
//! let a = &forest.roots()[0];
//! assert_eq!(a.kind, NodeType::Folder);
//! assert_eq!(a.children[0].children.len(), 2);
//! ```

mod builder;
mod config;
mod error;
mod forest;
mod node;
pub mod rewrite;
mod title;

pub use builder::{BuildReport, TreeBuilder, arrange_into_tree};
pub use config::{FileRule, TreeOptions, TreeOptionsBuilder, TreeOptionsBuilderError};
pub use error::{BuildWarning, TreeError, WarningKind};
pub use forest::{Forest, ForestStats};
pub use node::{MetadataLookup, NodeType, PROTECTED_KEYS, Record, TreeNode};
pub use rewrite::{PathRewriter, PatternFormatter, PermalinkFormatter, Unresolved};
pub use title::title_case;
