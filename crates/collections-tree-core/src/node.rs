//! File and folder node types.

use std::collections::{BTreeMap, HashMap};

use compact_str::CompactString;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::Display;

/// Arbitrary metadata attached to a source path.
pub type Record = Map<String, Value>;

/// Record keys the builder always owns.
pub const PROTECTED_KEYS: [&str; 6] = ["type", "path", "basename", "name", "children", "extension"];

/// Source of per-path metadata records.
pub trait MetadataLookup {
    /// Get the record for a source path.
    fn record(&self, path: &str) -> Option<&Record>;
}

impl MetadataLookup for HashMap<String, Record> {
    fn record(&self, path: &str) -> Option<&Record> {
        self.get(path)
    }
}

impl MetadataLookup for IndexMap<String, Record> {
    fn record(&self, path: &str) -> Option<&Record> {
        self.get(path)
    }
}

impl MetadataLookup for BTreeMap<String, Record> {
    fn record(&self, path: &str) -> Option<&Record> {
        self.get(path)
    }
}

/// Type of tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// A file, always a leaf unless a later path descends through it.
    File,
    /// A folder.
    Folder,
}

/// A single file or folder in a collection tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Segment name without its extension.
    pub name: CompactString,

    /// Same as `name`; both are kept for templates that use either.
    pub basename: CompactString,

    /// Display title.
    pub title: String,

    /// Extension of a file node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<CompactString>,

    /// Node type.
    #[serde(rename = "type")]
    pub kind: NodeType,

    /// Path used to reach this node.
    pub path: String,

    /// Children in first-occurrence order.
    #[serde(default)]
    pub children: Vec<TreeNode>,

    /// Extra fields merged from the source record.
    #[serde(flatten)]
    pub extra: Record,
}

impl TreeNode {
    /// Create a new file node.
    pub fn new_file(
        basename: impl Into<CompactString>,
        extension: impl Into<CompactString>,
        path: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        let basename = basename.into();
        Self {
            name: basename.clone(),
            basename,
            title: title.into(),
            extension: Some(extension.into()),
            kind: NodeType::File,
            path: path.into(),
            children: Vec::new(),
            extra: Record::new(),
        }
    }

    /// Create a new folder node.
    pub fn new_folder(
        basename: impl Into<CompactString>,
        path: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        let basename = basename.into();
        Self {
            name: basename.clone(),
            basename,
            title: title.into(),
            extension: None,
            kind: NodeType::Folder,
            path: path.into(),
            children: Vec::new(),
            extra: Record::new(),
        }
    }

    /// Check if this node is a file.
    pub fn is_file(&self) -> bool {
        self.kind == NodeType::File
    }

    /// Check if this node is a folder.
    pub fn is_folder(&self) -> bool {
        self.kind == NodeType::Folder
    }

    /// Merge a source record onto this node.
    ///
    /// A string `title` replaces the derived title. Protected keys are
    /// ignored; every other field is copied into `extra`, replacing any
    /// earlier value under the same key.
    pub fn merge_record(&mut self, record: &Record) {
        for (key, value) in record {
            if PROTECTED_KEYS.contains(&key.as_str()) {
                continue;
            }
            if key == "title" {
                if let Value::String(title) = value {
                    self.title.clone_from(title);
                }
                continue;
            }
            self.extra.insert(key.clone(), value.clone());
        }
    }
}
