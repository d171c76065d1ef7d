//! Build manifests: the file table and the named collections.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use collections_tree_core::{BuildWarning, MetadataLookup, Record, TreeError, TreeOptions};

/// Errors that can occur while loading a manifest or options file.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Path not found.
    #[error("Manifest not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid JSON for the expected shape.
    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Options file parsed but failed validation.
    #[error(transparent)]
    Options(#[from] TreeError),
}

impl ManifestError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Snapshot of a site build: every file's record plus the named collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Every file keyed by source path, in build order.
    #[serde(default)]
    pub files: IndexMap<String, Record>,

    /// Named collections. Entries are records (the sort key names their
    /// path) or bare path strings. `None` means no collections data exists.
    #[serde(default)]
    pub collections: Option<IndexMap<String, Vec<Value>>>,
}

impl Manifest {
    /// Parse a manifest from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a manifest from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ManifestError::io(path, e))?;
        serde_json::from_str(&text).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check if collections data is present.
    pub fn has_collections(&self) -> bool {
        self.collections.is_some()
    }

    /// Source paths of every file, in order.
    pub fn file_paths(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }
}

/// Load tree options from a JSON file and validate them.
pub fn load_options(path: impl AsRef<Path>) -> Result<TreeOptions, ManifestError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| ManifestError::io(path, e))?;
    let options: TreeOptions = serde_json::from_str(&text).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    options.validate()?;
    Ok(options)
}

/// Extract the path of each collection entry.
///
/// Object entries yield their `sort_key` field, string entries are taken as
/// the path itself. Anything else is skipped with a warning.
pub fn collection_paths<'a>(
    name: &str,
    entries: &'a [Value],
    sort_key: &str,
    warnings: &mut Vec<BuildWarning>,
) -> Vec<&'a str> {
    let mut paths = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let path = match entry {
            Value::String(path) => Some(path.as_str()),
            Value::Object(record) => record.get(sort_key).and_then(Value::as_str),
            _ => None,
        };
        match path {
            Some(path) => paths.push(path),
            None => {
                tracing::debug!(collection = name, index, sort_key, "entry has no path");
                warnings.push(BuildWarning::missing_sort_key(name, index, sort_key));
            }
        }
    }
    paths
}

/// Metadata lookup over a manifest.
///
/// The file table wins; collection records fill in paths it does not know.
pub struct ManifestLookup<'a> {
    files: &'a IndexMap<String, Record>,
    from_collections: HashMap<&'a str, &'a Record>,
}

impl<'a> ManifestLookup<'a> {
    /// Index a manifest's records by path.
    pub fn new(manifest: &'a Manifest, sort_key: &str) -> Self {
        let mut from_collections = HashMap::new();
        let entries = manifest.collections.iter().flat_map(|c| c.values()).flatten();
        for entry in entries {
            if let Value::Object(record) = entry
                && let Some(path) = record.get(sort_key).and_then(Value::as_str)
            {
                from_collections.entry(path).or_insert(record);
            }
        }
        Self {
            files: &manifest.files,
            from_collections,
        }
    }
}

impl MetadataLookup for ManifestLookup<'_> {
    fn record(&self, path: &str) -> Option<&Record> {
        self.files
            .get(path)
            .or_else(|| self.from_collections.get(path).copied())
    }
}
