//! Error and warning types for tree construction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while preparing a tree build.
///
/// Tree construction itself never fails; malformed input degrades to a
/// [`BuildWarning`] and the entry is skipped.
#[derive(Debug, Error)]
pub enum TreeError {
    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A permalink pattern could not be parsed.
    #[error("Invalid permalink pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },
}

impl TreeError {
    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an invalid pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}

/// Kind of build warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// Path entry was empty.
    EmptyPath,
    /// A record had no usable value under the sort key.
    MissingSortKey,
    /// No collections data was available, so nothing was built.
    MissingCollections,
    /// A permalink placeholder had no value; the source path was kept.
    PermalinkUnresolved,
}

/// Non-fatal condition encountered during a build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildWarning {
    /// Path (or collection name) the warning refers to.
    pub subject: String,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl BuildWarning {
    /// Create a new build warning.
    pub fn new(subject: impl Into<String>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            subject: subject.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create an empty path warning. `index` is the entry's position in its input.
    pub fn empty_path(index: usize) -> Self {
        Self {
            subject: format!("#{index}"),
            message: format!("Empty path at position {index} skipped"),
            kind: WarningKind::EmptyPath,
        }
    }

    /// Create a missing sort key warning.
    pub fn missing_sort_key(collection: &str, index: usize, key: &str) -> Self {
        Self {
            subject: format!("{collection}#{index}"),
            message: format!("Record {index} in {collection:?} has no string field {key:?}"),
            kind: WarningKind::MissingSortKey,
        }
    }

    /// Create a missing collections warning.
    pub fn missing_collections() -> Self {
        Self {
            subject: "collections".to_string(),
            message: "No collections data available, skipping tree build".to_string(),
            kind: WarningKind::MissingCollections,
        }
    }

    /// Create an unresolved permalink warning.
    pub fn permalink_unresolved(path: impl Into<String>, placeholder: &str) -> Self {
        let path = path.into();
        Self {
            message: format!("Permalink placeholder :{placeholder} has no value for {path}"),
            subject: path,
            kind: WarningKind::PermalinkUnresolved,
        }
    }
}

impl BuildWarning {
    /// Qualify the warning with the collection whose build raised it.
    ///
    /// Index subjects (`#3`) become `name#3`; path subjects become `name:path`.
    pub fn in_collection(self, collection: &str) -> Self {
        let subject = if self.subject.starts_with('#') {
            format!("{collection}{}", self.subject)
        } else {
            format!("{collection}:{}", self.subject)
        };
        Self {
            subject,
            message: format!("[{collection}] {}", self.message),
            kind: self.kind,
        }
    }
}

impl std::fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_message() {
        let err = TreeError::invalid_config("sort key cannot be empty");
        assert!(matches!(err, TreeError::InvalidConfig { .. }));
        assert_eq!(
            err.to_string(),
            "Invalid configuration: sort key cannot be empty"
        );
    }

    #[test]
    fn test_warning_creation() {
        let warning = BuildWarning::missing_sort_key("articles", 3, "path");
        assert_eq!(warning.kind, WarningKind::MissingSortKey);
        assert_eq!(warning.subject, "articles#3");
        assert!(warning.message.contains("\"path\""));

        let warning = BuildWarning::empty_path(2).in_collection("articles");
        assert_eq!(warning.subject, "articles#2");
        assert_eq!(warning.kind, WarningKind::EmptyPath);
        assert!(warning.message.starts_with("[articles] "));

        let warning = BuildWarning::permalink_unresolved("blog/a.md", "date");
        assert_eq!(warning.subject, "blog/a.md");
        assert!(warning.to_string().contains(":date"));
    }
}
