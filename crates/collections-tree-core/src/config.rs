//! Tree build configuration types.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::TreeError;

/// Rule deciding whether a path segment becomes a file or a folder node.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum FileRule {
    /// The final segment is a file when it carries an extension.
    #[default]
    Extension,
    /// The final segment is always a file.
    LastSegment,
    /// As `Extension`, but `dir/index.<ext>` collapses into a `dir` file node.
    IndexFile,
}

/// Configuration for building collection trees.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
#[serde(rename_all = "camelCase")]
pub struct TreeOptions {
    /// Record field holding the path of each collection entry.
    #[builder(default = "default_sort_key()")]
    #[serde(default = "default_sort_key")]
    pub sort_key: String,

    /// Extension file paths are rewritten to (None = keep as is).
    #[builder(default = "default_extension()")]
    #[serde(default = "default_extension")]
    pub extension: Option<String>,

    /// Rewrite paths through the permalink pattern.
    #[builder(default = "false")]
    #[serde(default)]
    pub permalinks: bool,

    /// Permalink pattern, e.g. `blog/:title`.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub pattern: Option<String>,

    /// File-vs-folder classification rule.
    #[builder(default)]
    #[serde(default)]
    pub file_rule: FileRule,

    /// Terminate folder paths with `/`.
    #[builder(default = "false")]
    #[serde(default)]
    pub trailing_slash: bool,

    /// Drop repeated paths before building.
    #[builder(default = "false")]
    #[serde(default)]
    pub dedupe: bool,
}

fn default_sort_key() -> String {
    "path".to_string()
}

fn default_extension() -> Option<String> {
    Some("html".to_string())
}

impl TreeOptionsBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref key) = self.sort_key {
            check_sort_key(key)?;
        }
        if let Some(Some(ref ext)) = self.extension {
            check_extension(ext)?;
        }
        let pattern = self.pattern.clone().flatten();
        check_permalinks(self.permalinks.unwrap_or(false), pattern.as_deref())
    }
}

fn check_sort_key(key: &str) -> Result<(), String> {
    if key.trim().is_empty() {
        return Err("Sort key cannot be empty".to_string());
    }
    Ok(())
}

fn check_extension(ext: &str) -> Result<(), String> {
    if ext.is_empty() {
        return Err("Target extension cannot be empty".to_string());
    }
    if ext.contains(['.', '/']) {
        return Err(format!("Target extension {ext:?} must not contain '.' or '/'"));
    }
    Ok(())
}

fn check_permalinks(enabled: bool, pattern: Option<&str>) -> Result<(), String> {
    if enabled && pattern.is_none_or(|p| p.trim().is_empty()) {
        return Err("Permalinks are enabled but no pattern is set".to_string());
    }
    Ok(())
}

impl TreeOptions {
    /// Create a new options builder.
    pub fn builder() -> TreeOptionsBuilder {
        TreeOptionsBuilder::default()
    }

    /// Options that leave every path untouched.
    pub fn passthrough() -> Self {
        Self {
            extension: None,
            ..Self::default()
        }
    }

    /// Check options that did not come through the builder (e.g. deserialized).
    pub fn validate(&self) -> Result<(), TreeError> {
        check_sort_key(&self.sort_key)
            .and_then(|()| self.extension.as_deref().map_or(Ok(()), check_extension))
            .and_then(|()| check_permalinks(self.permalinks, self.pattern.as_deref()))
            .map_err(TreeError::invalid_config)
    }

    /// Permalink pattern, if permalinks are enabled.
    pub fn active_pattern(&self) -> Option<&str> {
        if self.permalinks {
            self.pattern.as_deref()
        } else {
            None
        }
    }
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            sort_key: default_sort_key(),
            extension: default_extension(),
            permalinks: false,
            pattern: None,
            file_rule: FileRule::default(),
            trailing_slash: false,
            dedupe: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_options_builder() {
        let options = TreeOptions::builder()
            .sort_key("slug")
            .extension(Some("xml".to_string()))
            .file_rule(FileRule::IndexFile)
            .trailing_slash(true)
            .build()
            .unwrap();

        assert_eq!(options.sort_key, "slug");
        assert_eq!(options.extension.as_deref(), Some("xml"));
        assert_eq!(options.file_rule, FileRule::IndexFile);
        assert!(options.trailing_slash);
        assert!(!options.dedupe);
    }

    #[test]
    fn test_options_defaults() {
        let options = TreeOptions::default();
        assert_eq!(options.sort_key, "path");
        assert_eq!(options.extension.as_deref(), Some("html"));
        assert!(!options.permalinks);
        assert_eq!(options.file_rule, FileRule::Extension);

        let built = TreeOptions::builder().build().unwrap();
        assert_eq!(built, options);
    }

    #[test]
    fn test_builder_rejects_bad_extension() {
        assert!(TreeOptions::builder().extension(Some(".html".to_string())).build().is_err());
        assert!(TreeOptions::builder().extension(Some(String::new())).build().is_err());
        assert!(TreeOptions::builder().extension(None::<String>).build().is_ok());
    }

    #[test]
    fn test_permalinks_require_pattern() {
        assert!(TreeOptions::builder().permalinks(true).build().is_err());

        let options = TreeOptions::builder()
            .permalinks(true)
            .pattern("blog/:title")
            .build()
            .unwrap();
        assert_eq!(options.active_pattern(), Some("blog/:title"));
    }

    #[test]
    fn test_deserialize_partial_options() {
        let options: TreeOptions =
            serde_json::from_str(r#"{"sortKey": "slug", "fileRule": "last-segment"}"#).unwrap();
        assert_eq!(options.sort_key, "slug");
        assert_eq!(options.extension.as_deref(), Some("html"));
        assert_eq!(options.file_rule, FileRule::LastSegment);

        let bad: TreeOptions = serde_json::from_str(r#"{"sortKey": " "}"#).unwrap();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_file_rule_from_str() {
        assert_eq!(FileRule::from_str("index-file").unwrap(), FileRule::IndexFile);
        assert_eq!(FileRule::LastSegment.to_string(), "last-segment");
        assert!(FileRule::from_str("folder").is_err());
    }
}
