//! Source path rewriting: target extensions and permalinks.
//!
//! Rewrites run before a path is split into segments. A permalink (when
//! enabled) replaces the source path first; the target extension is then
//! applied to whatever path came out of that step.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::TreeError;
use crate::node::Record;

/// Trailing `.ext` of the final segment, excluding dotfiles.
static EXTENSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?P<stem>[^/.][^/]*)\.\w+$").expect("extension regex"));

/// `:name` placeholders in permalink patterns.
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":(\w+)").expect("placeholder regex"));

/// Split a segment into its stem and extension.
///
/// The extension is the text after the last `.`. Both it and the stem must
/// be non-empty, so `.htaccess` and `notes.` have no extension.
pub fn split_extension(segment: &str) -> (&str, Option<&str>) {
    match segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (segment, None),
    }
}

/// Replace the extension of the final path segment, if it has one.
pub fn rewrite_extension(path: &str, extension: &str) -> String {
    EXTENSION_RE
        .replace(path, |caps: &regex::Captures<'_>| {
            format!("{}.{extension}", &caps["stem"])
        })
        .into_owned()
}

/// A permalink placeholder that had no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved(pub String);

/// Maps a source path (and its record) to a public path.
pub trait PermalinkFormatter {
    /// Format the permalink for `source`.
    fn format(&self, source: &str, record: Option<&Record>) -> Result<String, Unresolved>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Placeholder(String),
}

/// Formatter for `:placeholder` patterns such as `blog/:title`.
///
/// Placeholders resolve from the source record's string or number fields,
/// falling back to the built-ins `:dirname` and `:basename` of the source
/// path. Values are slugified. A record with a string `permalink` field
/// bypasses the pattern. When the result has no extension, the page is
/// placed at `<permalink>/index.<source extension>`.
#[derive(Debug, Clone)]
pub struct PatternFormatter {
    pattern: String,
    tokens: Vec<Token>,
}

impl PatternFormatter {
    /// Parse a permalink pattern.
    pub fn new(pattern: impl Into<String>) -> Result<Self, TreeError> {
        let pattern = pattern.into();
        if pattern.trim().is_empty() {
            return Err(TreeError::invalid_pattern(pattern, "pattern is empty"));
        }

        let mut tokens = Vec::new();
        let mut last = 0;
        for caps in PLACEHOLDER_RE.captures_iter(&pattern) {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            if whole.start > last {
                tokens.push(Token::Literal(pattern[last..whole.start].to_string()));
            }
            tokens.push(Token::Placeholder(caps[1].to_string()));
            last = whole.end;
        }
        if last < pattern.len() {
            tokens.push(Token::Literal(pattern[last..].to_string()));
        }

        if !tokens.iter().any(|t| matches!(t, Token::Placeholder(_))) {
            return Err(TreeError::invalid_pattern(pattern, "pattern has no placeholders"));
        }

        Ok(Self { pattern, tokens })
    }

    /// The pattern this formatter was parsed from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn resolve(&self, name: &str, source: &str, record: Option<&Record>) -> Option<String> {
        let from_record = record.and_then(|r| r.get(name)).and_then(|value| match value {
            Value::String(s) => Some(slugify(s)),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        if from_record.is_some() {
            return from_record.filter(|s| !s.is_empty());
        }

        let trimmed = source.trim_start_matches('/');
        let (dirname, file) = trimmed.rsplit_once('/').unwrap_or(("", trimmed));
        match name {
            "dirname" => Some(
                dirname
                    .split('/')
                    .filter(|s| !s.is_empty())
                    .map(slugify)
                    .collect::<Vec<_>>()
                    .join("/"),
            ),
            "basename" => Some(slugify(split_extension(file).0)).filter(|s| !s.is_empty()),
            _ => None,
        }
    }
}

impl PermalinkFormatter for PatternFormatter {
    fn format(&self, source: &str, record: Option<&Record>) -> Result<String, Unresolved> {
        let formatted = match record.and_then(|r| r.get("permalink")) {
            Some(Value::String(fixed)) => fixed.clone(),
            _ => {
                let mut out = String::new();
                for token in &self.tokens {
                    match token {
                        Token::Literal(text) => out.push_str(text),
                        Token::Placeholder(name) => {
                            let value = self
                                .resolve(name, source, record)
                                .ok_or_else(|| Unresolved(name.clone()))?;
                            out.push_str(&value);
                        }
                    }
                }
                out
            }
        };

        let mut path = normalize(&formatted, source.starts_with('/'));
        let last = path.rsplit('/').next().unwrap_or_default();
        if split_extension(last).1.is_none() {
            let file = source.rsplit('/').next().unwrap_or_default();
            if let (_, Some(ext)) = split_extension(file) {
                if !path.is_empty() && !path.ends_with('/') {
                    path.push('/');
                }
                path.push_str("index.");
                path.push_str(ext);
            }
        }
        Ok(path)
    }
}

/// Lowercase a value and collapse everything but letters and digits to `-`.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Collapse empty segments, keeping a leading `/` only when asked to.
fn normalize(path: &str, absolute: bool) -> String {
    let joined = path
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if absolute { format!("/{joined}") } else { joined }
}

/// Applies the configured rewrites to source paths.
pub struct PathRewriter {
    extension: Option<String>,
    permalink: Option<Box<dyn PermalinkFormatter + Send + Sync>>,
}

impl PathRewriter {
    /// Create a rewriter.
    pub fn new(
        extension: Option<String>,
        permalink: Option<Box<dyn PermalinkFormatter + Send + Sync>>,
    ) -> Self {
        Self {
            extension,
            permalink,
        }
    }

    /// Rewrite a source path.
    ///
    /// On an unresolved permalink placeholder the source path is kept and
    /// only the extension rewrite applies.
    pub fn rewrite(&self, source: &str, record: Option<&Record>) -> (String, Option<Unresolved>) {
        let (path, unresolved) = match &self.permalink {
            Some(formatter) => match formatter.format(source, record) {
                Ok(path) => (path, None),
                Err(unresolved) => (source.to_string(), Some(unresolved)),
            },
            None => (source.to_string(), None),
        };

        match &self.extension {
            Some(ext) => (rewrite_extension(&path, ext), unresolved),
            None => (path, unresolved),
        }
    }
}

impl std::fmt::Debug for PathRewriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathRewriter")
            .field("extension", &self.extension)
            .field("permalink", &self.permalink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("post.md"), ("post", Some("md")));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", Some("gz")));
        assert_eq!(split_extension("blog"), ("blog", None));
        assert_eq!(split_extension(".htaccess"), (".htaccess", None));
        assert_eq!(split_extension("notes."), ("notes.", None));
        assert_eq!(split_extension("post.en-us"), ("post", Some("en-us")));
    }

    #[test]
    fn test_rewrite_extension() {
        assert_eq!(rewrite_extension("blog/post.md", "html"), "blog/post.html");
        assert_eq!(rewrite_extension("/blog/post.md", "html"), "/blog/post.html");
        assert_eq!(rewrite_extension("v1.2/readme", "html"), "v1.2/readme");
        assert_eq!(rewrite_extension("blog/.htaccess", "html"), "blog/.htaccess");
        assert_eq!(rewrite_extension("a.tar.gz", "html"), "a.tar.html");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  --  "), "");
        assert_eq!(slugify("Ünïcode Title"), "ünïcode-title");
    }

    #[test]
    fn test_pattern_parsing() {
        assert!(PatternFormatter::new("").is_err());
        assert!(PatternFormatter::new("blog/static").is_err());

        let formatter = PatternFormatter::new("blog/:title").unwrap();
        assert_eq!(formatter.pattern(), "blog/:title");
        assert_eq!(formatter.tokens.len(), 2);
    }

    #[test]
    fn test_pattern_from_record() {
        let formatter = PatternFormatter::new(":dirname/:title").unwrap();
        let meta = record(json!({ "title": "My First Post" }));
        assert_eq!(
            formatter.format("blog/2024/a.md", Some(&meta)).unwrap(),
            "blog/2024/my-first-post/index.md"
        );
    }

    #[test]
    fn test_pattern_builtins_and_absolute_paths() {
        let formatter = PatternFormatter::new(":dirname/:basename").unwrap();
        assert_eq!(formatter.format("/notes/Todo List.md", None).unwrap(), "/notes/todo-list/index.md");
        assert_eq!(formatter.format("top.md", None).unwrap(), "top/index.md");
    }

    #[test]
    fn test_pattern_unresolved() {
        let formatter = PatternFormatter::new("blog/:date/:title").unwrap();
        let meta = record(json!({ "title": "x" }));
        assert_eq!(
            formatter.format("a.md", Some(&meta)),
            Err(Unresolved("date".to_string()))
        );
    }

    #[test]
    fn test_fixed_permalink_wins() {
        let formatter = PatternFormatter::new("blog/:title").unwrap();
        let meta = record(json!({ "title": "x", "permalink": "about/" }));
        assert_eq!(formatter.format("pages/about.md", Some(&meta)).unwrap(), "about/index.md");
    }

    #[test]
    fn test_path_rewriter() {
        let rewriter = PathRewriter::new(Some("html".to_string()), None);
        assert_eq!(rewriter.rewrite("blog/post.md", None), ("blog/post.html".to_string(), None));

        let formatter = PatternFormatter::new("posts/:slug").unwrap();
        let rewriter = PathRewriter::new(Some("html".to_string()), Some(Box::new(formatter)));
        let meta = record(json!({ "slug": "hello" }));
        assert_eq!(rewriter.rewrite("blog/a.md", Some(&meta)).0, "posts/hello/index.html");

        let (path, unresolved) = rewriter.rewrite("blog/b.md", None);
        assert_eq!(path, "blog/b.html");
        assert_eq!(unresolved, Some(Unresolved("slug".to_string())));

        assert_eq!(PathRewriter::new(None, None).rewrite("blog/c.md", None).0, "blog/c.md");
    }
}
