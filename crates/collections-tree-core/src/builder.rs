//! Path-to-tree builder.
//!
//! Paths are processed in order. Each one is rewritten (permalink, then
//! target extension), split on `/`, and walked against the forest level by
//! level. A segment whose basename already exists at the current level is
//! merged into that node; otherwise a new node is appended. Child order is
//! therefore first-occurrence order, never alphabetical.

use compact_str::CompactString;
use itertools::Itertools;
use tracing::debug;

use crate::config::{FileRule, TreeOptions};
use crate::error::{BuildWarning, TreeError, WarningKind};
use crate::forest::Forest;
use crate::node::{MetadataLookup, NodeType, Record, TreeNode};
use crate::rewrite::{PathRewriter, PatternFormatter, PermalinkFormatter, split_extension};
use crate::title::title_case;

/// Forest plus the warnings raised while building it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    /// The built forest.
    pub forest: Forest,
    /// Entries that were skipped or partially rewritten.
    pub warnings: Vec<BuildWarning>,
}

/// What a single segment turns into.
struct Segment<'a> {
    /// Identity at its level.
    basename: &'a str,
    kind: NodeType,
    extension: Option<&'a str>,
}

/// Builds collection trees from ordered path lists.
#[derive(Debug)]
pub struct TreeBuilder {
    options: TreeOptions,
    rewriter: PathRewriter,
}

impl TreeBuilder {
    /// Create a builder, validating the options and parsing any permalink pattern.
    pub fn new(options: TreeOptions) -> Result<Self, TreeError> {
        options.validate()?;
        let permalink: Option<Box<dyn PermalinkFormatter + Send + Sync>> =
            match options.active_pattern() {
                Some(pattern) => Some(Box::new(PatternFormatter::new(pattern)?)),
                None => None,
            };
        let rewriter = PathRewriter::new(options.extension.clone(), permalink);
        Ok(Self { options, rewriter })
    }

    /// Replace the permalink formatter with a custom one.
    pub fn with_formatter(mut self, formatter: impl PermalinkFormatter + Send + Sync + 'static) -> Self {
        self.rewriter = PathRewriter::new(self.options.extension.clone(), Some(Box::new(formatter)));
        self
    }

    /// Options in use.
    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    /// Build a forest, discarding warnings.
    pub fn build<S: AsRef<str>>(&self, paths: &[S], lookup: Option<&dyn MetadataLookup>) -> Forest {
        self.build_report(paths, lookup).forest
    }

    /// Build a forest and collect warnings for skipped entries.
    pub fn build_report<S: AsRef<str>>(
        &self,
        paths: &[S],
        lookup: Option<&dyn MetadataLookup>,
    ) -> BuildReport {
        let mut roots: Vec<TreeNode> = Vec::new();
        let mut warnings = Vec::new();

        let sources: Vec<(usize, &str)> = if self.options.dedupe {
            paths
                .iter()
                .map(AsRef::as_ref)
                .enumerate()
                .unique_by(|(_, p)| *p)
                .collect()
        } else {
            paths.iter().map(AsRef::as_ref).enumerate().collect()
        };

        for (index, source) in sources {
            if source.trim().is_empty() {
                debug!(index, "skipping empty path");
                warnings.push(BuildWarning::empty_path(index));
                continue;
            }
            self.insert(&mut roots, source, lookup, &mut warnings);
        }

        debug!(
            paths = paths.len(),
            roots = roots.len(),
            warnings = warnings.len(),
            "built collection tree"
        );

        BuildReport {
            forest: Forest::new(roots),
            warnings,
        }
    }

    /// Insert one source path into the forest.
    fn insert(
        &self,
        roots: &mut Vec<TreeNode>,
        source: &str,
        lookup: Option<&dyn MetadataLookup>,
        warnings: &mut Vec<BuildWarning>,
    ) {
        let record = lookup.and_then(|l| l.record(source));
        // A trailing `/` would hide the final segment's extension from the rewrite.
        let (target, unresolved) = self.rewriter.rewrite(source.trim_end_matches('/'), record);
        if let Some(unresolved) = unresolved {
            debug!(source, placeholder = %unresolved.0, "permalink placeholder unresolved");
            warnings.push(BuildWarning::permalink_unresolved(source, &unresolved.0));
        }

        let prefix = if target.starts_with('/') { "/" } else { "" };
        let mut segments: Vec<&str> = target.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            debug!(source, "skipping path without segments");
            warnings.push(BuildWarning::new(
                source,
                format!("Path {source:?} has no segments"),
                WarningKind::EmptyPath,
            ));
            return;
        }

        // File nodes carry the normalized path, including a collapsed `index.<ext>`.
        let file_path = format!("{prefix}{}", segments.join("/"));
        let index_file = if self.options.file_rule == FileRule::IndexFile && is_index_path(&segments) {
            segments.pop()
        } else {
            None
        };

        let last = segments.len() - 1;
        let mut level = roots;
        for (depth, raw) in segments.iter().enumerate() {
            let segment = self.classify(raw, depth == last, index_file);
            let position = match level.iter().position(|n| n.basename == segment.basename) {
                Some(position) => position,
                None => {
                    let node = match segment.kind {
                        NodeType::File => {
                            let mut node = file_node(&segment, &file_path);
                            if let Some(record) = record {
                                node.merge_record(record);
                            }
                            node
                        }
                        NodeType::Folder => {
                            let path = folder_path(prefix, &segments[..=depth], self.options.trailing_slash);
                            let mut node = TreeNode::new_folder(segment.basename, path, title_case(segment.basename));
                            let key = node.path.trim_end_matches('/');
                            if let Some(record) = lookup.and_then(|l| l.record(key)) {
                                node.merge_record(record);
                            }
                            node
                        }
                    };
                    level.push(node);
                    level.len() - 1
                }
            };
            level = &mut level[position].children;
        }
    }

    fn classify<'a>(&self, raw: &'a str, is_last: bool, index_file: Option<&'a str>) -> Segment<'a> {
        if is_last && let Some(index_file) = index_file {
            // `dir/index.ext`: the folder segment stands in for its index file.
            let extension = split_extension(index_file).1;
            return Segment {
                basename: raw,
                kind: NodeType::File,
                extension,
            };
        }

        let (stem, extension) = split_extension(raw);
        let is_file = is_last
            && match self.options.file_rule {
                FileRule::Extension | FileRule::IndexFile => extension.is_some(),
                FileRule::LastSegment => true,
            };

        if is_file {
            Segment {
                basename: stem,
                kind: NodeType::File,
                extension,
            }
        } else {
            Segment {
                basename: raw,
                kind: NodeType::Folder,
                extension: None,
            }
        }
    }
}

fn is_index_path(segments: &[&str]) -> bool {
    segments.len() >= 2
        && segments
            .last()
            .is_some_and(|last| matches!(split_extension(last), ("index", Some(_))))
}

fn file_node(segment: &Segment<'_>, path: &str) -> TreeNode {
    let basename = CompactString::from(segment.basename);
    TreeNode {
        name: basename.clone(),
        title: title_case(&basename),
        basename,
        extension: segment.extension.map(CompactString::from),
        kind: NodeType::File,
        path: path.to_string(),
        children: Vec::new(),
        extra: Record::new(),
    }
}

fn folder_path(prefix: &str, segments: &[&str], trailing_slash: bool) -> String {
    let mut path = format!("{prefix}{}", segments.join("/"));
    if trailing_slash {
        path.push('/');
    }
    path
}

/// Arrange paths into a forest in one call.
pub fn arrange_into_tree<S: AsRef<str>>(
    paths: &[S],
    lookup: Option<&dyn MetadataLookup>,
    options: &TreeOptions,
) -> Result<Forest, TreeError> {
    Ok(TreeBuilder::new(options.clone())?.build(paths, lookup))
}
