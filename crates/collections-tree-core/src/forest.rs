//! Forest container and statistics.

use serde::{Deserialize, Serialize};

use crate::node::TreeNode;

/// Summary statistics for a built forest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestStats {
    /// Total number of file nodes.
    pub total_files: u64,
    /// Total number of folder nodes.
    pub total_folders: u64,
    /// Maximum depth reached (roots are depth 0).
    pub max_depth: u32,
    /// Deepest file (path, depth).
    pub deepest_file: Option<(String, u32)>,
}

impl ForestStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update stats with a file node.
    pub fn record_file(&mut self, path: &str, depth: u32) {
        self.total_files += 1;
        if self.deepest_file.as_ref().is_none_or(|(_, d)| depth > *d) {
            self.deepest_file = Some((path.to_string(), depth));
        }
        self.max_depth = self.max_depth.max(depth);
    }

    /// Record a folder node.
    pub fn record_folder(&mut self, depth: u32) {
        self.total_folders += 1;
        self.max_depth = self.max_depth.max(depth);
    }
}

/// Ordered sequence of root nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Forest {
    roots: Vec<TreeNode>,
}

impl Forest {
    /// Create a forest from root nodes.
    pub fn new(roots: Vec<TreeNode>) -> Self {
        Self { roots }
    }

    /// Root nodes in first-occurrence order.
    pub fn roots(&self) -> &[TreeNode] {
        &self.roots
    }

    /// Number of root nodes.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Check if the forest has no roots.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Find a root by basename.
    pub fn root(&self, basename: &str) -> Option<&TreeNode> {
        self.roots.iter().find(|n| n.basename == basename)
    }

    /// Every node in pre-order, paired with its depth.
    pub fn walk(&self) -> Vec<(u32, &TreeNode)> {
        let mut out = Vec::new();
        let mut stack: Vec<(u32, &TreeNode)> = self.roots.iter().rev().map(|n| (0, n)).collect();
        while let Some((depth, node)) = stack.pop() {
            out.push((depth, node));
            stack.extend(node.children.iter().rev().map(|c| (depth + 1, c)));
        }
        out
    }

    /// Find a node by its path. A trailing `/` on either side is ignored.
    pub fn find(&self, path: &str) -> Option<&TreeNode> {
        let wanted = path.trim_end_matches('/');
        self.walk()
            .into_iter()
            .map(|(_, node)| node)
            .find(|node| node.path.trim_end_matches('/') == wanted)
    }

    /// Compute file/folder counts and depth.
    pub fn stats(&self) -> ForestStats {
        let mut stats = ForestStats::new();
        for (depth, node) in self.walk() {
            if node.is_file() {
                stats.record_file(&node.path, depth);
            } else {
                stats.record_folder(depth);
            }
        }
        stats
    }
}

impl<'a> IntoIterator for &'a Forest {
    type Item = &'a TreeNode;
    type IntoIter = std::slice::Iter<'a, TreeNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.roots.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Forest {
        let mut blog = TreeNode::new_folder("blog", "blog", "Blog");
        let mut year = TreeNode::new_folder("2024", "blog/2024", "2024");
        year.children
            .push(TreeNode::new_file("post", "md", "blog/2024/post.md", "Post"));
        blog.children.push(year);
        blog.children
            .push(TreeNode::new_file("intro", "md", "blog/intro.md", "Intro"));
        Forest::new(vec![blog, TreeNode::new_file("about", "md", "about.md", "About")])
    }

    #[test]
    fn test_forest_stats_default() {
        let stats = ForestStats::default();
        assert_eq!(stats.total_files, 0);
        assert_eq!(stats.total_folders, 0);
        assert!(stats.deepest_file.is_none());
    }

    #[test]
    fn test_walk_is_preorder() {
        let forest = sample();
        let order: Vec<_> = forest
            .walk()
            .into_iter()
            .map(|(depth, node)| (depth, node.basename.to_string()))
            .collect();
        assert_eq!(
            order,
            vec![
                (0, "blog".to_string()),
                (1, "2024".to_string()),
                (2, "post".to_string()),
                (1, "intro".to_string()),
                (0, "about".to_string()),
            ]
        );
    }

    #[test]
    fn test_stats() {
        let stats = sample().stats();
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.total_folders, 2);
        assert_eq!(stats.max_depth, 2);
        assert_eq!(
            stats.deepest_file,
            Some(("blog/2024/post.md".to_string(), 2))
        );
    }

    #[test]
    fn test_find() {
        let forest = sample();
        assert_eq!(forest.find("blog/2024/").map(|n| n.title.as_str()), Some("2024"));
        assert!(forest.find("blog/intro.md").is_some_and(TreeNode::is_file));
        assert!(forest.find("missing").is_none());
        assert_eq!(forest.root("about").map(|n| n.path.as_str()), Some("about.md"));
    }

    #[test]
    fn test_serializes_as_array() {
        let json = serde_json::to_value(Forest::default()).unwrap();
        assert_eq!(json, serde_json::json!([]));
    }
}
