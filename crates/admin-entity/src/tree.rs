//! Nested views assembled from flat hierarchy rows.

use serde::{Deserialize, Serialize};

/// A node together with its nested children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode<T> {
    /// The node itself, flattened into the JSON object.
    #[serde(flatten)]
    pub node: T,
    /// Child nodes ordered by sort key, then id.
    pub children: Vec<TreeNode<T>>,
}

impl<T> TreeNode<T> {
    /// Wrap a node with no children.
    pub fn leaf(node: T) -> Self {
        Self {
            node,
            children: Vec::new(),
        }
    }

    /// Total number of nodes in this subtree.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::size).sum::<usize>()
    }
}
