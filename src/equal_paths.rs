//! Checks whether every leaf of a binary tree sits at the same depth.
//!
//! # Examples
//!
//! ```
//! use avl_collections::equal_paths::{equal_paths, PathNode};
//!
//! let mut root = PathNode::new(2);
//! root.left = Some(Box::new(PathNode::new(1)));
//! root.right = Some(Box::new(PathNode::new(3)));
//! assert!(equal_paths(Some(&root)));
//!
//! root.left = Some(Box::new(PathNode::new(1).with_left(PathNode::new(0))));
//! assert!(!equal_paths(Some(&root)));
//! ```

/// A node of a plain binary tree that owns its children.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PathNode<T> {
    pub key: T,
    pub left: Option<Box<PathNode<T>>>,
    pub right: Option<Box<PathNode<T>>>,
}

impl<T> PathNode<T> {
    /// Constructs a node without children.
    pub fn new(key: T) -> Self {
        PathNode {
            key,
            left: None,
            right: None,
        }
    }

    /// Sets the left child and returns the node.
    pub fn with_left(mut self, left: PathNode<T>) -> Self {
        self.left = Some(Box::new(left));
        self
    }

    /// Sets the right child and returns the node.
    pub fn with_right(mut self, right: PathNode<T>) -> Self {
        self.right = Some(Box::new(right));
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Returns `true` if all leaves reachable from `root` have the same depth. An empty tree and a
/// single node both qualify.
pub fn equal_paths<T>(root: Option<&PathNode<T>>) -> bool {
    match root {
        Some(node) => leaf_depth(node).is_some(),
        None => true,
    }
}

// Depth of the leaves under `node` relative to it, or `None` if they differ.
fn leaf_depth<T>(node: &PathNode<T>) -> Option<usize> {
    match (&node.left, &node.right) {
        (None, None) => Some(0),
        (Some(child), None) | (None, Some(child)) => leaf_depth(child).map(|depth| depth + 1),
        (Some(left), Some(right)) => {
            let left_depth = leaf_depth(left)?;
            let right_depth = leaf_depth(right)?;
            if left_depth == right_depth {
                Some(left_depth + 1)
            } else {
                None
            }
        },
    }
}
