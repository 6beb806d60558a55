//! Ordered collections built on a shared binary search tree core.
//!
//! [`bst::BstMap`] is an unbalanced binary search tree map. [`avl_tree::AvlMap`] and
//! [`avl_tree::AvlSet`] keep the same tree height balanced by restoring the avl invariant after
//! every insertion and removal. Nodes of both live in a [`arena::TypedArena`].
//!
//! [`equal_paths`] is a standalone check on plain binary trees.

pub mod arena;
pub mod avl_tree;
pub mod bst;
mod entry;
pub mod equal_paths;
pub mod error;

pub use crate::error::{Error, Result};
