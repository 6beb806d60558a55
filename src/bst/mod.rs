//! Unbalanced binary search tree with parent links, and the node layout, traversal, node swap and
//! rotation primitives that the balanced trees in this crate build on.

mod iter;
mod map;
pub(crate) mod node;
pub(crate) mod tree;

pub use self::iter::{Cursor, IntoIter, Iter, IterMut, Keys, Values};
pub use self::map::BstMap;
