use crate::arena::Handle;
use crate::bst::tree::Tree;
use crate::entry::Entry;
use std::ptr;
use std::vec;

/// A position in the key order of a tree map.
///
/// A cursor either points at an entry or is the end cursor, which sits past the maximum key.
/// Moving forward steps to the in-order successor; moving backward steps to the in-order
/// predecessor, and from the end cursor to the maximum key. Two cursors are equal if they point at
/// the same entry of the same map.
pub struct Cursor<'a, T, U> {
    tree: &'a Tree<T, U>,
    current: Option<Handle>,
}

impl<'a, T, U> Cursor<'a, T, U> {
    pub(crate) fn new(tree: &'a Tree<T, U>, current: Option<Handle>) -> Self {
        Cursor { tree, current }
    }

    /// Returns `true` if this is the end cursor.
    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }

    /// Returns the key-value pair at the cursor, or `None` at the end.
    pub fn get(&self) -> Option<(&'a T, &'a U)> {
        let tree = self.tree;
        self.current.map(|handle| {
            let entry = &tree.node(handle).entry;
            (&entry.key, &entry.value)
        })
    }

    pub fn key(&self) -> Option<&'a T> {
        self.get().map(|pair| pair.0)
    }

    pub fn value(&self) -> Option<&'a U> {
        self.get().map(|pair| pair.1)
    }

    /// Moves to the next key. The end cursor stays at the end.
    pub fn move_next(&mut self) {
        if let Some(handle) = self.current {
            self.current = self.tree.successor(handle);
        }
    }

    /// Moves to the previous key. The cursor at the minimum key moves to the end, and the end
    /// cursor moves to the maximum key.
    pub fn move_prev(&mut self) {
        self.current = match self.current {
            Some(handle) => self.tree.predecessor(handle),
            None => self.tree.last(),
        };
    }
}

impl<'a, T, U> Clone for Cursor<'a, T, U> {
    fn clone(&self) -> Self {
        Cursor {
            tree: self.tree,
            current: self.current,
        }
    }
}

impl<'a, T, U> PartialEq for Cursor<'a, T, U> {
    fn eq(&self, other: &Cursor<'a, T, U>) -> bool {
        ptr::eq(self.tree, other.tree) && self.current == other.current
    }
}

impl<'a, T, U> Eq for Cursor<'a, T, U> {}

/// An iterator for tree maps.
///
/// This iterator traverses the elements of the map in-order and yields immutable references. It
/// walks successor and predecessor links lazily and can be driven from both ends.
pub struct Iter<'a, T, U> {
    tree: &'a Tree<T, U>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
}

impl<'a, T, U> Iter<'a, T, U> {
    pub(crate) fn new(tree: &'a Tree<T, U>) -> Self {
        Iter {
            tree,
            front: tree.first(),
            back: tree.last(),
            remaining: tree.len(),
        }
    }
}

impl<'a, T, U> Iterator for Iter<'a, T, U> {
    type Item = (&'a T, &'a U);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let tree = self.tree;
        let handle = self.front?;
        self.front = tree.successor(handle);
        self.remaining -= 1;
        let entry = &tree.node(handle).entry;
        Some((&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T, U> DoubleEndedIterator for Iter<'a, T, U> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let tree = self.tree;
        let handle = self.back?;
        self.back = tree.predecessor(handle);
        self.remaining -= 1;
        let entry = &tree.node(handle).entry;
        Some((&entry.key, &entry.value))
    }
}

impl<'a, T, U> ExactSizeIterator for Iter<'a, T, U> {}

/// A mutable iterator for tree maps.
///
/// This iterator traverses the elements of the map in-order and yields mutable references to the
/// values. The in-order sequence of references is collected when the iterator is created, in time
/// linear in the number of nodes.
pub struct IterMut<'a, T, U> {
    entries: vec::IntoIter<(&'a T, &'a mut U)>,
}

impl<'a, T, U> IterMut<'a, T, U> {
    pub(crate) fn new(tree: &'a mut Tree<T, U>) -> Self {
        IterMut {
            entries: tree.entries_mut().into_iter(),
        }
    }
}

impl<'a, T, U> Iterator for IterMut<'a, T, U> {
    type Item = (&'a T, &'a mut U);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<'a, T, U> DoubleEndedIterator for IterMut<'a, T, U> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back()
    }
}

impl<'a, T, U> ExactSizeIterator for IterMut<'a, T, U> {}

/// An owning iterator for tree maps.
///
/// This iterator traverses the elements of the map in-order and yields owned entries.
pub struct IntoIter<T, U> {
    entries: vec::IntoIter<Entry<T, U>>,
}

impl<T, U> IntoIter<T, U> {
    pub(crate) fn new(tree: Tree<T, U>) -> Self {
        IntoIter {
            entries: tree.into_entries().into_iter(),
        }
    }
}

impl<T, U> Iterator for IntoIter<T, U> {
    type Item = (T, U);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(Entry::into_pair)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<T, U> DoubleEndedIterator for IntoIter<T, U> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back().map(Entry::into_pair)
    }
}

impl<T, U> ExactSizeIterator for IntoIter<T, U> {}

/// An iterator over the keys of a tree map in ascending order.
pub struct Keys<'a, T, U> {
    pub(crate) inner: Iter<'a, T, U>,
}

impl<'a, T, U> Iterator for Keys<'a, T, U> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|pair| pair.0)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T, U> DoubleEndedIterator for Keys<'a, T, U> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|pair| pair.0)
    }
}

impl<'a, T, U> ExactSizeIterator for Keys<'a, T, U> {}

/// An iterator over the values of a tree map in ascending key order.
pub struct Values<'a, T, U> {
    pub(crate) inner: Iter<'a, T, U>,
}

impl<'a, T, U> Iterator for Values<'a, T, U> {
    type Item = &'a U;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|pair| pair.1)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T, U> DoubleEndedIterator for Values<'a, T, U> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|pair| pair.1)
    }
}

impl<'a, T, U> ExactSizeIterator for Values<'a, T, U> {}
