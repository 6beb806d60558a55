use crate::arena::{Handle, TypedArena};
use crate::bst::node::{Node, Side};
use crate::entry::Entry;
use crate::error::Result;
use log::{debug, trace};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::convert::Infallible;
use std::mem;
use std::result;

pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Node allocator for the infallible insertion path.
pub fn allocate<T, U>(
    arena: &mut TypedArena<Node<T, U>>,
    node: Node<T, U>,
) -> result::Result<Handle, Infallible> {
    Ok(arena.allocate(node))
}

/// Node allocator that reports allocation failure instead of aborting.
pub fn try_allocate<T, U>(arena: &mut TypedArena<Node<T, U>>, node: Node<T, U>) -> Result<Handle> {
    Ok(arena.try_allocate(node)?)
}

/// The outcome of descending the tree in search of a key.
pub enum Search {
    Found(Handle),
    /// The key is absent; it belongs in the given empty child slot, or at the root if the tree is
    /// empty.
    Vacant(Option<(Handle, Side)>),
}

/// The outcome of an insertion into the tree.
pub enum Insertion<U> {
    Replaced(U),
    Created(Handle),
}

/// An arena-backed binary search tree with parent links.
///
/// This is the structural core shared by the unbalanced and the AVL maps. It knows how to find,
/// link, splice and swap nodes and how to rotate a subtree, but it never rebalances by itself.
pub struct Tree<T, U> {
    arena: TypedArena<Node<T, U>>,
    root: Option<Handle>,
}

impl<T, U> Tree<T, U> {
    pub fn new(chunk_size: usize) -> Self {
        Tree {
            arena: TypedArena::new(chunk_size),
            root: None,
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn root(&self) -> Option<Handle> {
        self.root
    }

    pub fn node(&self, handle: Handle) -> &Node<T, U> {
        &self.arena[handle]
    }

    pub fn node_mut(&mut self, handle: Handle) -> &mut Node<T, U> {
        &mut self.arena[handle]
    }

    pub fn child(&self, handle: Handle, side: Side) -> Option<Handle> {
        self.node(handle).child(side)
    }

    /// Returns the parent of `handle` and the side of the parent it hangs from, or `None` for the
    /// root.
    pub fn position(&self, handle: Handle) -> Option<(Handle, Side)> {
        self.node(handle).parent.map(|parent| {
            if self.node(parent).left == Some(handle) {
                (parent, Side::Left)
            } else {
                (parent, Side::Right)
            }
        })
    }

    fn replace_child(&mut self, position: Option<(Handle, Side)>, child: Option<Handle>) {
        match position {
            Some((parent, side)) => self.node_mut(parent).set_child(side, child),
            None => self.root = child,
        }
    }

    /// Descends from `handle` towards `side` as far as possible.
    pub fn extreme(&self, mut handle: Handle, side: Side) -> Handle {
        while let Some(child) = self.child(handle, side) {
            handle = child;
        }
        handle
    }

    pub fn first(&self) -> Option<Handle> {
        self.root().map(|root| self.extreme(root, Side::Left))
    }

    pub fn last(&self) -> Option<Handle> {
        self.root().map(|root| self.extreme(root, Side::Right))
    }

    pub fn predecessor(&self, handle: Handle) -> Option<Handle> {
        self.step(handle, Side::Left)
    }

    pub fn successor(&self, handle: Handle) -> Option<Handle> {
        self.step(handle, Side::Right)
    }

    // Moves one position in key order: into the subtree on `side` if there is one, otherwise up to
    // the nearest ancestor that `handle` is on the opposite side of.
    fn step(&self, handle: Handle, side: Side) -> Option<Handle> {
        if let Some(child) = self.child(handle, side) {
            return Some(self.extreme(child, side.opposite()));
        }
        let mut current = handle;
        while let Some((parent, from)) = self.position(current) {
            if from != side {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    /// Returns every node handle in key order.
    pub fn handles(&self) -> Vec<Handle> {
        let mut ret = Vec::with_capacity(self.len());
        let mut current = self.first();
        while let Some(handle) = current {
            ret.push(handle);
            current = self.successor(handle);
        }
        ret
    }

    /// Exchanges the positions of two nodes in the tree. Their entries stay with the node; the
    /// parent and child links, root identity and balance factor are exchanged.
    pub fn node_swap(&mut self, a: Handle, b: Handle) {
        if a == b {
            return;
        }
        let relabel = |handle: Option<Handle>| match handle {
            Some(handle) if handle == a => Some(b),
            Some(handle) if handle == b => Some(a),
            handle => handle,
        };

        let a_position = self.position(a);
        let b_position = self.position(b);
        let (a_parent, a_left, a_right, a_balance) = {
            let node = self.node(a);
            (node.parent, node.left, node.right, node.balance)
        };
        let (b_parent, b_left, b_right, b_balance) = {
            let node = self.node(b);
            (node.parent, node.left, node.right, node.balance)
        };

        // Outer neighbours first, using the positions captured before any link changed. When the
        // two nodes are siblings both writes land on the shared parent.
        if let Some((parent, side)) = a_position {
            if parent != b {
                self.node_mut(parent).set_child(side, Some(b));
            }
        }
        if let Some((parent, side)) = b_position {
            if parent != a {
                self.node_mut(parent).set_child(side, Some(a));
            }
        }
        for child in a_left.into_iter().chain(a_right).filter(|child| *child != b) {
            self.node_mut(child).parent = Some(b);
        }
        for child in b_left.into_iter().chain(b_right).filter(|child| *child != a) {
            self.node_mut(child).parent = Some(a);
        }

        {
            let node = self.node_mut(a);
            node.parent = relabel(b_parent);
            node.left = relabel(b_left);
            node.right = relabel(b_right);
            node.balance = b_balance;
        }
        {
            let node = self.node_mut(b);
            node.parent = relabel(a_parent);
            node.left = relabel(a_left);
            node.right = relabel(a_right);
            node.balance = a_balance;
        }

        if self.root == Some(a) {
            self.root = Some(b);
        } else if self.root == Some(b) {
            self.root = Some(a);
        }
    }

    // Moves `handle` down towards `side`, promoting its child on the opposite side into its
    // position. Balance factors are left to the caller.
    fn rotate(&mut self, handle: Handle, side: Side) {
        let up = side.opposite();
        let pivot = self
            .child(handle, up)
            .expect("Expected rotated node to have a child to promote.");
        trace!("rotating {:?} {:?} around {:?}", handle, side, pivot);

        let position = self.position(handle);
        let inner = self.child(pivot, side);

        self.node_mut(handle).set_child(up, inner);
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(handle);
        }
        self.node_mut(pivot).set_child(side, Some(handle));
        self.node_mut(handle).parent = Some(pivot);
        self.node_mut(pivot).parent = position.map(|(parent, _)| parent);
        self.replace_child(position, Some(pivot));
    }

    /// Promotes the right child of `handle` into its position.
    pub fn rotate_left(&mut self, handle: Handle) {
        self.rotate(handle, Side::Left);
    }

    /// Promotes the left child of `handle` into its position.
    pub fn rotate_right(&mut self, handle: Handle) {
        self.rotate(handle, Side::Right);
    }

    /// Removes a node from the tree and returns its entry together with the position it was
    /// physically spliced out of. A node with two children is first swapped with its in-order
    /// predecessor, so the spliced position always held at most one child.
    pub fn unlink(&mut self, handle: Handle) -> (Entry<T, U>, Option<(Handle, Side)>) {
        if let (Some(left), Some(_)) = (self.node(handle).left, self.node(handle).right) {
            let predecessor = self.extreme(left, Side::Right);
            self.node_swap(handle, predecessor);
        }

        let position = self.position(handle);
        let child = {
            let node = self.node(handle);
            node.left.or(node.right)
        };
        if let Some(child) = child {
            self.node_mut(child).parent = position.map(|(parent, _)| parent);
        }
        self.replace_child(position, child);

        let node = self.arena.free(&handle);
        (node.entry, position)
    }

    /// Frees every node, children before their parent.
    pub fn clear(&mut self) {
        let mut freed = 0;
        let mut stack: Vec<(Handle, bool)> =
            self.root.take().map(|root| (root, false)).into_iter().collect();
        while let Some((handle, visited)) = stack.pop() {
            if visited {
                self.arena.free(&handle);
                freed += 1;
                continue;
            }
            stack.push((handle, true));
            let node = self.node(handle);
            stack.extend(node.right.into_iter().chain(node.left).map(|child| (child, false)));
        }
        debug!("cleared tree of {} nodes", freed);
    }

    /// Returns the number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut level: Vec<Handle> = self.root.into_iter().collect();
        while !level.is_empty() {
            height += 1;
            level = level
                .iter()
                .flat_map(|handle| {
                    let node = self.node(*handle);
                    node.left.into_iter().chain(node.right)
                })
                .collect();
        }
        height
    }

    /// Returns `true` if the heights of the two subtrees of every node differ by at most one.
    pub fn is_balanced(&self) -> bool {
        self.checked_height(self.root).is_some()
    }

    // The height of the subtree, or `None` as soon as any subtree in it is unbalanced.
    fn checked_height(&self, tree: Option<Handle>) -> Option<usize> {
        let handle = match tree {
            Some(handle) => handle,
            None => return Some(0),
        };
        let left = self.checked_height(self.node(handle).left)?;
        let right = self.checked_height(self.node(handle).right)?;
        if left.max(right) - left.min(right) > 1 {
            return None;
        }
        Some(left.max(right) + 1)
    }

    /// Returns the key-value pairs in key order with mutable access to the values.
    pub fn entries_mut(&mut self) -> Vec<(&T, &mut U)> {
        let handles = self.handles();
        self.arena
            .get_many_mut(&handles)
            .into_iter()
            .map(|node| {
                let Entry { key, value } = &mut node.entry;
                (&*key, value)
            })
            .collect()
    }

    /// Consumes the tree and returns its entries in key order.
    pub fn into_entries(mut self) -> Vec<Entry<T, U>> {
        let handles = self.handles();
        self.root = None;
        handles
            .iter()
            .map(|handle| self.arena.free(handle).entry)
            .collect()
    }
}

impl<T, U> Tree<T, U>
where
    T: Ord,
{
    pub fn search<V>(&self, key: &V) -> Search
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let mut current = match self.root {
            Some(root) => root,
            None => return Search::Vacant(None),
        };
        loop {
            let side = match key.cmp(self.node(current).entry.key.borrow()) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return Search::Found(current),
            };
            match self.child(current, side) {
                Some(child) => current = child,
                None => return Search::Vacant(Some((current, side))),
            }
        }
    }

    pub fn find<V>(&self, key: &V) -> Option<Handle>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        match self.search(key) {
            Search::Found(handle) => Some(handle),
            Search::Vacant(_) => None,
        }
    }

    /// Inserts a key-value pair without rebalancing. An existing key keeps its node and has its
    /// value overwritten. A new node is obtained from `allocate` before anything is linked, so a
    /// failed allocation leaves the tree untouched.
    pub fn insert_with<E, F>(
        &mut self,
        key: T,
        value: U,
        allocate: F,
    ) -> result::Result<Insertion<U>, E>
    where
        F: FnOnce(&mut TypedArena<Node<T, U>>, Node<T, U>) -> result::Result<Handle, E>,
    {
        match self.search(&key) {
            Search::Found(handle) => {
                let old_value = mem::replace(&mut self.node_mut(handle).entry.value, value);
                Ok(Insertion::Replaced(old_value))
            },
            Search::Vacant(position) => {
                let node = Node::new(key, value, position.map(|(parent, _)| parent));
                let handle = allocate(&mut self.arena, node)?;
                self.replace_child(position, Some(handle));
                Ok(Insertion::Created(handle))
            },
        }
    }

    // The closest key on `side` of `key`, or the key itself if present.
    fn nearest<V>(&self, key: &V, side: Side) -> Option<Handle>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let mut current = self.root;
        let mut ret = None;
        while let Some(handle) = current {
            let towards = match key.cmp(self.node(handle).entry.key.borrow()) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return Some(handle),
            };
            if towards != side {
                ret = Some(handle);
            }
            current = self.child(handle, towards);
        }
        ret
    }

    pub fn floor<V>(&self, key: &V) -> Option<Handle>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.nearest(key, Side::Left)
    }

    pub fn ceil<V>(&self, key: &V) -> Option<Handle>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.nearest(key, Side::Right)
    }

    /// Checks parent links, key order and node count, and returns the height of the tree. When
    /// `balanced` is set, also checks that every stored balance factor matches the subtree
    /// heights and lies in `-1..=1`.
    #[cfg(test)]
    pub fn validate(&self, balanced: bool) -> usize {
        fn walk<T: Ord, U>(
            tree: &Tree<T, U>,
            handle: Option<Handle>,
            parent: Option<Handle>,
            balanced: bool,
            count: &mut usize,
        ) -> usize {
            let handle = match handle {
                Some(handle) => handle,
                None => return 0,
            };
            *count += 1;
            let node = tree.node(handle);
            assert_eq!(node.parent, parent);
            if let Some(left) = node.left {
                assert!(tree.node(left).entry.key < node.entry.key);
            }
            if let Some(right) = node.right {
                assert!(tree.node(right).entry.key > node.entry.key);
            }
            let left = walk(tree, node.left, Some(handle), balanced, count) as i64;
            let right = walk(tree, node.right, Some(handle), balanced, count) as i64;
            if balanced {
                assert_eq!(i64::from(node.balance), right - left);
                assert!((-1..=1).contains(&node.balance));
            }
            (left.max(right) + 1) as usize
        }

        let mut count = 0;
        let height = walk(self, self.root, None, balanced, &mut count);
        assert_eq!(count, self.len());
        let keys: Vec<&T> = self
            .handles()
            .into_iter()
            .map(|handle| &self.node(handle).entry.key)
            .collect();
        assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
        height
    }
}

#[cfg(test)]
mod tests {
    use super::{allocate, Insertion, Search, Tree};
    use crate::arena::Handle;
    use crate::bst::node::Side;

    fn insert(tree: &mut Tree<u32, u32>, key: u32) -> Handle {
        match tree.insert_with(key, key, allocate) {
            Ok(Insertion::Created(handle)) => handle,
            _ => panic!("expected a new node"),
        }
    }

    fn build(keys: &[u32]) -> (Tree<u32, u32>, Vec<Handle>) {
        let mut tree = Tree::new(4);
        let handles = keys.iter().map(|key| insert(&mut tree, *key)).collect();
        (tree, handles)
    }

    fn keys(tree: &Tree<u32, u32>) -> Vec<u32> {
        tree.handles().into_iter().map(|handle| tree.node(handle).entry.key).collect()
    }

    #[test]
    fn test_search_empty() {
        let tree: Tree<u32, u32> = Tree::new(4);
        match tree.search(&1) {
            Search::Vacant(None) => {},
            _ => panic!("expected an empty tree"),
        }
    }

    #[test]
    fn test_predecessor_successor() {
        let (tree, handles) = build(&[4, 2, 6, 1, 3, 5, 7]);
        assert_eq!(tree.successor(handles[4]), Some(handles[0]));
        assert_eq!(tree.predecessor(handles[0]), Some(handles[4]));
        assert_eq!(tree.successor(handles[0]), Some(handles[5]));
        assert_eq!(tree.predecessor(handles[5]), Some(handles[0]));
        assert_eq!(tree.successor(handles[6]), None);
        assert_eq!(tree.predecessor(handles[3]), None);
        assert_eq!(keys(&tree), vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_node_swap_adjacent_left() {
        // 4 has left child 2, which has no right child: 2 is 4's predecessor and direct child
        let (mut tree, handles) = build(&[4, 2, 6, 1]);
        tree.node_swap(handles[0], handles[1]);
        assert_eq!(tree.root(), Some(handles[1]));
        assert_eq!(tree.node(handles[1]).left, Some(handles[0]));
        assert_eq!(tree.node(handles[1]).right, Some(handles[2]));
        assert_eq!(tree.node(handles[0]).parent, Some(handles[1]));
        assert_eq!(tree.node(handles[0]).left, Some(handles[3]));
        assert_eq!(tree.node(handles[3]).parent, Some(handles[0]));
        assert_eq!(tree.node(handles[2]).parent, Some(handles[1]));

        // swapping back restores the original shape
        tree.node_swap(handles[1], handles[0]);
        assert_eq!(tree.root(), Some(handles[0]));
        tree.validate(false);
    }

    #[test]
    fn test_node_swap_adjacent_right() {
        let (mut tree, handles) = build(&[2, 1, 4, 3, 5]);
        tree.node_swap(handles[2], handles[0]);
        assert_eq!(tree.root(), Some(handles[2]));
        assert_eq!(tree.node(handles[2]).right, Some(handles[0]));
        assert_eq!(tree.node(handles[2]).left, Some(handles[1]));
        assert_eq!(tree.node(handles[0]).left, Some(handles[3]));
        assert_eq!(tree.node(handles[0]).right, Some(handles[4]));
        assert_eq!(tree.node(handles[4]).parent, Some(handles[0]));
        assert_eq!(tree.node(handles[1]).parent, Some(handles[2]));
    }

    #[test]
    fn test_node_swap_disjoint() {
        // 3 sits two levels below 5 and is not adjacent to it
        let (mut tree, handles) = build(&[5, 2, 8, 1, 3, 4]);
        tree.node_swap(handles[0], handles[4]);
        assert_eq!(tree.root(), Some(handles[4]));
        assert_eq!(tree.node(handles[4]).left, Some(handles[1]));
        assert_eq!(tree.node(handles[4]).right, Some(handles[2]));
        assert_eq!(tree.node(handles[1]).right, Some(handles[0]));
        assert_eq!(tree.node(handles[0]).parent, Some(handles[1]));
        assert_eq!(tree.node(handles[0]).right, Some(handles[5]));
        assert_eq!(tree.node(handles[5]).parent, Some(handles[0]));
        tree.node_swap(handles[4], handles[0]);
        tree.validate(false);
    }

    #[test]
    fn test_node_swap_siblings() {
        let (mut tree, handles) = build(&[2, 1, 3]);
        tree.node_swap(handles[1], handles[2]);
        assert_eq!(tree.node(handles[0]).left, Some(handles[2]));
        assert_eq!(tree.node(handles[0]).right, Some(handles[1]));
        assert_eq!(tree.node(handles[1]).parent, Some(handles[0]));
    }

    #[test]
    fn test_node_swap_exchanges_balance() {
        let (mut tree, handles) = build(&[2, 1]);
        tree.node_mut(handles[0]).balance = -1;
        tree.node_swap(handles[0], handles[1]);
        assert_eq!(tree.node(handles[1]).balance, -1);
        assert_eq!(tree.node(handles[0]).balance, 0);
    }

    #[test]
    fn test_rotations() {
        let (mut tree, handles) = build(&[1, 2, 3]);
        tree.rotate_left(handles[0]);
        assert_eq!(tree.root(), Some(handles[1]));
        assert_eq!(tree.node(handles[1]).left, Some(handles[0]));
        assert_eq!(tree.node(handles[1]).right, Some(handles[2]));
        assert_eq!(tree.node(handles[1]).parent, None);
        tree.validate(false);

        tree.rotate_right(handles[1]);
        assert_eq!(tree.root(), Some(handles[0]));
        assert_eq!(tree.position(handles[1]), Some((handles[0], Side::Right)));
        tree.validate(false);
    }

    #[test]
    fn test_rotation_moves_inner_subtree() {
        let (mut tree, handles) = build(&[4, 2, 6, 5, 7]);
        tree.rotate_left(handles[0]);
        assert_eq!(tree.root(), Some(handles[2]));
        assert_eq!(tree.node(handles[0]).right, Some(handles[3]));
        assert_eq!(tree.node(handles[3]).parent, Some(handles[0]));
        assert_eq!(keys(&tree), vec![2, 4, 5, 6, 7]);
    }

    #[test]
    fn test_unlink_two_children() {
        let (mut tree, handles) = build(&[5, 2, 8, 1, 3, 4]);
        let (entry, position) = tree.unlink(handles[0]);
        assert_eq!(entry.key, 5);
        // 5 was swapped with its predecessor 4 and spliced out from under 3
        assert_eq!(position, Some((handles[4], Side::Right)));
        assert_eq!(tree.root(), Some(handles[5]));
        assert_eq!(keys(&tree), vec![1, 2, 3, 4, 8]);
        tree.validate(false);
    }

    #[test]
    fn test_clear() {
        let (mut tree, _) = build(&[5, 2, 8, 1, 3, 4]);
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn test_is_balanced() {
        let (tree, _) = build(&[2, 1, 3]);
        assert!(tree.is_balanced());
        let (tree, _) = build(&[1, 2, 3]);
        assert!(!tree.is_balanced());
        assert_eq!(tree.height(), 3);
    }

    #[test]
    fn test_failed_allocation_leaves_tree_unchanged() {
        let (mut tree, _) = build(&[4, 2, 6, 1, 3, 5, 7]);
        let before = tree.handles();
        let height = tree.height();

        match tree.insert_with(8, 8, |_, _| Err(())) {
            Err(()) => {},
            _ => panic!("expected the allocation failure to be returned"),
        }
        assert_eq!(tree.len(), 7);
        assert_eq!(tree.handles(), before);
        assert_eq!(tree.height(), height);
        assert!(tree.find(&8).is_none());
        tree.validate(true);

        // an existing key never reaches the allocator
        match tree.insert_with(3, 30, |_, _| Err(())) {
            Ok(Insertion::Replaced(3)) => {},
            _ => panic!("expected the value to be replaced"),
        }
        assert_eq!(tree.node(tree.find(&3).unwrap()).entry.value, 30);
    }

    #[test]
    fn test_entries_mut_in_key_order() {
        let (mut tree, handles) = build(&[4, 2, 6, 1, 3]);
        tree.unlink(handles[1]);
        insert(&mut tree, 5);
        for (key, value) in tree.entries_mut() {
            *value = key * 10;
        }
        let entries: Vec<(u32, u32)> = tree
            .handles()
            .into_iter()
            .map(|handle| (tree.node(handle).entry.key, tree.node(handle).entry.value))
            .collect();
        assert_eq!(entries, vec![(1, 10), (3, 30), (4, 40), (5, 50), (6, 60)]);
    }

    #[test]
    fn test_floor_ceil() {
        let (tree, handles) = build(&[3, 1, 5]);
        assert_eq!(tree.floor(&0), None);
        assert_eq!(tree.floor(&2), Some(handles[1]));
        assert_eq!(tree.floor(&5), Some(handles[2]));
        assert_eq!(tree.ceil(&2), Some(handles[0]));
        assert_eq!(tree.ceil(&6), None);
    }
}
