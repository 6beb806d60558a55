use crate::arena::Handle;
use crate::bst::node::Side;
use crate::bst::tree::Tree;
use log::trace;

// Rotates `handle` so that its child on `side` takes its place.
fn promote<T, U>(tree: &mut Tree<T, U>, handle: Handle, side: Side) {
    match side {
        Side::Left => tree.rotate_right(handle),
        Side::Right => tree.rotate_left(handle),
    }
}

// Assigns balance factors after a double rotation. `top` was the unbalanced node leaning towards
// `sign`, `near` its child on that side and `pivot` the grandchild that now roots the subtree.
fn settle_double_rotation<T, U>(
    tree: &mut Tree<T, U>,
    top: Handle,
    near: Handle,
    pivot: Handle,
    sign: i8,
) {
    let pivot_balance = tree.node(pivot).balance;
    let (top_balance, near_balance) = if pivot_balance == sign {
        (-sign, 0)
    } else if pivot_balance == 0 {
        (0, 0)
    } else {
        (0, sign)
    };
    tree.node_mut(top).balance = top_balance;
    tree.node_mut(near).balance = near_balance;
    tree.node_mut(pivot).balance = 0;
}

/// Restores the AVL invariant after `handle` was linked into the tree as a new leaf.
pub fn fix_after_insert<T, U>(tree: &mut Tree<T, U>, handle: Handle) {
    let (parent, side) = match tree.position(handle) {
        Some(position) => position,
        None => return,
    };
    let node = tree.node_mut(parent);
    if node.balance == 0 {
        node.balance = side.sign();
        insert_fix(tree, parent, handle);
    } else {
        // the leaf filled the shorter side
        node.balance = 0;
        trace!("insert fix: absorbed at {:?}", parent);
    }
}

// The subtree rooted at `parent` grew by one level through `child`. Walks up until the growth is
// absorbed or a rotation restores the previous height.
fn insert_fix<T, U>(tree: &mut Tree<T, U>, mut parent: Handle, mut child: Handle) {
    while let Some((grandparent, side)) = tree.position(parent) {
        let sign = side.sign();
        let balance = tree.node(grandparent).balance + sign;

        if balance == 0 {
            tree.node_mut(grandparent).balance = 0;
            trace!("insert fix: absorbed at {:?}", grandparent);
            return;
        }
        if balance == sign {
            tree.node_mut(grandparent).balance = balance;
            child = parent;
            parent = grandparent;
            continue;
        }

        if tree.child(parent, side) == Some(child) {
            trace!("insert fix: single rotation at {:?}", grandparent);
            promote(tree, grandparent, side);
            tree.node_mut(parent).balance = 0;
            tree.node_mut(grandparent).balance = 0;
        } else {
            trace!("insert fix: double rotation at {:?}", grandparent);
            promote(tree, parent, side.opposite());
            promote(tree, grandparent, side);
            settle_double_rotation(tree, grandparent, parent, child, sign);
        }
        return;
    }
    trace!("insert fix: reached the root");
}

/// Restores the AVL invariant after a node was spliced out of `position`, whose subtree is now one
/// level shorter.
pub fn fix_after_remove<T, U>(tree: &mut Tree<T, U>, position: Option<(Handle, Side)>) {
    let (mut node, side) = match position {
        Some(position) => position,
        None => return,
    };
    let mut diff = -side.sign();

    loop {
        let next = tree.position(node);
        let balance = tree.node(node).balance + diff;

        let shrunk = if balance == diff {
            tree.node_mut(node).balance = balance;
            false
        } else if balance == 0 {
            tree.node_mut(node).balance = 0;
            true
        } else {
            let heavy = Side::from_sign(balance);
            let sign = heavy.sign();
            let child = tree
                .child(node, heavy)
                .expect("Expected heavy side of an unbalanced node to be non-empty.");
            let child_balance = tree.node(child).balance;

            if child_balance == sign {
                trace!("remove fix: single rotation at {:?}", node);
                promote(tree, node, heavy);
                tree.node_mut(node).balance = 0;
                tree.node_mut(child).balance = 0;
                true
            } else if child_balance == 0 {
                trace!("remove fix: single rotation at {:?}, height kept", node);
                promote(tree, node, heavy);
                tree.node_mut(node).balance = sign;
                tree.node_mut(child).balance = -sign;
                false
            } else {
                trace!("remove fix: double rotation at {:?}", node);
                let pivot = tree
                    .child(child, heavy.opposite())
                    .expect("Expected inner grandchild of an unbalanced node to be non-empty.");
                promote(tree, child, heavy.opposite());
                promote(tree, node, heavy);
                settle_double_rotation(tree, node, child, pivot, sign);
                true
            }
        };

        if !shrunk {
            trace!("remove fix: height kept at {:?}", node);
            return;
        }
        match next {
            Some((parent, side)) => {
                node = parent;
                diff = -side.sign();
            },
            None => {
                trace!("remove fix: reached the root");
                return;
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{fix_after_insert, fix_after_remove};
    use crate::bst::tree::{allocate, Insertion, Tree};
    use log::{LevelFilter, Log, Metadata, Record};
    use std::sync::{Mutex, Once};
    use std::thread::{self, ThreadId};

    struct Recorder {
        lines: Mutex<Vec<(ThreadId, String)>>,
    }

    impl Log for Recorder {
        fn enabled(&self, _: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            if let Ok(mut lines) = self.lines.lock() {
                lines.push((thread::current().id(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    static RECORDER: Recorder = Recorder {
        lines: Mutex::new(Vec::new()),
    };
    static INIT: Once = Once::new();

    // Returns the messages logged on this thread while running `f`.
    fn record<F: FnOnce()>(f: F) -> Vec<String> {
        INIT.call_once(|| {
            log::set_logger(&RECORDER).expect("logger already installed");
            log::set_max_level(LevelFilter::Trace);
        });
        let id = thread::current().id();
        let start = RECORDER.lines.lock().unwrap().len();
        f();
        RECORDER.lines.lock().unwrap()[start..]
            .iter()
            .filter(|(thread, _)| *thread == id)
            .map(|(_, line)| line.clone())
            .collect()
    }

    fn insert(tree: &mut Tree<u32, ()>, key: u32) {
        match tree.insert_with(key, (), allocate) {
            Ok(Insertion::Created(handle)) => fix_after_insert(tree, handle),
            _ => panic!("expected a new node"),
        }
    }

    fn remove(tree: &mut Tree<u32, ()>, key: u32) {
        let handle = tree.find(&key).expect("expected key to be present");
        let (_, position) = tree.unlink(handle);
        fix_after_remove(tree, position);
    }

    fn build(keys: &[u32]) -> Tree<u32, ()> {
        let mut tree = Tree::new(8);
        for key in keys {
            insert(&mut tree, *key);
        }
        tree.validate(true);
        tree
    }

    #[test]
    fn test_insert_fix_logs_termination() {
        let mut tree = build(&[2, 1]);
        let lines = record(|| insert(&mut tree, 3));
        assert!(lines.iter().any(|line| line.starts_with("insert fix: absorbed at")));

        let lines = record(|| insert(&mut tree, 4));
        assert!(lines.iter().any(|line| line == "insert fix: reached the root"));

        let lines = record(|| insert(&mut tree, 5));
        assert!(lines.iter().any(|line| line.starts_with("insert fix: single rotation at")));
        tree.validate(true);
    }

    #[test]
    fn test_remove_fix_logs_termination() {
        let mut tree = build(&[2, 1, 3, 4]);
        let lines = record(|| remove(&mut tree, 4));
        assert!(lines.iter().any(|line| line == "remove fix: reached the root"));

        let mut tree = build(&[2, 1, 3]);
        let lines = record(|| remove(&mut tree, 3));
        assert!(lines.iter().any(|line| line.starts_with("remove fix: height kept at")));

        let mut tree = build(&[2, 1, 3, 4]);
        let lines = record(|| remove(&mut tree, 1));
        assert!(lines.iter().any(|line| line.starts_with("remove fix: single rotation at")));
        tree.validate(true);
    }
}
