use std::mem;

use comparable::Comparable;
use slab::Slab;

use crate::node::{Color, LEFT, Links, Node, NodeId, RIGHT, id};

/// Red-black tree map with a shared black sentinel.
///
/// - Keys are unique; inserting an equal key replaces both key and value.
/// - Every comparison goes through [`Comparable::less`].
/// - Node handles ([`NodeId`]) are stable across unrelated insertions and deletions.
pub struct RbTree<K, V> {
    pub(crate) nodes: Slab<Node<K, V>>,
    /// Sentinel: every absent child, and the parent of the root.
    pub(crate) nil: Links,
    pub(crate) root: NodeId,
    pub(crate) len: usize,
}

impl<K, V> RbTree<K, V> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Slab::with_capacity(capacity),
            nil: Links::SENTINEL,
            root: NodeId::NIL,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nil = Links::SENTINEL;
        self.root = NodeId::NIL;
        self.len = 0;
    }

    /// # Panics
    ///
    /// Panics if `node` was deleted and its slot has not been reused.
    pub fn key(&self, node: NodeId) -> &K {
        &self.node(node).key
    }

    /// # Panics
    ///
    /// Panics if `node` was deleted and its slot has not been reused.
    pub fn value(&self, node: NodeId) -> &V {
        &self.node(node).value
    }

    /// The value is not used for ordering, so it may be changed freely.
    ///
    /// # Panics
    ///
    /// Panics if `node` was deleted and its slot has not been reused.
    pub fn value_mut(&mut self, node: NodeId) -> &mut V {
        &mut self.node_mut(node).value
    }

    /// # Panics
    ///
    /// Panics if `node` was deleted and its slot has not been reused.
    pub fn entry(&self, node: NodeId) -> (&K, &V) {
        let node = self.node(node);
        (&node.key, &node.value)
    }

    pub fn min(&self) -> Option<NodeId> {
        (!self.root.is_nil()).then(|| self.extreme(self.root, LEFT))
    }

    pub fn max(&self) -> Option<NodeId> {
        (!self.root.is_nil()).then(|| self.extreme(self.root, RIGHT))
    }

    /// In-order successor. `node` must belong to this tree.
    pub fn next(&self, node: NodeId) -> Option<NodeId> {
        self.step(node, RIGHT)
    }

    /// In-order predecessor. `node` must belong to this tree.
    pub fn prev(&self, node: NodeId) -> Option<NodeId> {
        self.step(node, LEFT)
    }

    #[inline(always)]
    pub(crate) fn node(&self, x: NodeId) -> &Node<K, V> {
        debug_assert!(!x.is_nil());
        &self.nodes[x.idx()]
    }

    #[inline(always)]
    fn node_mut(&mut self, x: NodeId) -> &mut Node<K, V> {
        debug_assert!(!x.is_nil());
        &mut self.nodes[x.idx()]
    }

    #[inline(always)]
    pub(crate) fn links(&self, x: NodeId) -> &Links {
        if x.is_nil() {
            &self.nil
        } else {
            &self.nodes[x.idx()].links
        }
    }

    #[inline(always)]
    fn links_mut(&mut self, x: NodeId) -> &mut Links {
        if x.is_nil() {
            &mut self.nil
        } else {
            &mut self.nodes[x.idx()].links
        }
    }

    #[inline(always)]
    pub(crate) fn child(&self, x: NodeId, dir: usize) -> NodeId {
        self.links(x).ch[dir]
    }

    #[inline(always)]
    pub(crate) fn parent(&self, x: NodeId) -> NodeId {
        self.links(x).p
    }

    #[inline(always)]
    pub(crate) fn color(&self, x: NodeId) -> Color {
        self.links(x).color
    }

    #[inline(always)]
    fn is_red(&self, x: NodeId) -> bool {
        self.color(x) == Color::Red
    }

    #[inline(always)]
    fn set_child(&mut self, x: NodeId, dir: usize, c: NodeId) {
        debug_assert!(!x.is_nil());
        self.links_mut(x).ch[dir] = c;
    }

    #[inline(always)]
    fn set_parent(&mut self, x: NodeId, p: NodeId) {
        self.links_mut(x).p = p;
    }

    #[inline(always)]
    fn set_color(&mut self, x: NodeId, color: Color) {
        debug_assert!(!(x.is_nil() && color == Color::Red));
        self.links_mut(x).color = color;
    }

    /// Which child of its parent `x` is. The parent must be a real node.
    #[inline(always)]
    fn side(&self, x: NodeId) -> usize {
        if self.child(self.parent(x), LEFT) == x {
            LEFT
        } else {
            RIGHT
        }
    }

    fn extreme(&self, mut x: NodeId, dir: usize) -> NodeId {
        loop {
            let c = self.child(x, dir);
            if c.is_nil() {
                return x;
            }
            x = c;
        }
    }

    fn step(&self, mut x: NodeId, dir: usize) -> Option<NodeId> {
        let c = self.child(x, dir);
        if !c.is_nil() {
            return Some(self.extreme(c, dir ^ 1));
        }
        let mut y = self.parent(x);
        while !y.is_nil() && x == self.child(y, dir) {
            x = y;
            y = self.parent(y);
        }
        (!y.is_nil()).then_some(y)
    }

    /// Rotation toward `dir`: `rotate(x, LEFT)` lifts the right child of `x`.
    fn rotate(&mut self, x: NodeId, dir: usize) {
        let y = self.child(x, dir ^ 1);
        debug_assert!(!y.is_nil());
        let inner = self.child(y, dir);
        self.set_child(x, dir ^ 1, inner);
        if !inner.is_nil() {
            self.set_parent(inner, x);
        }
        let p = self.parent(x);
        self.set_parent(y, p);
        if p.is_nil() {
            self.root = y;
        } else {
            let side = self.side(x);
            self.set_child(p, side, y);
        }
        self.set_child(y, dir, x);
        self.set_parent(x, y);
    }

    fn insert_fixup(&mut self, mut z: NodeId) {
        while self.is_red(self.parent(z)) {
            // A red parent is never the root, so the grandparent is real.
            let p = self.parent(z);
            let g = self.parent(p);
            let side = self.side(p);
            let uncle = self.child(g, side ^ 1);
            if self.is_red(uncle) {
                self.set_color(p, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(g, Color::Red);
                z = g;
            } else {
                if z == self.child(p, side ^ 1) {
                    z = p;
                    self.rotate(z, side);
                }
                let p = self.parent(z);
                let g = self.parent(p);
                self.set_color(p, Color::Black);
                self.set_color(g, Color::Red);
                self.rotate(g, side ^ 1);
            }
        }
        let root = self.root;
        self.set_color(root, Color::Black);
    }

    /// Returns the entry stored at `z`. When `z` has two children, the node of
    /// its successor is unlinked instead and the successor's entry moves into `z`.
    fn remove_node(&mut self, z: NodeId) -> (K, V) {
        let y = if self.child(z, LEFT).is_nil() || self.child(z, RIGHT).is_nil() {
            z
        } else {
            self.extreme(self.child(z, RIGHT), LEFT)
        };
        let x = if self.child(y, LEFT).is_nil() {
            self.child(y, RIGHT)
        } else {
            self.child(y, LEFT)
        };

        // `x` may be the sentinel; its parent is read back by `delete_fixup`.
        let yp = self.parent(y);
        self.set_parent(x, yp);
        if yp.is_nil() {
            self.root = x;
        } else {
            let side = self.side(y);
            self.set_child(yp, side, x);
        }

        let removed = self.nodes.remove(y.idx());
        self.len -= 1;
        let entry = if y == z {
            (removed.key, removed.value)
        } else {
            let target = self.node_mut(z);
            (
                mem::replace(&mut target.key, removed.key),
                mem::replace(&mut target.value, removed.value),
            )
        };

        if removed.links.color == Color::Black {
            self.delete_fixup(x);
        }
        entry
    }

    fn delete_fixup(&mut self, mut x: NodeId) {
        while x != self.root && !self.is_red(x) {
            let p = self.parent(x);
            let side = self.side(x);
            let far = side ^ 1;
            let mut w = self.child(p, far);
            if self.is_red(w) {
                self.set_color(w, Color::Black);
                self.set_color(p, Color::Red);
                self.rotate(p, side);
                w = self.child(p, far);
            }
            if !self.is_red(self.child(w, LEFT)) && !self.is_red(self.child(w, RIGHT)) {
                self.set_color(w, Color::Red);
                x = p;
            } else {
                if !self.is_red(self.child(w, far)) {
                    let near = self.child(w, side);
                    self.set_color(near, Color::Black);
                    self.set_color(w, Color::Red);
                    self.rotate(w, far);
                    w = self.child(p, far);
                }
                let parent_color = self.color(p);
                self.set_color(w, parent_color);
                self.set_color(p, Color::Black);
                let far_child = self.child(w, far);
                self.set_color(far_child, Color::Black);
                self.rotate(p, side);
                x = self.root;
            }
        }
        self.set_color(x, Color::Black);
    }
}

impl<K: Comparable, V> RbTree<K, V> {
    pub fn find(&self, key: &K) -> Option<NodeId> {
        let mut x = self.root;
        while !x.is_nil() {
            let node = self.node(x);
            if key.less(&node.key) {
                x = node.links.ch[LEFT];
            } else if node.key.less(key) {
                x = node.links.ch[RIGHT];
            } else {
                return Some(x);
            }
        }
        None
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key).map(|x| &self.node(x).value)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let x = self.find(key)?;
        Some(&mut self.node_mut(x).value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Inserts `key`, replacing the key and value of an equal entry in place.
    /// The replaced pair is dropped.
    pub fn insert(&mut self, key: K, value: V) {
        let mut parent = NodeId::NIL;
        let mut dir = LEFT;
        let mut x = self.root;
        while !x.is_nil() {
            let node = self.node(x);
            dir = if key.less(&node.key) {
                LEFT
            } else if node.key.less(&key) {
                RIGHT
            } else {
                let node = self.node_mut(x);
                node.key = key;
                node.value = value;
                return;
            };
            parent = x;
            x = self.child(x, dir);
        }

        let z = id(self.nodes.insert(Node::new(key, value, parent)));
        if parent.is_nil() {
            self.root = z;
        } else {
            self.set_child(parent, dir, z);
        }
        self.len += 1;
        self.insert_fixup(z);
    }

    /// Returns whether `key` was present.
    pub fn delete(&mut self, key: &K) -> bool {
        self.remove(key).is_some()
    }

    /// Like [`delete`](Self::delete), but hands the removed entry back.
    pub fn remove(&mut self, key: &K) -> Option<(K, V)> {
        let z = self.find(key)?;
        Some(self.remove_node(z))
    }
}

impl<K, V> Default for RbTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::RbTree;
    use crate::node::{Color, LEFT, NodeId, RIGHT};
    use comparable::Comparable;

    fn walk<K: Copy, V>(tree: &RbTree<K, V>) -> Vec<K> {
        let mut out = Vec::with_capacity(tree.len());
        let mut cur = tree.min();
        while let Some(x) = cur {
            out.push(*tree.key(x));
            cur = tree.next(x);
        }
        out
    }

    fn walk_back<K: Copy, V>(tree: &RbTree<K, V>) -> Vec<K> {
        let mut out = Vec::with_capacity(tree.len());
        let mut cur = tree.max();
        while let Some(x) = cur {
            out.push(*tree.key(x));
            cur = tree.prev(x);
        }
        out
    }

    fn sample() -> RbTree<u32, u32> {
        let mut tree = RbTree::new();
        for k in [5, 3, 8, 1, 4, 7, 9, 2, 6, 0] {
            tree.insert(k, k);
        }
        tree
    }

    #[test]
    fn empty_tree() {
        let mut tree = RbTree::<u32, u32>::new();
        assert_eq!(tree.len(), 0);
        assert!(tree.is_empty());
        assert_eq!(tree.min(), None);
        assert_eq!(tree.max(), None);
        assert_eq!(tree.find(&1), None);
        assert!(!tree.delete(&1));
        assert_eq!(tree.remove(&1), None);
        assert_eq!(tree.check_invariants(), Ok(0));
    }

    #[test]
    fn round_trip() {
        let tree = sample();
        assert_eq!(tree.len(), 10);
        assert_eq!(tree.min().map(|x| *tree.key(x)), Some(0));
        assert_eq!(tree.max().map(|x| *tree.key(x)), Some(9));
        assert_eq!(walk(&tree), (0..10).collect::<Vec<_>>());
        assert_eq!(walk_back(&tree), (0..10).rev().collect::<Vec<_>>());
        for k in 0..10 {
            assert_eq!(tree.get(&k), Some(&k));
        }
        assert!(tree.check_invariants().is_ok());
    }

    #[test]
    fn delete_node_with_two_children() {
        let mut tree = sample();
        let five = tree.find(&5).unwrap();
        assert!(!tree.child(five, LEFT).is_nil());
        assert!(!tree.child(five, RIGHT).is_nil());

        assert!(tree.delete(&5));
        assert_eq!(tree.len(), 9);
        assert_eq!(tree.find(&5), None);
        assert_eq!(walk(&tree), vec![0, 1, 2, 3, 4, 6, 7, 8, 9]);
        assert!(tree.check_invariants().is_ok());

        assert!(!tree.delete(&5));
        assert_eq!(tree.len(), 9);
    }

    #[test]
    fn replace_keeps_len() {
        let mut tree = RbTree::new();
        tree.insert(1, "x");
        tree.insert(5, "a");
        let before = tree.len();
        tree.insert(5, "b");
        assert_eq!(tree.len(), before);
        assert_eq!(tree.get(&5), Some(&"b"));
    }

    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Tagged {
        order: u32,
        tag: char,
    }

    impl Comparable for Tagged {
        fn less(&self, other: &Self) -> bool {
            self.order < other.order
        }
    }

    #[test]
    fn replace_overwrites_key_object() {
        let mut tree = RbTree::new();
        for order in 0..8 {
            tree.insert(Tagged { order, tag: 'a' }, order);
        }
        let before = tree.find(&Tagged { order: 3, tag: '?' }).unwrap();
        tree.insert(Tagged { order: 3, tag: 'b' }, 30);
        let after = tree.find(&Tagged { order: 3, tag: '?' }).unwrap();
        assert_eq!(before, after);
        assert_eq!(tree.key(after).tag, 'b');
        assert_eq!(*tree.value(after), 30);
        assert_eq!(tree.len(), 8);
    }

    #[test]
    fn ascending_and_descending_inserts() {
        let mut up = RbTree::new();
        let mut down = RbTree::new();
        for i in 0..100_u32 {
            up.insert(i, i);
            down.insert(99 - i, i);
            assert!(up.check_invariants().is_ok());
            assert!(down.check_invariants().is_ok());
        }
        assert_eq!(up.len(), 100);
        assert_eq!(down.len(), 100);
        assert_eq!(walk(&up), walk(&down));
        assert_eq!(walk_back(&up), (0..100).rev().collect::<Vec<_>>());
    }

    #[test]
    fn delete_upper_half_keeps_values() {
        let mut tree = RbTree::new();
        for i in 1..=100_u32 {
            tree.insert(i, i as usize);
        }
        for i in 51..=100 {
            assert!(tree.delete(&i));
        }
        assert_eq!(tree.len(), 50);
        let mut cur = tree.min();
        for i in 1..=50 {
            let x = cur.unwrap();
            assert_eq!(tree.entry(x), (&i, &(i as usize)));
            cur = tree.next(x);
        }
        assert_eq!(cur, None);

        for i in 1..=50 {
            assert!(tree.delete(&i));
            assert!(tree.check_invariants().is_ok());
        }
        assert!(tree.is_empty());
        assert_eq!(tree.root, NodeId::NIL);
    }

    #[test]
    fn handles_survive_unrelated_deletes() {
        let mut tree = sample();
        let handles: Vec<_> = (0..10).map(|k| tree.find(&k).unwrap()).collect();
        // 5 has two children: its successor's node is freed, 5's node is reused.
        let (k, v) = tree.remove(&5).unwrap();
        assert_eq!((k, v), (5, 5));
        for k in [0_u32, 1, 2, 3, 4, 7, 8, 9] {
            let h = handles[k as usize];
            assert_eq!(tree.find(&k), Some(h));
            assert_eq!(*tree.key(h), k);
        }
        // The node that held 5 now holds its successor.
        assert_eq!(tree.entry(handles[5]), (&6, &6));
        assert_eq!(tree.find(&6), Some(handles[5]));
    }

    #[test]
    fn value_mut_through_handle() {
        let mut tree = sample();
        let x = tree.find(&7).unwrap();
        *tree.value_mut(x) += 100;
        assert_eq!(tree.get(&7), Some(&107));
        *tree.get_mut(&2).unwrap() = 0;
        assert_eq!(tree.get(&2), Some(&0));
        assert!(tree.get_mut(&42).is_none());
        assert!(tree.contains_key(&9));
        assert!(!tree.contains_key(&10));
    }

    #[test]
    fn rotations_relink_parents() {
        let mut tree = RbTree::new();
        for k in [2_u32, 1, 3] {
            tree.insert(k, ());
        }
        let two = tree.find(&2).unwrap();
        let three = tree.find(&3).unwrap();
        assert_eq!(tree.root, two);

        tree.rotate(two, LEFT);
        assert_eq!(tree.root, three);
        assert_eq!(tree.parent(three), NodeId::NIL);
        assert_eq!(tree.child(three, LEFT), two);
        assert_eq!(tree.parent(two), three);
        assert_eq!(walk(&tree), vec![1, 2, 3]);

        tree.rotate(three, RIGHT);
        assert_eq!(tree.root, two);
        assert_eq!(tree.parent(two), NodeId::NIL);
        assert_eq!(tree.child(two, RIGHT), three);
        assert_eq!(tree.parent(three), two);
        assert_eq!(walk(&tree), vec![1, 2, 3]);
    }

    #[test]
    fn deleting_black_leaf_uses_sentinel_position() {
        let mut tree = RbTree::new();
        for k in 0..7_u32 {
            tree.insert(k, ());
        }
        let leaf = tree.min().unwrap();
        assert_eq!(tree.color(leaf), Color::Black);
        assert!(tree.delete(&0));
        assert_eq!(tree.color(NodeId::NIL), Color::Black);
        assert!(tree.check_invariants().is_ok());
        assert_eq!(walk(&tree), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    #[should_panic]
    fn entry_of_deleted_handle_panics() {
        let mut tree = RbTree::new();
        tree.insert(1_u32, 'a');
        let x = tree.find(&1).unwrap();
        assert!(tree.delete(&1));
        let _ = tree.entry(x);
    }

    #[test]
    fn clear_resets() {
        let mut tree = sample();
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.min(), None);
        tree.insert(1, 1);
        assert_eq!(walk(&tree), vec![1]);
    }
}
