use std::fmt;

pub(crate) const LEFT: usize = 0;
pub(crate) const RIGHT: usize = 1;

/// Handle to a node of an [`RbTree`](crate::RbTree).
///
/// Handles stay valid until the entry they point at is deleted. Deleting
/// another key never invalidates them, even when the deleted node had two
/// children.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) const NIL: Self = Self(usize::MAX);

    #[inline(always)]
    pub(crate) fn is_nil(self) -> bool {
        self.0 == usize::MAX
    }

    #[inline(always)]
    pub(crate) fn idx(self) -> usize {
        self.0
    }
}

#[inline(always)]
pub(crate) fn id(idx: usize) -> NodeId {
    debug_assert!(idx != usize::MAX);
    NodeId(idx)
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nil() {
            f.write_str("NodeId(NIL)")
        } else {
            write!(f, "NodeId({})", self.0)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

/// Structural part of a node. The sentinel is a bare `Links`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Links {
    pub(crate) ch: [NodeId; 2],
    pub(crate) p: NodeId,
    pub(crate) color: Color,
}

impl Links {
    pub(crate) const SENTINEL: Self = Self {
        ch: [NodeId::NIL, NodeId::NIL],
        p: NodeId::NIL,
        color: Color::Black,
    };
}

pub(crate) struct Node<K, V> {
    pub(crate) links: Links,
    pub(crate) key: K,
    pub(crate) value: V,
}

impl<K, V> Node<K, V> {
    /// Fresh red leaf hanging below `parent`.
    pub(crate) fn new(key: K, value: V, parent: NodeId) -> Self {
        Self {
            links: Links {
                ch: [NodeId::NIL, NodeId::NIL],
                p: parent,
                color: Color::Red,
            },
            key,
            value,
        }
    }
}
