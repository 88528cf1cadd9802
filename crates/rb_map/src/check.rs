use std::fmt::Debug;

use comparable::Comparable;
use log::{debug, error};
use thiserror::Error;

use crate::node::{Color, LEFT, NodeId, RIGHT};
use crate::tree::RbTree;

/// A broken red-black or search-tree property found by
/// [`RbTree::check_invariants`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantError {
    #[error("root {0:?} is red")]
    RedRoot(NodeId),

    #[error("sentinel is red")]
    RedSentinel,

    #[error("red node {0:?} has a red child")]
    RedRed(NodeId),

    #[error("black-height mismatch below {node:?}: left {left}, right {right}")]
    BlackHeight {
        node: NodeId,
        left: usize,
        right: usize,
    },

    #[error("{child:?} does not point back to its parent {parent:?}")]
    BrokenParent { parent: NodeId, child: NodeId },

    #[error("key of {0:?} is out of order")]
    Order(NodeId),

    #[error("reached {reached} nodes, but the tree holds {expected}")]
    Count { reached: usize, expected: usize },
}

impl<K: Comparable, V> RbTree<K, V> {
    /// Walks the whole tree and checks every red-black property, parent
    /// links, key order, and the live-node count.
    ///
    /// Returns the black-height of the root (0 for an empty tree), not
    /// counting the sentinel.
    pub fn check_invariants(&self) -> Result<usize, InvariantError> {
        self.validate()
            .inspect_err(|err| error!("red-black tree check failed: {err}"))
    }

    fn validate(&self) -> Result<usize, InvariantError> {
        if self.color(NodeId::NIL) != Color::Black {
            return Err(InvariantError::RedSentinel);
        }
        if self.root.is_nil() {
            return self.check_count(0).map(|()| 0);
        }
        if self.color(self.root) == Color::Red {
            return Err(InvariantError::RedRoot(self.root));
        }
        if !self.parent(self.root).is_nil() {
            return Err(InvariantError::BrokenParent {
                parent: NodeId::NIL,
                child: self.root,
            });
        }

        let mut reached = 0;
        let height = self.black_height(self.root, None, None, &mut reached)?;
        self.check_count(reached)?;
        Ok(height)
    }

    fn check_count(&self, reached: usize) -> Result<(), InvariantError> {
        if reached != self.len || self.len != self.nodes.len() {
            return Err(InvariantError::Count {
                reached,
                expected: self.len,
            });
        }
        Ok(())
    }

    fn black_height(
        &self,
        x: NodeId,
        lo: Option<&K>,
        hi: Option<&K>,
        reached: &mut usize,
    ) -> Result<usize, InvariantError> {
        if x.is_nil() {
            return Ok(0);
        }
        *reached += 1;

        let node = self.node(x);
        if lo.is_some_and(|lo| !lo.less(&node.key)) || hi.is_some_and(|hi| !node.key.less(hi)) {
            return Err(InvariantError::Order(x));
        }

        let red = node.links.color == Color::Red;
        for dir in [LEFT, RIGHT] {
            let c = node.links.ch[dir];
            if c.is_nil() {
                continue;
            }
            if self.parent(c) != x {
                return Err(InvariantError::BrokenParent {
                    parent: x,
                    child: c,
                });
            }
            if red && self.color(c) == Color::Red {
                return Err(InvariantError::RedRed(x));
            }
        }
        let left = self.black_height(node.links.ch[LEFT], lo, Some(&node.key), reached)?;
        let right = self.black_height(node.links.ch[RIGHT], Some(&node.key), hi, reached)?;
        if left != right {
            return Err(InvariantError::BlackHeight {
                node: x,
                left,
                right,
            });
        }
        Ok(left + usize::from(!red))
    }
}

impl<K: Debug, V> RbTree<K, V> {
    /// Logs every node in pre-order at debug level.
    pub fn dump(&self) {
        let lines = self.dump_lines();
        if lines.is_empty() {
            debug!("empty tree");
        }
        for line in lines {
            debug!("{line}");
        }
    }

    fn dump_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.len);
        let mut stack = Vec::new();
        if !self.root.is_nil() {
            stack.push(self.root);
        }
        while let Some(x) = stack.pop() {
            let node = self.node(x);
            lines.push(format!(
                "key: {:?}, color: {:?}, left: {:?}, right: {:?}",
                node.key,
                node.links.color,
                self.child_key(x, LEFT),
                self.child_key(x, RIGHT),
            ));
            for dir in [RIGHT, LEFT] {
                let c = node.links.ch[dir];
                if !c.is_nil() {
                    stack.push(c);
                }
            }
        }
        lines
    }

    fn child_key(&self, x: NodeId, dir: usize) -> Option<&K> {
        let c = self.child(x, dir);
        (!c.is_nil()).then(|| &self.node(c).key)
    }
}
