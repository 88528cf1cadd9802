mod check;
mod iter;
mod node;
mod tree;

pub use check::InvariantError;
pub use comparable::Comparable;
pub use iter::{Iter, Keys, Values};
pub use node::{Color, NodeId};
pub use tree::RbTree;
