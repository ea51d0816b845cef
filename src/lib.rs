//! An ordered map backed by a 2-3 red-black tree: a red-black tree in which
//! every black node has at most one red child, i.e. a B-tree made of 2-nodes
//! and 3-nodes only. The restriction rules out 4-node configurations and
//! trades the classical fix-up cases for a smaller set driven entirely by a
//! cached which-child-am-I flag, so rebalancing never re-compares keys.
//!
//! Nodes live in an index-addressed arena rather than behind raw pointers;
//! parent and child links are plain `Option<NodeId>` fields, which keeps
//! rotation and bottom-up traversal O(1) without any unsafe code.
//!
//! ```
//! let mut map = deuxtrois::Map::new();
//! map.insert(2, "two")?;
//! map.insert(1, "one")?;
//! assert_eq!(map.get(&2), Some(&"two"));
//! assert_eq!(map.len(), 2);
//! # Ok::<(), deuxtrois::AllocError>(())
//! ```

mod arena;
mod map;
mod node;
mod root;
mod set;

use std::collections::TryReserveError;
use std::fmt;

pub use map::Map;
pub use set::Set;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Color {
    Red = 0,
    Black = 1,
}

/// Which child of its parent a node is. The root's flag is meaningless and
/// never read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Left = 0,
    Right = 1,
}

impl Direction {
    #[inline(always)]
    pub(crate) fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// The node arena could not grow.
///
/// Returned by the operations that create nodes ([`Map::insert`],
/// [`Map::try_clone`]); the map is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocError(TryReserveError);

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node allocation failed")
    }
}

impl std::error::Error for AllocError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<TryReserveError> for AllocError {
    fn from(err: TryReserveError) -> AllocError {
        AllocError(err)
    }
}
