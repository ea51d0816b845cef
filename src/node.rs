use std::fmt::Debug;

use crate::{Color, Direction};

/// Stable index of a node in its arena. Ids survive every rotation and every
/// unrelated removal; only freeing the node itself retires its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeId(pub(crate) usize);

/// A possibly-absent child or parent. `None` reads as a black leaf.
pub(crate) type Link = Option<NodeId>;

pub(crate) struct Node<K, V> {
    pub(crate) children: [Link; 2],
    pub(crate) parent: Link,
    pub(crate) direction: Direction,
    pub(crate) color: Color,
    pub(crate) key: K,
    pub(crate) value: V,
}

impl<K, V> Node<K, V> {
    /// A freshly inserted node: red, childless, hanging off `parent`.
    pub(crate) fn new(key: K, value: V, parent: Link, direction: Direction) -> Self {
        Node {
            children: [None, None],
            parent,
            direction,
            color: Color::Red,
            key,
            value,
        }
    }

    #[inline(always)]
    pub(crate) fn child(&self, direction: Direction) -> Link {
        self.children[direction as usize]
    }

    #[inline(always)]
    pub(crate) fn set_child(&mut self, direction: Direction, child: Link) {
        self.children[direction as usize] = child;
    }
}

impl<K, V> Debug for Node<K, V>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "{:?}::({:?},{:?})",
            self.color, self.key, self.value
        ))
    }
}
