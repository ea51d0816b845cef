use std::mem;
use std::ops::{Index, IndexMut};

use crate::AllocError;
use crate::node::{Link, Node, NodeId};

/// Slab-style node storage: a slot vector with the free list threaded
/// through the vacant slots, so releasing a node never allocates.
pub(crate) struct Arena<K, V> {
    slots: Vec<Slot<K, V>>,
    /// Head of the vacant-slot chain.
    free: Link,
    /// Number of occupied slots.
    len: usize,
}

enum Slot<K, V> {
    Occupied(Node<K, V>),
    Vacant(Link),
}

impl<K, V> Arena<K, V> {
    pub(crate) const fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free: None,
            len: 0,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Reserves room for `additional` more nodes beyond the free list.
    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), AllocError> {
        self.slots.try_reserve_exact(additional)?;
        Ok(())
    }

    /// Stores a node, reusing a vacant slot when one is available.
    pub(crate) fn alloc(&mut self, node: Node<K, V>) -> Result<NodeId, AllocError> {
        let id = match self.free {
            Some(id) => {
                let next = match &self.slots[id.0] {
                    Slot::Vacant(next) => *next,
                    Slot::Occupied(_) => unreachable!("free list points at a live node"),
                };
                self.slots[id.0] = Slot::Occupied(node);
                self.free = next;
                id
            }
            None => {
                self.slots.try_reserve(1)?;
                let id = NodeId(self.slots.len());
                self.slots.push(Slot::Occupied(node));
                id
            }
        };
        self.len += 1;
        Ok(id)
    }

    /// Retires a slot and hands its node back. Never allocates.
    pub(crate) fn free(&mut self, id: NodeId) -> Node<K, V> {
        let slot = mem::replace(&mut self.slots[id.0], Slot::Vacant(self.free));
        match slot {
            Slot::Occupied(node) => {
                self.free = Some(id);
                self.len -= 1;
                node
            }
            Slot::Vacant(_) => unreachable!("freeing a vacant slot"),
        }
    }

    /// Drops every live node. Capacity is kept for reuse.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free = None;
        self.len = 0;
    }

    /// Swaps the key-value payloads of two distinct live nodes, leaving both
    /// nodes' structural fields untouched.
    pub(crate) fn swap_payload(&mut self, a: NodeId, b: NodeId) {
        debug_assert_ne!(a, b);
        let (low, high) = if a.0 < b.0 { (a.0, b.0) } else { (b.0, a.0) };
        let (head, tail) = self.slots.split_at_mut(high);
        match (&mut head[low], &mut tail[0]) {
            (Slot::Occupied(x), Slot::Occupied(y)) => {
                mem::swap(&mut x.key, &mut y.key);
                mem::swap(&mut x.value, &mut y.value);
            }
            _ => unreachable!("swapping payloads of vacant slots"),
        }
    }
}

impl<K, V> Index<NodeId> for Arena<K, V> {
    type Output = Node<K, V>;

    #[inline(always)]
    fn index(&self, id: NodeId) -> &Node<K, V> {
        match &self.slots[id.0] {
            Slot::Occupied(node) => node,
            Slot::Vacant(_) => unreachable!("dangling node id"),
        }
    }
}

impl<K, V> IndexMut<NodeId> for Arena<K, V> {
    #[inline(always)]
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        match &mut self.slots[id.0] {
            Slot::Occupied(node) => node,
            Slot::Vacant(_) => unreachable!("dangling node id"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Direction;
    use pretty_assertions::assert_eq;

    #[test]
    fn alloc_reuses_freed_slots() {
        let mut arena = Arena::new();
        let a = arena.alloc(Node::new(1, (), None, Direction::Left)).unwrap();
        let b = arena.alloc(Node::new(2, (), None, Direction::Left)).unwrap();
        assert_eq!(2, arena.len());

        let node = arena.free(a);
        assert_eq!(1, node.key);
        assert_eq!(1, arena.len());

        let c = arena.alloc(Node::new(3, (), None, Direction::Left)).unwrap();
        assert_eq!(a, c);
        assert_eq!(3, arena[c].key);
        assert_eq!(2, arena[b].key);
    }

    #[test]
    fn swap_payload_leaves_structure_alone() {
        let mut arena = Arena::new();
        let a = arena
            .alloc(Node::new(1, "one", None, Direction::Left))
            .unwrap();
        let b = arena
            .alloc(Node::new(2, "two", Some(a), Direction::Right))
            .unwrap();

        arena.swap_payload(a, b);
        assert_eq!((2, "two"), (arena[a].key, arena[a].value));
        assert_eq!((1, "one"), (arena[b].key, arena[b].value));
        assert_eq!(Some(a), arena[b].parent);
        assert_eq!(Direction::Right, arena[b].direction);
    }

    #[test]
    fn clear_empties_the_free_list() {
        let mut arena = Arena::new();
        let a = arena.alloc(Node::new(1, (), None, Direction::Left)).unwrap();
        arena.free(a);
        arena.clear();
        assert_eq!(0, arena.len());

        let b = arena.alloc(Node::new(2, (), None, Direction::Left)).unwrap();
        assert_eq!(NodeId(0), b);
    }
}
