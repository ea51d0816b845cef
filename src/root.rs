use std::borrow::Borrow;
use std::cmp::Ordering::*;
use std::ops::{Index, IndexMut};

use crate::arena::Arena;
use crate::node::{Link, Node, NodeId};
use crate::{AllocError, Color, Direction};

/// The tree engine: the arena of nodes plus the root link.
///
/// Every fix-up decision below is made against the cached `direction` flag,
/// never by comparing keys; the comparator is consulted only during the
/// top-down search phase of `find`, `insert` and `remove`.
pub(crate) struct Root<K, V> {
    arena: Arena<K, V>,
    pub(crate) root: Link,
}

impl<K, V> Root<K, V> {
    pub(crate) const fn new() -> Self {
        Root {
            arena: Arena::new(),
            root: None,
        }
    }

    /// An absent child counts as black.
    #[inline(always)]
    fn is_red(&self, link: Link) -> bool {
        link.is_some_and(|id| self[id].color == Color::Red)
    }

    #[inline(always)]
    fn is_black(&self, link: Link) -> bool {
        !self.is_red(link)
    }

    /// Leftmost (`Left`) or rightmost (`Right`) descendant of `node`.
    fn xmost_node(&self, mut node: NodeId, direction: Direction) -> NodeId {
        while let Some(next) = self[node].child(direction) {
            node = next;
        }
        node
    }

    /// Rotates the subtree rooted at `node` toward `direction` and returns
    /// the new subtree root. The returned node carries `node`'s old parent,
    /// direction and color; it is the caller's job to link it back into its
    /// parent's child slot (or install it as tree root) via [`Self::reattach`].
    ///
    /// ```text
    ///       C                         A
    ///     ┌─┴─┐          B          ┌─┴─┐
    ///     B   d        ┌─┴─┐        a   B
    ///   ┌─┴─┐    ◁     A   C    ▷     ┌─┴─┐
    ///   A   c        ┌─┴┐ ┌┴─┐        b   C
    /// ┌─┴─┐          a  b c  d          ┌─┴─┐
    /// a   b                             c   d
    /// ```
    fn rotate(&mut self, node: NodeId, direction: Direction) -> NodeId {
        let opposite = direction.opposite();
        let Some(pivot) = self[node].child(opposite) else {
            unreachable!("rotation needs a child opposite the direction")
        };

        let parent = self[node].parent;
        let node_direction = self[node].direction;
        let node_color = self[node].color;

        let inner = self[pivot].child(direction);
        let pivot_color = self[pivot].color;

        // The pivot's inner subtree switches sides.
        if let Some(inner) = inner {
            self[inner].parent = Some(node);
            self[inner].direction = opposite;
        }

        let down = &mut self[node];
        down.set_child(opposite, inner);
        down.parent = Some(pivot);
        down.direction = direction;
        down.color = pivot_color;

        let up = &mut self[pivot];
        up.set_child(direction, Some(node));
        up.parent = parent;
        up.direction = node_direction;
        up.color = node_color;

        pivot
    }

    /// Writes `node` into `node.parent`'s child slot for `node.direction`,
    /// or installs it as tree root. The counterpart of every [`Self::rotate`].
    fn reattach(&mut self, node: NodeId) {
        match self[node].parent {
            Some(parent) => {
                let direction = self[node].direction;
                self[parent].set_child(direction, Some(node));
            }
            None => self.root = Some(node),
        }
    }

    pub(crate) fn find<Q>(&self, key: &Q) -> Link
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cursor = self.root;
        while let Some(node) = cursor {
            match key.cmp(self[node].key.borrow()) {
                Less => cursor = self[node].child(Direction::Left),
                Greater => cursor = self[node].child(Direction::Right),
                Equal => break,
            }
        }
        cursor
    }

    /// Inserts or overwrites. `Ok(Some(old))` means the key was already
    /// present and only its value changed; nothing was allocated and the
    /// tree shape is untouched.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Result<Option<V>, AllocError>
    where
        K: Ord,
    {
        // Top-down pass: remember where the search fell off the tree.
        let mut parent = None;
        let mut direction = Direction::Left;
        let mut cursor = self.root;

        while let Some(node) = cursor {
            match key.cmp(&self[node].key) {
                Less => {
                    parent = Some(node);
                    direction = Direction::Left;
                    cursor = self[node].child(direction);
                }
                Greater => {
                    parent = Some(node);
                    direction = Direction::Right;
                    cursor = self[node].child(direction);
                }
                Equal => {
                    let old = std::mem::replace(&mut self[node].value, value);
                    return Ok(Some(old));
                }
            }
        }

        let node = self.arena.alloc(Node::new(key, value, parent, direction))?;
        match parent {
            Some(parent) => self[parent].set_child(direction, Some(node)),
            None => self.root = Some(node),
        }

        self.insert_fixup(node);
        Ok(None)
    }

    /// Bottom-up pass of insertion: walks up from the freshly inserted red
    /// `node` repairing red-red edges, choosing every rotation off the
    /// cached direction flags.
    fn insert_fixup(&mut self, mut node: NodeId) {
        while let Some(parent) = self[node].parent {
            debug_assert_eq!(Color::Red, self[node].color);

            if self[parent].color == Color::Red {
                if self[node].direction != self[parent].direction {
                    // Zig-zag: node sits on the opposite side of its parent
                    // than the parent does of the grandparent. Rotate the
                    // parent so the red-red edge straightens into a zig-zig.
                    //
                    //   A            A
                    // ┌─┴─┐        ┌─┴─┐
                    // a   C        a   B
                    //   ┌─┴─┐  ▷     ┌─┴─┐
                    //   B   d        b   C
                    // ┌─┴─┐            ┌─┴─┐
                    // b   c            c   d
                    node = parent;
                    let direction = self[node].direction;
                    let pivot = self.rotate(node, direction);
                    self.reattach(pivot);
                }

                // Zig-zig: rotate the grandparent away from the red chain.
                // The pivot (the old parent) inherits the grandparent's
                // color and parent slot.
                //
                //      C
                //    ┌─┴─┐            B
                //    B   d         ┌──┴──┐
                //  ┌─┴─┐     ▷     A     C
                //  A   c         ┌─┴─┐ ┌─┴─┐
                // ┌┴─┐           a   b c   d
                // a  b
                let Some(parent) = self[node].parent else {
                    unreachable!("a red node is never the root")
                };
                let Some(grandparent) = self[parent].parent else {
                    unreachable!("a red parent is never the root")
                };
                let pivot = self.rotate(grandparent, self[node].direction.opposite());
                self.reattach(pivot);
            }

            // Red sibling: both of the parent's children are red now. Pull
            // the redness up instead and keep walking; this is the only
            // case that propagates. A black sibling means the 3-node has
            // room and the walk is over.
            //
            //      B               B
            //   ┌──┴──┐         ┌──┴──┐
            //   A     C    ▷    A     C      (B turns red, walk continues)
            // ┌─┴─┐ ┌─┴─┐     ┌─┴─┐ ┌─┴─┐
            // a   b c   d     a   b c   d
            let Some(parent) = self[node].parent else { break };
            let sibling = self[parent].child(self[node].direction.opposite());
            if self.is_red(sibling) {
                self[node].color = Color::Black;
                let Some(sibling) = sibling else { unreachable!() };
                self[sibling].color = Color::Black;
                self[parent].color = Color::Red;
                node = parent;
            } else {
                break;
            }
        }

        if let Some(root) = self.root {
            self[root].color = Color::Black;
        }
    }

    /// Removes `key`'s node and returns its payload. Never allocates.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut target = self.find(key)?;

        if let (Some(left), Some(_)) = (
            self[target].child(Direction::Left),
            self[target].child(Direction::Right),
        ) {
            // Two children: trade payloads with the in-order predecessor and
            // remove that node instead; it has at most one child.
            let predecessor = self.xmost_node(left, Direction::Right);
            self.arena.swap_payload(target, predecessor);
            target = predecessor;
        }

        let parent = self[target].parent;
        let direction = self[target].direction;
        let color = self[target].color;
        let promoted = self[target]
            .child(Direction::Left)
            .or(self[target].child(Direction::Right));

        if let Some(child) = promoted {
            // A lone child is red with a black parent; promoting it into the
            // target's slot with the target's color keeps every path intact.
            self[child].parent = parent;
            self[child].direction = direction;
            self[child].color = color;
        }

        let node = self.arena.free(target);
        match parent {
            Some(parent) => self[parent].set_child(direction, promoted),
            None => self.root = promoted,
        }

        if promoted.is_none() && color == Color::Black {
            if let Some(parent) = parent {
                // Unlinking a black leaf leaves its slot one black short.
                self.remove_fixup(parent, direction);
            }
        }

        Some((node.key, node.value))
    }

    /// Bottom-up pass of removal: repairs the black-height deficiency at
    /// `parent`'s `direction` slot.
    fn remove_fixup(&mut self, mut parent: NodeId, mut direction: Direction) {
        let node = loop {
            // The deficient side is one black short, so the sibling subtree
            // holds at least one real node.
            let Some(mut sibling) = self[parent].child(direction.opposite()) else {
                unreachable!("deficient slot cannot face an empty sibling")
            };

            if self[sibling].color == Color::Red {
                // Red sibling: rotate it above the parent so the deficient
                // slot faces a black sibling, then re-fetch.
                //
                //      D                 B
                //  ┌───┴──┐          ┌───┴───┐
                //  B      E    ▷     A       D
                // ┌┴─┐  ┌─┴─┐      ┌─┴─┐  ┌──┴──┐
                // A  C  e   f      a   b  C     E
                let pivot = self.rotate(parent, direction);
                self.reattach(pivot);
                sibling = match self[parent].child(direction.opposite()) {
                    Some(sibling) => sibling,
                    None => unreachable!(),
                };
            }

            // Tentatively deepen the sibling's side to match the deficit.
            self[sibling].color = Color::Red;

            if self.is_red(self[sibling].child(Direction::Left))
                || self.is_red(self[sibling].child(Direction::Right))
            {
                if self.is_black(self[sibling].child(self[sibling].direction)) {
                    // The red child sits on the far side; rotate the sibling
                    // so it lines up for the parent rotation below.
                    //
                    //  A              A
                    // ┌┴──┐         ┌─┴─┐
                    // a   C         a   B
                    //   ┌─┴─┐   ▷     ┌─┴─┐
                    //   B   D         b   C
                    //  ┌┴┐ ┌┴┐          ┌─┴─┐
                    //  b c d e          c   D
                    //                      ┌┴┐
                    //                      d e
                    let near = self[sibling].direction;
                    sibling = self.rotate(sibling, near);
                    self.reattach(sibling);
                }

                // Promote the sibling into the parent's slot and blacken
                // both of its children; every path through the old
                // deficient slot regains its missing black node.
                //
                //    C
                //  ┌─┴─┐            B
                //  B   d         ┌──┴──┐
                // ┌┴─┐     ▷     A     C
                // A  c         ┌─┴─┐ ┌─┴─┐
                //              a   b c   d
                let pivot = self.rotate(parent, direction);
                self.reattach(pivot);
                for side in [Direction::Left, Direction::Right] {
                    let Some(child) = self[pivot].child(side) else {
                        unreachable!("promoted pivot has a child on each side")
                    };
                    self[child].color = Color::Black;
                }
                return;
            }

            // Both sibling children black: the whole parent subtree is now
            // uniformly one black short. A red parent absorbs the deficit by
            // turning black; otherwise move the deficiency one level up.
            let node = parent;
            match self[node].parent {
                Some(next) if self[node].color == Color::Black => {
                    direction = self[node].direction;
                    parent = next;
                }
                _ => break node,
            }
        };

        self[node].color = Color::Black;
    }

    /// Builds an independent copy of the whole tree in lock-step with a
    /// traversal of the source, into a fresh compact arena. Reserves the
    /// full node count before the first clone, so a failed reservation
    /// reports before anything is built and the partially built copy (had a
    /// later reservation failed) is torn down by `Drop`.
    pub(crate) fn try_clone(&self) -> Result<Self, AllocError>
    where
        K: Clone,
        V: Clone,
    {
        let mut copy = Root::new();
        let Some(mut source) = self.root else {
            return Ok(copy);
        };
        copy.arena.try_reserve(self.arena.len())?;

        let mut dest = copy.arena.alloc(Node {
            children: [None, None],
            parent: None,
            direction: self[source].direction,
            color: self[source].color,
            key: self[source].key.clone(),
            value: self[source].value.clone(),
        })?;
        copy.root = Some(dest);

        loop {
            let direction = if self[source].child(Direction::Left).is_some() {
                Direction::Left
            } else if self[source].child(Direction::Right).is_some() {
                Direction::Right
            } else {
                // Leaf: climb until a right subtree remains to be copied.
                loop {
                    if self[source].child(Direction::Right).is_some()
                        && copy[dest].child(Direction::Right).is_none()
                    {
                        break;
                    }
                    let Some(parent) = self[source].parent else {
                        return Ok(copy);
                    };
                    source = parent;
                    dest = match copy[dest].parent {
                        Some(parent) => parent,
                        None => unreachable!("copy climbs in lock-step"),
                    };
                }
                Direction::Right
            };

            let Some(child) = self[source].child(direction) else {
                unreachable!()
            };
            let node = copy.arena.alloc(Node {
                children: [None, None],
                parent: Some(dest),
                direction,
                color: self[child].color,
                key: self[child].key.clone(),
                value: self[child].value.clone(),
            })?;
            copy[dest].set_child(direction, Some(node));
            source = child;
            dest = node;
        }
    }

    /// Drops every node and forgets the root. Arena capacity is retained.
    pub(crate) fn clear(&mut self) {
        self.root = None;
        self.arena.clear();
    }
}

// Diagnostic invariant verification; a test oracle, not a hot-path citizen.
#[cfg(any(test, feature = "check"))]
impl<K, V> Root<K, V> {
    /// Panics unless the whole tree satisfies the 2-3 red-black invariants
    /// and holds exactly `expected_count` nodes.
    pub(crate) fn check(&self, expected_count: usize) {
        assert!(self.is_black(self.root), "the root must be black");
        if let Some(root) = self.root {
            assert!(self[root].parent.is_none(), "the root has no parent");
            self.check_link(Some(root));
        }
        assert_eq!(
            expected_count,
            self.count_nodes(),
            "stored count disagrees with the tree"
        );
        assert_eq!(expected_count, self.arena.len(), "arena leaks slots");
    }

    /// Returns the black depth of the subtree behind `link`.
    fn check_link(&self, link: Link) -> usize {
        let Some(node) = link else { return 1 };

        if let Some(parent) = self[node].parent {
            assert_eq!(
                Some(node),
                self[parent].child(self[node].direction),
                "direction flag out of sync with the parent's child slot"
            );
            assert!(
                self[node].color == Color::Black || self[parent].color == Color::Black,
                "red node with a red parent"
            );
        }

        assert!(
            self.is_black(self[node].child(Direction::Left))
                || self.is_black(self[node].child(Direction::Right)),
            "node with two red children"
        );

        let left = self.check_link(self[node].child(Direction::Left));
        let right = self.check_link(self[node].child(Direction::Right));
        assert_eq!(left, right, "black depth differs between subtrees");

        left + usize::from(self[node].color == Color::Black)
    }

    /// Counts nodes via a post-order walk, independently of the stored count.
    fn count_nodes(&self) -> usize {
        let mut count = 0;
        if let Some(root) = self.root {
            let mut node = self.xmost_leaf(root, Direction::Left);
            loop {
                count += 1;
                match self.post_order_xcessor(node, Direction::Right) {
                    Some(next) => node = next,
                    None => break,
                }
            }
        }
        count
    }

    /// Leftmost (`Left`) or rightmost (`Right`) leaf under `node`, preferring
    /// `direction` on the way down but taking either child over stopping.
    fn xmost_leaf(&self, mut node: NodeId, direction: Direction) -> NodeId {
        loop {
            if let Some(next) = self[node].child(direction) {
                node = next;
            } else if let Some(next) = self[node].child(direction.opposite()) {
                node = next;
            } else {
                return node;
            }
        }
    }

    /// Post-order predecessor (`Left`) or successor (`Right`) of `node`.
    fn post_order_xcessor(&self, node: NodeId, direction: Direction) -> Link {
        let parent = self[node].parent;
        if self[node].direction != direction {
            if let Some(parent) = parent {
                if let Some(sibling) = self[parent].child(direction) {
                    return Some(self.xmost_leaf(sibling, direction.opposite()));
                }
            }
        }
        parent
    }
}

impl<K, V> Index<NodeId> for Root<K, V> {
    type Output = Node<K, V>;

    #[inline(always)]
    fn index(&self, id: NodeId) -> &Node<K, V> {
        &self.arena[id]
    }
}

impl<K, V> IndexMut<NodeId> for Root<K, V> {
    #[inline(always)]
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        &mut self.arena[id]
    }
}
