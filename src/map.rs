use std::borrow::Borrow;

use crate::AllocError;
use crate::root::Root;

/// An ordered map keyed by `K: Ord`, backed by a 2-3 red-black tree.
///
/// Mutating operations rebalance bottom-up off each node's cached direction
/// flag; only the top-down search compares keys. `insert` and [`try_clone`]
/// are the only operations that allocate, and both leave the map untouched
/// when the arena cannot grow.
///
/// Not synchronized: share a `Map` between threads behind external locking
/// or not at all.
///
/// [`try_clone`]: Map::try_clone
pub struct Map<K, V> {
    root: Root<K, V>,
    len: usize,
}

impl<K, V> Map<K, V> {
    /// Creates an empty map. Does not allocate.
    pub const fn new() -> Self {
        Map {
            root: Root::new(),
            len: 0,
        }
    }

    /// Number of key-value pairs in the map.
    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Looks a key up and returns a reference to its value.
    ///
    /// ```
    /// let mut map = deuxtrois::Map::new();
    /// map.insert(1, "one")?;
    /// assert_eq!(map.get(&1), Some(&"one"));
    /// assert_eq!(map.get(&2), None);
    /// # Ok::<(), deuxtrois::AllocError>(())
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_key_value(key).map(|(_, v)| v)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.root.find(key)?;
        let node = &self.root[node];
        Some((&node.key, &node.value))
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.root.find(key)?;
        Some(&mut self.root[node].value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.root.find(key).is_some()
    }

    /// Associates `key` with `value`, returning the previous value if the
    /// key was already present (in which case the tree shape is untouched).
    ///
    /// On `Err` the map is exactly as it was; nothing is partially inserted.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, AllocError>
    where
        K: Ord,
    {
        let old = self.root.insert(key, value)?;
        if old.is_none() {
            self.len += 1;
        }
        Ok(old)
    }

    /// Removes a key, returning its value. Absent keys leave the map
    /// untouched. Never allocates.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (_, value) = self.root.remove(key)?;
        self.len -= 1;
        Some(value)
    }

    /// Drops every entry, keeping allocated capacity for reuse.
    pub fn clear(&mut self) {
        self.root.clear();
        self.len = 0;
    }

    /// Deep-copies the map into an independent one. A failed allocation
    /// reports `Err` and leaks nothing; the source is never affected.
    pub fn try_clone(&self) -> Result<Self, AllocError>
    where
        K: Clone,
        V: Clone,
    {
        Ok(Map {
            root: self.root.try_clone()?,
            len: self.len,
        })
    }

    /// Walks the whole tree and panics if any 2-3 red-black invariant is
    /// violated or the stored count is wrong. A test oracle; violations are
    /// bugs in this crate, not runtime conditions.
    #[cfg(any(test, feature = "check"))]
    pub fn check(&self) {
        self.root.check(self.len);
    }
}

impl<K, V> Default for Map<K, V> {
    fn default() -> Self {
        Map::new()
    }
}
