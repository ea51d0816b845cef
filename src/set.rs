use std::borrow::Borrow;

use crate::{AllocError, Map};

/// An ordered set of `T: Ord`; a [`Map`] with unit values.
pub struct Set<T> {
    map: Map<T, ()>,
}

impl<T> Set<T> {
    /// Creates an empty set. Does not allocate.
    pub const fn new() -> Self {
        Set { map: Map::new() }
    }

    /// Adds a value; `Ok(true)` when it was not already present.
    pub fn insert(&mut self, value: T) -> Result<bool, AllocError>
    where
        T: Ord,
    {
        Ok(self.map.insert(value, ())?.is_none())
    }

    /// Removes a value; `true` when it was present. Never allocates.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.map.remove(value).is_some()
    }

    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.map.contains_key(value)
    }

    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.map.get_key_value(value).map(|(k, _)| k)
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn try_clone(&self) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        Ok(Set {
            map: self.map.try_clone()?,
        })
    }

    pub const fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub const fn len(&self) -> usize {
        self.map.len()
    }
}

impl<T> Default for Set<T> {
    fn default() -> Self {
        Set::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_remove_contains() {
        let mut set = Set::new();
        assert_eq!(true, set.is_empty());

        assert_eq!(Ok(true), set.insert(42));
        assert_eq!(Ok(false), set.insert(42));
        assert_eq!(Ok(true), set.insert(7));
        assert_eq!(2, set.len());

        assert_eq!(true, set.contains(&42));
        assert_eq!(Some(&7), set.get(&7));
        assert_eq!(false, set.contains(&0));

        assert_eq!(true, set.remove(&42));
        assert_eq!(false, set.remove(&42));
        assert_eq!(1, set.len());
    }

    #[test]
    fn clone_then_diverge() {
        let mut set = Set::new();
        for value in 0..10 {
            set.insert(value).unwrap();
        }

        let mut copy = set.try_clone().unwrap();
        copy.remove(&3);
        assert_eq!(true, set.contains(&3));
        assert_eq!(false, copy.contains(&3));

        set.clear();
        assert_eq!(true, set.is_empty());
        assert_eq!(9, copy.len());
    }

    #[test]
    fn borrowed_lookup() {
        let mut set = Set::new();
        set.insert("hello".to_string()).unwrap();
        assert_eq!(true, set.contains("hello"));
        assert_eq!(true, set.remove("hello"));
        assert_eq!(false, set.contains("hello"));
    }
}
