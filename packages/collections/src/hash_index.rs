//! Open-addressing hash map keyed by strings.
//!
//! Collisions are resolved with linear probing. The slot count is always a
//! prime, chosen up front from the expected element count and the target
//! load factor, and grown to the next prime past twice the current size
//! whenever an insert would push the table above that load factor. Entries
//! are never removed, so probing stops at the first empty slot.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::CollectionError;

/// Load factor used by [`HashIndex::with_expected_count`].
pub const DEFAULT_LOAD_FACTOR: f64 = 0.5;

#[derive(Debug, Clone)]
struct Entry<V> {
    key: String,
    value: V,
}

/// String-keyed map with linear probing.
#[derive(Debug, Clone)]
pub struct HashIndex<V> {
    slots: Vec<Option<Entry<V>>>,
    len: usize,
    load_factor: f64,
}

impl<V> HashIndex<V> {
    /// Creates an index able to hold `expected_count` entries without
    /// growing while staying at or below `load_factor`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::InvalidLoadFactor`] if `load_factor` is not
    /// a finite value in `(0, 1)`.
    pub fn new(expected_count: usize, load_factor: f64) -> Result<Self, CollectionError> {
        if !load_factor.is_finite() || load_factor <= 0.0 || load_factor >= 1.0 {
            return Err(CollectionError::InvalidLoadFactor(load_factor));
        }

        let capacity = next_prime(slots_for(expected_count, load_factor));

        Ok(Self {
            slots: empty_slots(capacity),
            len: 0,
            load_factor,
        })
    }

    /// Creates an index for `expected_count` entries at
    /// [`DEFAULT_LOAD_FACTOR`].
    #[must_use]
    pub fn with_expected_count(expected_count: usize) -> Self {
        let capacity = next_prime(slots_for(expected_count, DEFAULT_LOAD_FACTOR));

        Self {
            slots: empty_slots(capacity),
            len: 0,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub const fn load_factor(&self) -> f64 {
        self.load_factor
    }

    /// Returns the value stored under `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        let index = self.find(key)?;
        self.slots[index].as_ref().map(|entry| &entry.value)
    }

    /// Returns a mutable reference to the value stored under `key`, if any.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let index = self.find(key)?;
        self.slots[index].as_mut().map(|entry| &mut entry.value)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Stores `value` under `key`, returning the value it replaced.
    pub fn put(&mut self, key: &str, value: V) -> Option<V> {
        let (index, occupied) = self.slot_for_insert(key);

        if occupied {
            return self.slots[index]
                .as_mut()
                .map(|entry| std::mem::replace(&mut entry.value, value));
        }

        self.slots[index] = Some(Entry {
            key: key.to_owned(),
            value,
        });
        self.len += 1;
        None
    }

    /// Returns the value under `key`, inserting `default()` first if the key
    /// is absent.
    pub fn get_or_insert_with(&mut self, key: &str, default: impl FnOnce() -> V) -> &mut V {
        let (index, occupied) = self.slot_for_insert(key);
        if !occupied {
            self.len += 1;
        }

        &mut self.slots[index]
            .get_or_insert_with(|| Entry {
                key: key.to_owned(),
                value: default(),
            })
            .value
    }

    /// Iterates over `(key, value)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.slots
            .iter()
            .flatten()
            .map(|entry| (entry.key.as_str(), &entry.value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }

    fn home_slot(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        #[allow(clippy::cast_possible_truncation)]
        let slot = (hasher.finish() % self.slots.len() as u64) as usize;
        slot
    }

    /// Position of the slot holding `key`.
    fn find(&self, key: &str) -> Option<usize> {
        let capacity = self.slots.len();
        let mut index = self.home_slot(key);

        for _ in 0..capacity {
            match &self.slots[index] {
                None => return None,
                Some(entry) if entry.key == key => return Some(index),
                Some(_) => index = (index + 1) % capacity,
            }
        }

        None
    }

    /// Position of the first empty slot reached by stepping from `key`'s home slot.
    ///
    /// The table always keeps at least one empty slot, so this terminates.
    fn vacant_slot(&self, key: &str) -> usize {
        let capacity = self.slots.len();
        let mut index = self.home_slot(key);
        while self.slots[index].is_some() {
            index = (index + 1) % capacity;
        }
        index
    }

    /// Slot where `key` lives or should be written, and whether it is
    /// already occupied by that key. Grows the table first when a new key
    /// would exceed the load factor.
    fn slot_for_insert(&mut self, key: &str) -> (usize, bool) {
        if let Some(index) = self.find(key) {
            return (index, true);
        }

        if exceeds_load_factor(self.len + 1, self.slots.len(), self.load_factor) {
            self.grow();
        }

        (self.vacant_slot(key), false)
    }

    fn grow(&mut self) {
        let new_capacity = next_prime(self.slots.len() * 2);
        log::trace!(
            "Growing hash index from {} to {new_capacity} slots ({} keys)",
            self.slots.len(),
            self.len
        );

        let old = std::mem::replace(&mut self.slots, empty_slots(new_capacity));
        for entry in old.into_iter().flatten() {
            let index = self.vacant_slot(&entry.key);
            self.slots[index] = Some(entry);
        }
    }
}

fn empty_slots<V>(capacity: usize) -> Vec<Option<Entry<V>>> {
    std::iter::repeat_with(|| None).take(capacity).collect()
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn slots_for(expected_count: usize, load_factor: f64) -> usize {
    ((expected_count as f64 / load_factor).ceil() as usize).max(2)
}

#[allow(clippy::cast_precision_loss)]
fn exceeds_load_factor(len: usize, capacity: usize, load_factor: f64) -> bool {
    len as f64 > capacity as f64 * load_factor || len >= capacity
}

/// Smallest prime greater than or equal to `n` (at least 2).
#[must_use]
pub fn next_prime(n: usize) -> usize {
    let mut candidate = n.max(2);
    while !is_prime(candidate) {
        candidate += 1;
    }
    candidate
}

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }
    let mut divisor = 3;
    while divisor * divisor <= n {
        if n % divisor == 0 {
            return false;
        }
        divisor += 2;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_load_factor() {
        assert!(matches!(
            HashIndex::<u32>::new(10, 0.0),
            Err(CollectionError::InvalidLoadFactor(_))
        ));
        assert!(HashIndex::<u32>::new(10, 1.0).is_err());
        assert!(HashIndex::<u32>::new(10, f64::NAN).is_err());
        assert!(HashIndex::<u32>::new(10, 0.5).is_ok());
    }

    #[test]
    fn preallocates_prime_capacity() {
        let index = HashIndex::<u32>::new(100, 0.5).unwrap();
        assert!(index.capacity() >= 200);
        assert_eq!(index.capacity(), 211);
        assert!(index.is_empty());
    }

    #[test]
    fn default_load_factor_constructor() {
        let index = HashIndex::<u32>::with_expected_count(10);
        assert!((index.load_factor() - DEFAULT_LOAD_FACTOR).abs() < f64::EPSILON);
        assert_eq!(index.capacity(), 23);
    }

    #[test]
    fn put_and_get() {
        let mut index = HashIndex::new(4, 0.5).unwrap();
        assert_eq!(index.put("2016-01-01", 1), None);
        assert_eq!(index.put("2016-01-02", 2), None);

        assert_eq!(index.get("2016-01-01"), Some(&1));
        assert_eq!(index.get("2016-01-02"), Some(&2));
        assert_eq!(index.get("2016-01-03"), None);
        assert_eq!(index.size(), 2);
    }

    #[test]
    fn put_replaces_existing() {
        let mut index = HashIndex::new(4, 0.5).unwrap();
        index.put("k", 1);
        assert_eq!(index.put("k", 2), Some(1));
        assert_eq!(index.get("k"), Some(&2));
        assert_eq!(index.size(), 1);
    }

    #[test]
    fn grows_past_expected_count() {
        let mut index = HashIndex::new(2, 0.5).unwrap();
        let initial = index.capacity();

        for i in 0..500 {
            index.put(&format!("key-{i}"), i);
        }

        assert!(index.capacity() > initial);
        assert_eq!(index.size(), 500);
        for i in 0..500 {
            assert_eq!(index.get(&format!("key-{i}")), Some(&i));
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = index.size() as f64 / index.capacity() as f64;
        assert!(ratio <= 0.5);
    }

    #[test]
    fn get_or_insert_with_groups_values() {
        let mut index: HashIndex<Vec<usize>> = HashIndex::new(3, 0.75).unwrap();
        let keys = ["a", "b", "a", "c", "a", "b"];
        for (i, key) in keys.iter().enumerate() {
            index.get_or_insert_with(key, Vec::new).push(i);
        }

        assert_eq!(index.size(), 3);
        assert_eq!(index.get("a"), Some(&vec![0, 2, 4]));
        assert_eq!(index.get("b"), Some(&vec![1, 5]));
        assert_eq!(index.get("c"), Some(&vec![3]));
        let total: usize = index.values().map(Vec::len).sum();
        assert_eq!(total, keys.len());
    }

    #[test]
    fn colliding_keys_share_the_table() {
        // A tiny table forces collisions.
        let mut index = HashIndex::new(1, 0.9).unwrap();
        for key in ["x", "y", "z", "w"] {
            index.put(key, key.to_uppercase());
        }
        for key in ["x", "y", "z", "w"] {
            assert_eq!(index.get(key), Some(&key.to_uppercase()));
        }
        assert!(!index.contains_key("v"));
    }

    #[test]
    fn next_prime_values() {
        assert_eq!(next_prime(0), 2);
        assert_eq!(next_prime(2), 2);
        assert_eq!(next_prime(8), 11);
        assert_eq!(next_prime(200), 211);
    }
}
