//! Specialized collection types

pub use slotmap::{new_key_type, Key, SlotMap};

/// Slot map that also remembers insertion order
///
/// Keys stay valid across removals of other entries, and iteration follows the
/// order entries were inserted in.
pub struct OrderedSlotMap<K: Key, V> {
    entries: SlotMap<K, V>,
    order: Vec<K>,
}

impl<K: Key, V> OrderedSlotMap<K, V> {
    /// Create an empty map
    pub fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
            order: Vec::new(),
        }
    }

    /// Insert a value built from its own key
    pub fn insert_with_key(&mut self, build: impl FnOnce(K) -> V) -> K {
        let key = self.entries.insert_with_key(build);
        self.order.push(key);
        key
    }

    /// Remove an entry
    pub fn remove(&mut self, key: K) -> Option<V> {
        let value = self.entries.remove(key)?;
        self.order.retain(|k| *k != key);
        Some(value)
    }

    /// Get an entry
    pub fn get(&self, key: K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Get a mutable entry
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        self.entries.get_mut(key)
    }

    /// Whether the key is live
    pub fn contains_key(&self, key: K) -> bool {
        self.entries.contains_key(key)
    }

    /// Most recently inserted live key
    pub fn last_key(&self) -> Option<K> {
        self.order.last().copied()
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.order.iter().copied()
    }

    /// Remove every entry, oldest first
    pub fn drain(&mut self) -> Vec<V> {
        let order = std::mem::take(&mut self.order);
        order.into_iter().filter_map(|key| self.entries.remove(key)).collect()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Key, V> Default for OrderedSlotMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
