use std::hash::Hash;

use crate::{
    InvalidCapacity,
    error::InvariantError,
    index::KeyIndex,
    list::{
        IntoIter,
        Iter,
        RecencyList,
    },
};

/// A fixed-capacity least-recently-used cache.
///
/// The cache pairs a key index (hash table mapping keys to arena slots)
/// with a recency list (doubly linked list of entries, most recently used
/// at the head). Every `get` or `put` consults the index first, then moves
/// the touched entry to the head of the list; a `put` of a new key into a
/// full cache evicts the list's tail entry and deletes its index mapping in
/// the same call. The two structures always hold exactly the same set of
/// keys.
///
/// # Type Parameters
///
/// * `Key` - Must implement [`Hash`] + [`Eq`]. Keys compare by value
///   equality; two distinct objects that compare equal are the same cache
///   key.
/// * `Value` - No constraints.
///
/// # Examples
///
/// ```
/// use recency::LruCache;
///
/// let mut cache = LruCache::new(2).unwrap();
/// cache.put(1, "one");
/// cache.put(2, "two");
///
/// cache.get(&1); // Mark as recently used
/// cache.put(3, "three"); // Evicts key 2
///
/// assert_eq!(cache.get(&2), None);
/// assert_eq!(
///     cache.into_iter().collect::<Vec<_>>(),
///     [(1, "one"), (3, "three")]
/// );
/// ```
#[derive(Clone)]
pub struct LruCache<Key, Value> {
    capacity: usize,
    index: KeyIndex,
    list: RecencyList<Key, Value>,
}

impl<Key: Hash + Eq, Value> LruCache<Key, Value> {
    /// Creates a new, empty cache holding at most `capacity` entries.
    ///
    /// Storage for `capacity` entries is allocated up front; the capacity
    /// is fixed for the life of the cache.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCapacity`] when `capacity` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use recency::LruCache;
    ///
    /// let cache = LruCache::<i32, String>::new(100).unwrap();
    /// assert_eq!(cache.capacity(), 100);
    /// assert!(cache.is_empty());
    ///
    /// assert!(LruCache::<i32, String>::new(0).is_err());
    /// ```
    pub fn new(capacity: usize) -> Result<Self, InvalidCapacity> {
        if capacity == 0 {
            return Err(InvalidCapacity);
        }
        Ok(LruCache {
            capacity,
            index: KeyIndex::with_capacity(capacity),
            // One spare slot: put inserts the new entry before evicting the
            // old one, so the arena briefly holds capacity + 1 nodes.
            list: RecencyList::with_capacity(capacity.saturating_add(1)),
        })
    }

    /// Gets a value from the cache, refreshing its recency.
    ///
    /// A hit always counts as an access and moves the entry to the
    /// most-recently-used position, even though the value is unchanged. A
    /// miss returns `None` and leaves the cache untouched; misses are an
    /// expected outcome, not an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use recency::LruCache;
    ///
    /// let mut cache = LruCache::new(2).unwrap();
    /// cache.put(1, "one");
    /// cache.put(2, "two");
    ///
    /// assert_eq!(cache.get(&1), Some(&"one"));
    /// assert_eq!(cache.get(&3), None);
    ///
    /// // Key 1 was refreshed, so key 2 is now the eviction candidate.
    /// assert_eq!(cache.tail(), Some((&2, &"two")));
    /// ```
    pub fn get(&mut self, key: &Key) -> Option<&Value> {
        self.get_mut(key).map(|value| &*value)
    }

    /// Gets a mutable reference to a value, refreshing its recency.
    ///
    /// Behaves exactly like [`get()`](Self::get) apart from the mutable
    /// borrow.
    pub fn get_mut(&mut self, key: &Key) -> Option<&mut Value> {
        let handle = self.index.lookup(key, &self.list)?;
        self.list.move_to_front(handle);
        Some(&mut self.list.node_mut(handle).value)
    }

    /// Inserts a key-value pair, evicting the least-recently-used entry if
    /// the cache was full.
    ///
    /// If the key is already present its value is updated in place and its
    /// recency refreshed; the size does not change and nothing is evicted.
    /// If the key is new, the entry is inserted at the most-recently-used
    /// position and, when that pushes the cache over capacity, the entry at
    /// the least-recently-used end is evicted before `put` returns.
    ///
    /// `put` never fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use recency::LruCache;
    ///
    /// let mut cache = LruCache::new(2).unwrap();
    /// cache.put(1, "a");
    /// cache.put(1, "b"); // Update, not an insert
    /// assert_eq!(cache.len(), 1);
    /// assert_eq!(cache.get(&1), Some(&"b"));
    ///
    /// cache.put(2, "c");
    /// cache.put(3, "d"); // Evicts key 1
    /// assert_eq!(cache.get(&1), None);
    /// ```
    pub fn put(&mut self, key: Key, value: Value) {
        let hash = self.index.hash(&key);
        if let Some(handle) = self.index.find(hash, &key, &self.list) {
            self.list.node_mut(handle).value = value;
            self.list.move_to_front(handle);
            return;
        }

        let handle = self.list.push_front(key, value, hash);
        self.index.insert(hash, handle, &self.list);

        if self.list.len() > self.capacity {
            // The new entry sits at the head, so the tail is always an
            // older entry here.
            if let Some(victim) = self.list.back() {
                self.index.remove(self.list.node(victim).hash, victim);
                self.list.pop_back();
            }
        }
    }

    /// Returns a reference to the value without refreshing its recency.
    ///
    /// # Examples
    ///
    /// ```
    /// use recency::LruCache;
    ///
    /// let mut cache = LruCache::new(2).unwrap();
    /// cache.put(1, "one");
    /// cache.put(2, "two");
    ///
    /// // Peek doesn't affect eviction order
    /// assert_eq!(cache.peek(&1), Some(&"one"));
    /// assert_eq!(cache.tail(), Some((&1, &"one")));
    /// ```
    pub fn peek(&self, key: &Key) -> Option<&Value> {
        let handle = self.index.lookup(key, &self.list)?;
        Some(&self.list.node(handle).value)
    }

    /// Returns true if the cache contains the given key, without refreshing
    /// its recency.
    pub fn contains_key(&self, key: &Key) -> bool {
        self.index.lookup(key, &self.list).is_some()
    }

    /// Returns the entry that would be evicted next, the least recently
    /// used one, or `None` when the cache is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use recency::LruCache;
    ///
    /// let mut cache = LruCache::new(3).unwrap();
    /// assert_eq!(cache.tail(), None);
    ///
    /// cache.put(1, "one");
    /// cache.put(2, "two");
    /// assert_eq!(cache.tail(), Some((&1, &"one")));
    ///
    /// cache.get(&1);
    /// assert_eq!(cache.tail(), Some((&2, &"two")));
    /// ```
    pub fn tail(&self) -> Option<(&Key, &Value)> {
        let node = self.list.node(self.list.back()?);
        Some((&node.key, &node.value))
    }

    /// Returns the number of entries currently held.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Returns the maximum number of entries the cache can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Removes all entries. The capacity is unchanged.
    pub fn clear(&mut self) {
        self.index.clear();
        self.list.clear();
    }

    /// Returns an iterator over the entries in eviction order, least
    /// recently used first. The first item equals what [`tail()`](Self::tail)
    /// returns.
    ///
    /// # Examples
    ///
    /// ```
    /// use recency::LruCache;
    ///
    /// let mut cache = LruCache::new(3).unwrap();
    /// cache.put(1, "one");
    /// cache.put(2, "two");
    /// cache.put(3, "three");
    /// cache.get(&1);
    ///
    /// let keys: Vec<_> = cache.iter().map(|(k, _)| *k).collect();
    /// assert_eq!(keys, [2, 3, 1]);
    /// ```
    pub fn iter(&self) -> Iter<'_, Key, Value> {
        self.list.iter()
    }

    /// Validates that the key index and recency list are in lockstep.
    ///
    /// This walks both structures and is O(n); it exists for tests and
    /// debugging, not for the operation paths.
    ///
    /// # Errors
    ///
    /// Returns an [`InvariantError`] describing the first violated
    /// invariant.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.list.len() != self.index.len() {
            return Err(InvariantError::new(format!(
                "list holds {} entries but index holds {}",
                self.list.len(),
                self.index.len()
            )));
        }
        if self.list.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "{} entries exceed capacity {}",
                self.list.len(),
                self.capacity
            )));
        }

        let mut walked = 0usize;
        let mut newest = None;
        let mut cursor = self.list.back();
        while let Some(handle) = cursor {
            if walked >= self.list.len() {
                return Err(InvariantError::new("recency list contains a cycle"));
            }

            let node = self.list.node(handle);
            match self.index.find(node.hash, &node.key, &self.list) {
                Some(found) if found == handle => {}
                Some(_) => {
                    return Err(InvariantError::new(
                        "key index maps a key to a different entry than the list holds",
                    ));
                }
                None => {
                    return Err(InvariantError::new(
                        "list entry has no key index mapping",
                    ));
                }
            }

            if let Some(prev) = node.prev {
                if self.list.node(prev).next != Some(handle) {
                    return Err(InvariantError::new("neighbor links disagree"));
                }
            }
            if let Some(next) = node.next {
                if self.list.node(next).prev != Some(handle) {
                    return Err(InvariantError::new("neighbor links disagree"));
                }
            }

            walked += 1;
            newest = Some(handle);
            cursor = node.prev;
        }

        if walked != self.list.len() {
            return Err(InvariantError::new(format!(
                "walking the list reached {walked} of {} entries",
                self.list.len()
            )));
        }
        if newest != self.list.front() {
            return Err(InvariantError::new(
                "walk from the tail did not end at the head",
            ));
        }
        Ok(())
    }
}

impl<Key: std::fmt::Debug, Value: std::fmt::Debug> std::fmt::Debug for LruCache<Key, Value> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        struct Entries<'a, K, V>(&'a RecencyList<K, V>);

        impl<K: std::fmt::Debug, V: std::fmt::Debug> std::fmt::Debug for Entries<'_, K, V> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_map().entries(self.0.iter()).finish()
            }
        }

        f.debug_struct("LruCache")
            .field("capacity", &self.capacity)
            .field("len", &self.list.len())
            .field("entries", &Entries(&self.list))
            .finish()
    }
}

impl<Key, Value> IntoIterator for LruCache<Key, Value> {
    type IntoIter = IntoIter<Key, Value>;
    type Item = (Key, Value);

    /// Consumes the cache, yielding entries in eviction order, least
    /// recently used first.
    fn into_iter(self) -> IntoIter<Key, Value> {
        self.list.into_iter()
    }
}

impl<'a, Key, Value> IntoIterator for &'a LruCache<Key, Value> {
    type IntoIter = Iter<'a, Key, Value>;
    type Item = (&'a Key, &'a Value);

    fn into_iter(self) -> Iter<'a, Key, Value> {
        self.list.iter()
    }
}
