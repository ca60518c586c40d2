use std::hash::{
    BuildHasher,
    Hash,
};

use hashbrown::HashTable;

use crate::{
    RandomState,
    list::{
        Handle,
        RecencyList,
    },
};

/// Hash table mapping each cached key to the handle of its arena slot.
///
/// The table stores only handles; keys and their hashes live in the list
/// nodes, so rehashing and removal read them back through the arena instead
/// of hashing keys again.
pub(crate) struct KeyIndex {
    table: HashTable<Handle>,
    hasher: RandomState,
}

impl KeyIndex {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        KeyIndex {
            table: HashTable::with_capacity(capacity),
            hasher: RandomState::default(),
        }
    }

    pub(crate) fn hash<K: Hash>(&self, key: &K) -> u64 {
        self.hasher.hash_one(key)
    }

    /// Returns the handle for `key`, or `None` if the key is absent.
    pub(crate) fn lookup<K: Hash + Eq, V>(
        &self,
        key: &K,
        list: &RecencyList<K, V>,
    ) -> Option<Handle> {
        self.find(self.hash(key), key, list)
    }

    pub(crate) fn find<K: Eq, V>(
        &self,
        hash: u64,
        key: &K,
        list: &RecencyList<K, V>,
    ) -> Option<Handle> {
        self.table
            .find(hash, |handle| list.node(*handle).key == *key)
            .copied()
    }

    /// Adds a mapping for a key the caller knows to be absent.
    pub(crate) fn insert<K, V>(&mut self, hash: u64, handle: Handle, list: &RecencyList<K, V>) {
        self.table
            .insert_unique(hash, handle, |handle| list.node(*handle).hash);
    }

    /// Deletes the mapping holding `handle`. The caller guarantees the
    /// handle was inserted with this `hash` and not yet removed.
    pub(crate) fn remove(&mut self, hash: u64, handle: Handle) {
        match self.table.find_entry(hash, |h| *h == handle) {
            Ok(entry) => {
                entry.remove();
            }
            Err(_) => debug_assert!(false, "handle missing from key index: {handle:?}"),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.table.len()
    }

    pub(crate) fn clear(&mut self) {
        self.table.clear();
    }
}

impl Clone for KeyIndex {
    fn clone(&self) -> Self {
        KeyIndex {
            table: self.table.clone(),
            hasher: self.hasher.clone(),
        }
    }
}

impl std::fmt::Debug for KeyIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyIndex")
            .field("len", &self.table.len())
            .finish()
    }
}
