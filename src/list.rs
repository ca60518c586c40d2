use slab::Slab;

/// Index of an entry's slot in the arena.
///
/// Handles stay valid until the entry they name is evicted; the slot is
/// then reused by a later insertion.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) struct Handle(usize);

impl std::fmt::Debug for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Handle({})", self.0)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) hash: u64,
    /// Neighbor toward the most-recently-used end.
    pub(crate) prev: Option<Handle>,
    /// Neighbor toward the least-recently-used end.
    pub(crate) next: Option<Handle>,
}

/// Doubly linked list of entries ordered by last access, most recent at the
/// head. Nodes live in a slab arena and link to each other by [`Handle`],
/// with `None` head/tail marking the empty list.
#[derive(Debug, Clone)]
pub(crate) struct RecencyList<K, V> {
    nodes: Slab<Node<K, V>>,
    head: Option<Handle>,
    tail: Option<Handle>,
}

impl<K, V> RecencyList<K, V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        RecencyList {
            nodes: Slab::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V> {
        &self.nodes[handle.0]
    }

    pub(crate) fn node_mut(&mut self, handle: Handle) -> &mut Node<K, V> {
        &mut self.nodes[handle.0]
    }

    pub(crate) fn front(&self) -> Option<Handle> {
        self.head
    }

    pub(crate) fn back(&self) -> Option<Handle> {
        self.tail
    }

    /// Inserts a brand-new entry at the most-recently-used end.
    pub(crate) fn push_front(&mut self, key: K, value: V, hash: u64) -> Handle {
        let old_head = self.head;
        let handle = Handle(self.nodes.insert(Node {
            key,
            value,
            hash,
            prev: None,
            next: old_head,
        }));

        match old_head {
            Some(head) => self.nodes[head.0].prev = Some(handle),
            None => self.tail = Some(handle),
        }
        self.head = Some(handle);
        handle
    }

    /// Detaches the entry from its neighbors and re-links it at the
    /// most-recently-used end. A no-op when the entry is already at the head.
    pub(crate) fn move_to_front(&mut self, handle: Handle) {
        if self.head == Some(handle) {
            return;
        }

        self.unlink(handle);

        let old_head = self.head;
        self.nodes[handle.0].next = old_head;
        match old_head {
            Some(head) => self.nodes[head.0].prev = Some(handle),
            None => self.tail = Some(handle),
        }
        self.head = Some(handle);
    }

    /// Detaches and frees the least-recently-used entry.
    pub(crate) fn pop_back(&mut self) -> Option<Node<K, V>> {
        let handle = self.tail?;
        self.unlink(handle);
        Some(self.nodes.remove(handle.0))
    }

    /// Removes the entry from the chain, updating its two neighbors to point
    /// at each other. The slot itself stays allocated.
    fn unlink(&mut self, handle: Handle) {
        let node = &mut self.nodes[handle.0];
        let prev = node.prev.take();
        let next = node.next.take();

        match prev {
            Some(prev) => self.nodes[prev.0].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.nodes[next.0].prev = prev,
            None => self.tail = prev,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            cursor: self.tail,
            remaining: self.len(),
        }
    }

    pub(crate) fn into_iter(self) -> IntoIter<K, V> {
        IntoIter {
            cursor: self.tail,
            remaining: self.nodes.len(),
            nodes: self.nodes,
        }
    }
}

/// Iterator over entries in eviction order, least recently used first.
///
/// Returned by [`LruCache::iter`](crate::LruCache::iter).
pub struct Iter<'a, K, V> {
    list: &'a RecencyList<K, V>,
    cursor: Option<Handle>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.cursor?;
        let node = self.list.node(handle);
        self.cursor = node.prev;
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Owning iterator over entries in eviction order, least recently used
/// first.
///
/// Returned by [`LruCache::into_iter`](crate::LruCache).
pub struct IntoIter<K, V> {
    nodes: Slab<Node<K, V>>,
    cursor: Option<Handle>,
    remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.cursor?;
        let node = self.nodes.remove(handle.0);
        self.cursor = node.prev;
        self.remaining -= 1;
        Some((node.key, node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys_lru_first(list: &RecencyList<i32, i32>) -> Vec<i32> {
        list.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn push_front_orders_most_recent_first() {
        let mut list = RecencyList::with_capacity(4);
        list.push_front(1, 10, 0);
        list.push_front(2, 20, 0);
        list.push_front(3, 30, 0);

        assert_eq!(keys_lru_first(&list), [1, 2, 3]);
        assert_eq!(list.node(list.front().unwrap()).key, 3);
        assert_eq!(list.node(list.back().unwrap()).key, 1);
    }

    #[test]
    fn move_to_front_reorders() {
        let mut list = RecencyList::with_capacity(4);
        let a = list.push_front(1, 10, 0);
        let _b = list.push_front(2, 20, 0);
        let _c = list.push_front(3, 30, 0);

        list.move_to_front(a);
        assert_eq!(keys_lru_first(&list), [2, 3, 1]);
    }

    #[test]
    fn move_to_front_of_head_is_noop() {
        let mut list = RecencyList::with_capacity(2);
        let _a = list.push_front(1, 10, 0);
        let b = list.push_front(2, 20, 0);

        list.move_to_front(b);
        list.move_to_front(b);
        assert_eq!(keys_lru_first(&list), [1, 2]);
        assert_eq!(list.front(), Some(b));
    }

    #[test]
    fn move_tail_to_front_updates_both_ends() {
        let mut list = RecencyList::with_capacity(2);
        let a = list.push_front(1, 10, 0);
        let b = list.push_front(2, 20, 0);

        list.move_to_front(a);
        assert_eq!(list.front(), Some(a));
        assert_eq!(list.back(), Some(b));
        assert_eq!(keys_lru_first(&list), [2, 1]);
    }

    #[test]
    fn pop_back_removes_least_recent() {
        let mut list = RecencyList::with_capacity(4);
        list.push_front(1, 10, 0);
        list.push_front(2, 20, 0);

        let node = list.pop_back().unwrap();
        assert_eq!(node.key, 1);
        assert_eq!(node.value, 10);
        assert_eq!(list.len(), 1);

        let node = list.pop_back().unwrap();
        assert_eq!(node.key, 2);
        assert!(list.pop_back().is_none());
        assert!(list.is_empty());
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut list = RecencyList::with_capacity(2);
        let a = list.push_front(1, 10, 0);
        list.push_front(2, 20, 0);

        list.pop_back();
        let c = list.push_front(3, 30, 0);
        assert_eq!(a.0, c.0);
        assert_eq!(keys_lru_first(&list), [2, 3]);
    }

    #[test]
    fn single_entry_list() {
        let mut list = RecencyList::with_capacity(1);
        let a = list.push_front(1, 10, 0);

        list.move_to_front(a);
        assert_eq!(list.front(), Some(a));
        assert_eq!(list.back(), Some(a));
        assert_eq!(keys_lru_first(&list), [1]);
    }

    #[test]
    fn into_iter_matches_iter() {
        let mut list = RecencyList::with_capacity(4);
        let a = list.push_front(1, 10, 0);
        list.push_front(2, 20, 0);
        list.push_front(3, 30, 0);
        list.move_to_front(a);

        let borrowed: Vec<_> = list.iter().map(|(k, v)| (*k, *v)).collect();
        let owned: Vec<_> = list.into_iter().collect();
        assert_eq!(borrowed, owned);
        assert_eq!(owned, [(2, 20), (3, 30), (1, 10)]);
    }

    #[test]
    fn clear_resets_ends() {
        let mut list = RecencyList::with_capacity(4);
        list.push_front(1, 10, 0);
        list.push_front(2, 20, 0);

        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
        assert_eq!(keys_lru_first(&list), [] as [i32; 0]);
    }
}
