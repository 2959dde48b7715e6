use std::hash::Hash;
use std::sync::Arc;

use ahash::AHashMap;

/// Sentinel indices in the `nodes` arena.
const HEAD: usize = 0; // most-recently-used end
const TAIL: usize = 1; // least-recently-used end
const NULL: usize = usize::MAX;

struct Node<K, V> {
    /// `None` only for the HEAD and TAIL sentinels and for freed slots.
    entry: Option<(K, Arc<V>)>,
    /// Index toward HEAD (more recently used).
    prev: usize,
    /// Index toward TAIL (less recently used).
    next: usize,
}

/// Key/value map ordered by recency, with O(1) lookup, promotion and
/// removal of the least-recently-used entry.
///
/// Nodes are stored in a `Vec<Node<K, V>>` and linked by index, avoiding
/// unsafe raw pointers at the cost of a little indirection.  The store keeps
/// no weights; the engine on top of it does the accounting.
pub struct LinkedStore<K, V> {
    /// Index 0 = HEAD sentinel, 1 = TAIL sentinel, 2+ = real entries.
    nodes: Vec<Node<K, V>>,
    /// Maps a key to its index in `nodes`.
    map: AHashMap<K, usize>,
    /// Indices of freed (reusable) slots.
    free_list: Vec<usize>,
}

impl<K: Hash + Eq + Clone, V> LinkedStore<K, V> {
    pub fn new() -> Self {
        let mut nodes: Vec<Node<K, V>> = Vec::with_capacity(16);
        // HEAD sentinel (index 0): next points to TAIL initially
        nodes.push(Node {
            entry: None,
            prev: NULL,
            next: TAIL,
        });
        // TAIL sentinel (index 1): prev points to HEAD initially
        nodes.push(Node {
            entry: None,
            prev: HEAD,
            next: NULL,
        });

        LinkedStore {
            nodes,
            map: AHashMap::new(),
            free_list: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Returns the value for `key` and marks it most-recently-used.
    pub fn get(&mut self, key: &K) -> Option<&Arc<V>> {
        let idx = *self.map.get(key)?;
        self.unlink(idx);
        self.link_after_head(idx);
        self.nodes[idx].entry.as_ref().map(|(_, v)| v)
    }

    /// Returns the value for `key` without touching recency order.
    pub fn peek(&self, key: &K) -> Option<&Arc<V>> {
        let idx = *self.map.get(key)?;
        self.nodes[idx].entry.as_ref().map(|(_, v)| v)
    }

    /// Inserts or replaces `key`, moving it to the most-recently-used end.
    ///
    /// Returns the replaced entry, if any.
    pub fn insert(&mut self, key: K, value: Arc<V>) -> Option<(K, Arc<V>)> {
        if let Some(&idx) = self.map.get(&key) {
            let previous = self.nodes[idx].entry.replace((key, value));
            self.unlink(idx);
            self.link_after_head(idx);
            previous
        } else {
            let idx = self.alloc_node(key.clone(), value);
            self.map.insert(key, idx);
            self.link_after_head(idx);
            None
        }
    }

    /// Removes `key`.  Returns the removed value, if any.
    pub fn remove(&mut self, key: &K) -> Option<Arc<V>> {
        let idx = self.map.remove(key)?;
        self.release(idx).map(|(_, v)| v)
    }

    /// Returns the least-recently-used entry without removing it.
    pub fn peek_lru(&self) -> Option<(&K, &Arc<V>)> {
        let lru_idx = self.nodes[TAIL].prev;
        if lru_idx == HEAD {
            return None;
        }
        self.nodes[lru_idx].entry.as_ref().map(|(k, v)| (k, v))
    }

    /// Removes and returns the least-recently-used entry.
    pub fn pop_lru(&mut self) -> Option<(K, Arc<V>)> {
        let lru_idx = self.nodes[TAIL].prev;
        if lru_idx == HEAD {
            return None; // list is empty
        }
        let entry = self.release(lru_idx)?;
        self.map.remove(&entry.0);
        Some(entry)
    }

    /// Iterates from the least- to the most-recently-used entry.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            cursor: self.nodes[TAIL].prev,
            remaining: self.map.len(),
        }
    }

    /// Makes `idx` the most-recently-used node.
    fn link_after_head(&mut self, idx: usize) {
        let mru = self.nodes[HEAD].next;
        self.nodes[idx].prev = HEAD;
        self.nodes[idx].next = mru;
        self.nodes[HEAD].next = idx;
        self.nodes[mru].prev = idx;
    }

    /// Splices `idx` out, leaving its links cleared.
    fn unlink(&mut self, idx: usize) {
        let prev = self.nodes[idx].prev;
        let next = self.nodes[idx].next;
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
        self.nodes[idx].prev = NULL;
        self.nodes[idx].next = NULL;
    }

    /// Unlinks `idx`, empties the slot and puts it on the free list.
    fn release(&mut self, idx: usize) -> Option<(K, Arc<V>)> {
        self.unlink(idx);
        self.free_list.push(idx);
        self.nodes[idx].entry.take()
    }

    /// Stores an entry in a free slot, growing the arena when none is left.
    /// The returned node is not linked yet.
    fn alloc_node(&mut self, key: K, value: Arc<V>) -> usize {
        let node = Node {
            entry: Some((key, value)),
            prev: NULL,
            next: NULL,
        };
        match self.free_list.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }
}

impl<K: Hash + Eq + Clone, V> Default for LinkedStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Recency-ordered iterator over a [`LinkedStore`], oldest entry first.
pub struct Iter<'a, K, V> {
    nodes: &'a [Node<K, V>],
    cursor: usize,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a Arc<V>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == HEAD || self.cursor == NULL {
            return None;
        }
        let node = &self.nodes[self.cursor];
        self.cursor = node.prev;
        self.remaining = self.remaining.saturating_sub(1);
        node.entry.as_ref().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
