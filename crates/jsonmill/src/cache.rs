//! Single-tier LRU caching.
//!
//! [`TieredCache`] bounds both entry count and an accounted byte total. The
//! recency order lives in an intrusive doubly-linked list threaded through an
//! arena of slots, with a hash index from key to slot, so `get`, `set`, and
//! eviction are all O(1); no key ever moves in memory once inserted.

use std::{borrow::Borrow, collections::HashMap, hash::Hash};

use ahash::RandomState;

use crate::error::CacheError;

/// Sentinel slot index meaning "no slot".
const NIL: usize = usize::MAX;

/// Hit, miss, and eviction counters for one cache tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that found their key.
    pub hits: u64,
    /// Lookups that did not.
    pub misses: u64,
    /// Entries pushed out to satisfy a bound.
    pub evictions: u64,
}

impl CacheStats {
    /// Fraction of lookups that hit, in `0.0..=1.0`; `0.0` before any lookup.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct Node<K, V> {
    key: K,
    value: V,
    size: usize,
    prev: usize,
    next: usize,
}

/// A bounded LRU cache accounting both entry count and byte size.
///
/// Every entry carries a caller-supplied size estimate; after any mutating
/// call returns, `len() <= max_items` and `memory_used() <= max_memory`.
/// [`get`](TieredCache::get) refreshes recency, [`peek`](TieredCache::peek)
/// does not.
pub struct TieredCache<K, V> {
    index: HashMap<K, usize, RandomState>,
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<usize>,
    /// Most recently used slot.
    head: usize,
    /// Least recently used slot; evicted first.
    tail: usize,
    max_items: usize,
    max_memory: usize,
    memory_used: usize,
    stats: CacheStats,
}

impl<K: Hash + Eq + Clone, V> TieredCache<K, V> {
    /// Creates a cache bounded to `max_items` entries and `max_memory`
    /// accounted bytes.
    #[must_use]
    pub fn new(max_items: usize, max_memory: usize) -> Self {
        Self {
            index: HashMap::with_capacity_and_hasher(max_items.min(1024), RandomState::new()),
            slots: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            max_items,
            max_memory,
            memory_used: 0,
            stats: CacheStats::default(),
        }
    }

    /// Looks a value up and marks it most recently used.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_entry(key).map(|(_, value, _)| value)
    }

    /// Looks a value up together with its stored key and size estimate,
    /// marking it most recently used. The key and size are what promotion
    /// between tiers carries, so borrowed lookups can promote and budgets
    /// stay accurate.
    pub fn get_entry<Q>(&mut self, key: &Q) -> Option<(&K, &V, usize)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(&idx) = self.index.get(key) else {
            self.stats.misses += 1;
            return None;
        };
        self.stats.hits += 1;
        self.detach(idx);
        self.attach_front(idx);
        let node = self.slots[idx].as_ref().expect("indexed slot is occupied");
        Some((&node.key, &node.value, node.size))
    }

    /// Looks a value up without touching recency or the hit/miss counters.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let &idx = self.index.get(key)?;
        self.slots[idx].as_ref().map(|node| &node.value)
    }

    /// Returns `true` if `key` is present. Recency-neutral.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Inserts an entry with its size estimate, evicting least-recently-used
    /// entries until both bounds hold. Replaces the value and size in place
    /// if the key is already present (and refreshes its recency). A cache
    /// bounded to zero entries admits nothing, so `set` stores nothing and
    /// succeeds.
    ///
    /// # Errors
    ///
    /// [`CacheError::Oversize`] if `size` alone exceeds the byte budget; the
    /// cache is not modified.
    pub fn set(&mut self, key: K, value: V, size: usize) -> Result<(), CacheError> {
        if size > self.max_memory {
            return Err(CacheError::Oversize {
                size,
                budget: self.max_memory,
            });
        }
        // With a zero entry bound there is nothing to evict and nothing to
        // admit; running the eviction loop would walk off the empty list.
        if self.max_items == 0 {
            return Ok(());
        }

        if let Some(&idx) = self.index.get(&key) {
            let node = self.slots[idx].as_mut().expect("indexed slot is occupied");
            self.memory_used = self.memory_used - node.size + size;
            node.value = value;
            node.size = size;
            self.detach(idx);
            self.attach_front(idx);
        } else {
            while self.index.len() >= self.max_items
                || self.memory_used + size > self.max_memory
            {
                self.evict_oldest();
            }
            let idx = self.alloc(Node {
                key: key.clone(),
                value,
                size,
                prev: NIL,
                next: NIL,
            });
            self.attach_front(idx);
            self.index.insert(key, idx);
            self.memory_used += size;
        }

        // A replacement can raise the byte total past the budget; restore it
        // at the expense of older entries.
        while self.memory_used > self.max_memory {
            self.evict_oldest();
        }
        Ok(())
    }

    /// Removes an entry, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.index.remove(key)?;
        self.detach(idx);
        let node = self.slots[idx].take().expect("indexed slot is occupied");
        self.free.push(idx);
        self.memory_used -= node.size;
        Some(node.value)
    }

    /// Drops every entry and resets the counters.
    pub fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
        self.free.clear();
        self.head = NIL;
        self.tail = NIL;
        self.memory_used = 0;
        self.stats = CacheStats::default();
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Accounted byte total of the current entries.
    #[must_use]
    pub fn memory_used(&self) -> usize {
        self.memory_used
    }

    /// The entry-count bound.
    #[must_use]
    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// The byte budget.
    #[must_use]
    pub fn max_memory(&self) -> usize {
        self.max_memory
    }

    /// Counters since construction or the last [`clear`](TieredCache::clear).
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    fn alloc(&mut self, node: Node<K, V>) -> usize {
        if let Some(idx) = self.free.pop() {
            debug_assert!(self.slots[idx].is_none());
            self.slots[idx] = Some(node);
            idx
        } else {
            self.slots.push(Some(node));
            self.slots.len() - 1
        }
    }

    fn evict_oldest(&mut self) {
        let idx = self.tail;
        debug_assert_ne!(idx, NIL, "eviction requested on an empty cache");
        self.detach(idx);
        let node = self.slots[idx].take().expect("tail slot is occupied");
        self.free.push(idx);
        self.index.remove(&node.key);
        self.memory_used -= node.size;
        self.stats.evictions += 1;
        tracing::trace!(size = node.size, "evicted least recently used entry");
    }

    /// Unlinks `idx` from the recency list.
    fn detach(&mut self, idx: usize) {
        let (prev, next) = {
            let node = self.slots[idx].as_ref().expect("detach of occupied slot");
            (node.prev, node.next)
        };
        if prev == NIL {
            self.head = next;
        } else {
            self.slots[prev].as_mut().expect("linked slot").next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.slots[next].as_mut().expect("linked slot").prev = prev;
        }
    }

    /// Links `idx` in as the most recently used entry.
    fn attach_front(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let node = self.slots[idx].as_mut().expect("attach of occupied slot");
            node.prev = NIL;
            node.next = old_head;
        }
        if old_head != NIL {
            self.slots[old_head].as_mut().expect("linked slot").prev = idx;
        }
        self.head = idx;
        if self.tail == NIL {
            self.tail = idx;
        }
    }

    /// Keys oldest-first; test and diagnostic aid.
    #[cfg(test)]
    fn recency_order(&self) -> Vec<&K> {
        let mut keys = Vec::with_capacity(self.index.len());
        let mut idx = self.tail;
        while idx != NIL {
            let node = self.slots[idx].as_ref().expect("linked slot");
            keys.push(&node.key);
            idx = node.prev;
        }
        keys
    }
}

impl<K, V> std::fmt::Debug for TieredCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredCache")
            .field("len", &self.index.len())
            .field("max_items", &self.max_items)
            .field("memory_used", &self.memory_used)
            .field("max_memory", &self.max_memory)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
