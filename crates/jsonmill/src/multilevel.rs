//! Three-tier cache composition.
//!
//! [`MultiLevelCache`] stacks three [`TieredCache`]s: a small fast L1, a
//! medium L2, and a large L3. Every write lands in L3; L2 and L1 only admit
//! entries under their size thresholds, so bulky documents cannot wash the
//! hot tiers out. Read hits in a lower tier promote the entry upward,
//! carrying the entry's stored size estimate so tier budgets stay accurate.

use std::{borrow::Borrow, hash::Hash};

use crate::{
    cache::{CacheStats, TieredCache},
    error::CacheError,
};

/// Sizing for the three tiers and the admission thresholds between them.
///
/// The defaults fit a service-side document cache: item counts of
/// 100/1 000/10 000, byte budgets of 10 MB/50 MB/200 MB, and admission
/// cutoffs of 100 KB for L1 and 1 MB for L2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Entry-count bound of L1.
    pub l1_max_items: usize,
    /// Byte budget of L1.
    pub l1_max_memory: usize,
    /// Entry-count bound of L2.
    pub l2_max_items: usize,
    /// Byte budget of L2.
    pub l2_max_memory: usize,
    /// Entry-count bound of L3.
    pub l3_max_items: usize,
    /// Byte budget of L3.
    pub l3_max_memory: usize,
    /// Largest entry admitted to L1, in bytes.
    pub l1_admit_threshold: usize,
    /// Largest entry admitted to L2, in bytes.
    pub l2_admit_threshold: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            l1_max_items: 100,
            l1_max_memory: 10 * 1024 * 1024,
            l2_max_items: 1_000,
            l2_max_memory: 50 * 1024 * 1024,
            l3_max_items: 10_000,
            l3_max_memory: 200 * 1024 * 1024,
            l1_admit_threshold: 100 * 1024,
            l2_admit_threshold: 1024 * 1024,
        }
    }
}

/// What a read hit in a lower tier does to the tiers above it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PromotionPolicy {
    /// Promote only entries that pass the receiving tier's admission
    /// threshold.
    #[default]
    SizeBelowThreshold,
    /// Promote unconditionally; an entry too big for the receiving tier's
    /// whole budget is still skipped.
    Always,
    /// Never promote; tiers change only through writes and eviction.
    Never,
}

/// Per-tier counters for a [`MultiLevelCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MultiLevelStats {
    /// L1 counters.
    pub l1: CacheStats,
    /// L2 counters.
    pub l2: CacheStats,
    /// L3 counters.
    pub l3: CacheStats,
}

/// A three-tier LRU cache with size-gated admission and read promotion.
///
/// L3 is the superset tier: every `set` writes it, and an entry too large
/// even for L3 is the only write that fails. L1 and L2 are populated by
/// writes under their thresholds and by promotion on read hits.
pub struct MultiLevelCache<K, V> {
    l1: TieredCache<K, V>,
    l2: TieredCache<K, V>,
    l3: TieredCache<K, V>,
    config: CacheConfig,
    policy: PromotionPolicy,
}

impl<K: Hash + Eq + Clone, V: Clone> MultiLevelCache<K, V> {
    /// Creates the tier stack described by `config` with the default
    /// promotion policy.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self::with_policy(config, PromotionPolicy::default())
    }

    /// Creates the tier stack with an explicit promotion policy.
    #[must_use]
    pub fn with_policy(config: CacheConfig, policy: PromotionPolicy) -> Self {
        Self {
            l1: TieredCache::new(config.l1_max_items, config.l1_max_memory),
            l2: TieredCache::new(config.l2_max_items, config.l2_max_memory),
            l3: TieredCache::new(config.l3_max_items, config.l3_max_memory),
            config,
            policy,
        }
    }

    /// Looks a value up, trying L1, then L2, then L3.
    ///
    /// A hit below L1 promotes the entry toward the front tiers according to
    /// the promotion policy, reusing the key and size estimate stored with
    /// the entry; the lookup itself only borrows `key`.
    pub fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if let Some(value) = self.l1.get(key) {
            return Some(value.clone());
        }
        if let Some((stored, value, size)) = self.l2.get_entry(key) {
            let (stored, value) = (stored.clone(), value.clone());
            self.promote(&stored, &value, size, Tier::L1);
            return Some(value);
        }
        if let Some((stored, value, size)) = self.l3.get_entry(key) {
            let (stored, value) = (stored.clone(), value.clone());
            self.promote(&stored, &value, size, Tier::L2);
            self.promote(&stored, &value, size, Tier::L1);
            return Some(value);
        }
        None
    }

    /// Inserts an entry.
    ///
    /// L3 is always written; L2 and L1 are written only when `size` passes
    /// their admission thresholds.
    ///
    /// # Errors
    ///
    /// [`CacheError::Oversize`] if `size` exceeds even the L3 byte budget;
    /// no tier is modified.
    pub fn set(&mut self, key: K, value: V, size: usize) -> Result<(), CacheError> {
        self.l3.set(key.clone(), value.clone(), size)?;
        if size <= self.config.l2_admit_threshold {
            let _ = self.l2.set(key.clone(), value.clone(), size);
        }
        if size <= self.config.l1_admit_threshold {
            let _ = self.l1.set(key, value, size);
        }
        Ok(())
    }

    /// Removes an entry from every tier, returning the value from the
    /// frontmost tier that held it.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let r1 = self.l1.remove(key);
        let r2 = self.l2.remove(key);
        let r3 = self.l3.remove(key);
        r1.or(r2).or(r3)
    }

    /// Drops every entry in every tier and resets all counters.
    pub fn clear(&mut self) {
        self.l1.clear();
        self.l2.clear();
        self.l3.clear();
    }

    /// Pre-populates the tiers from `(key, value, size)` triples.
    ///
    /// Items too large even for L3 are skipped with a log line rather than
    /// aborting the warmup.
    pub fn warmup<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = (K, V, usize)>,
    {
        for (key, value, size) in items {
            if let Err(err) = self.set(key, value, size) {
                tracing::debug!(%err, "skipped warmup item");
            }
        }
    }

    /// Per-tier counters.
    #[must_use]
    pub fn stats(&self) -> MultiLevelStats {
        MultiLevelStats {
            l1: self.l1.stats(),
            l2: self.l2.stats(),
            l3: self.l3.stats(),
        }
    }

    /// The L1 tier, for direct (recency-neutral) probing.
    #[must_use]
    pub fn l1(&self) -> &TieredCache<K, V> {
        &self.l1
    }

    /// The L2 tier, for direct probing.
    #[must_use]
    pub fn l2(&self) -> &TieredCache<K, V> {
        &self.l2
    }

    /// The L3 tier, for direct probing.
    #[must_use]
    pub fn l3(&self) -> &TieredCache<K, V> {
        &self.l3
    }

    fn promote(&mut self, key: &K, value: &V, size: usize, into: Tier) {
        let (tier, threshold) = match into {
            Tier::L1 => (&mut self.l1, self.config.l1_admit_threshold),
            Tier::L2 => (&mut self.l2, self.config.l2_admit_threshold),
        };
        let admitted = match self.policy {
            PromotionPolicy::SizeBelowThreshold => size <= threshold,
            PromotionPolicy::Always => true,
            PromotionPolicy::Never => false,
        };
        if !admitted {
            return;
        }
        if let Err(err) = tier.set(key.clone(), value.clone(), size) {
            tracing::trace!(%err, "promotion skipped");
        }
    }
}

#[derive(Clone, Copy)]
enum Tier {
    L1,
    L2,
}

impl<K, V> std::fmt::Debug for MultiLevelCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiLevelCache")
            .field("l1", &self.l1)
            .field("l2", &self.l2)
            .field("l3", &self.l3)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
