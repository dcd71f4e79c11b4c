//! String interning.
//!
//! The parser allocates one `Arc<str>` per *distinct* string and hands out
//! clones for every repeat, so a million objects with the same keys hold a
//! handful of allocations. Interned strings from the same pool compare equal
//! by pointer, which [`Map`](crate::Map) lookups and tree comparisons in hot
//! paths can exploit.

use std::{collections::HashSet, sync::Arc};

use ahash::RandomState;

/// A deduplicating pool of reference-counted strings.
///
/// [`intern`](StringPool::intern) is content-addressed: two calls with equal
/// content return clones of the same `Arc<str>` until the pool is cleared.
/// Dropping the pool does not invalidate handed-out strings; they keep their
/// own reference counts.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use jsonmill::StringPool;
///
/// let mut pool = StringPool::new();
/// let a = pool.intern("status");
/// let b = pool.intern("status");
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
#[derive(Debug, Default)]
pub struct StringPool {
    strings: HashSet<Arc<str>, RandomState>,
}

impl StringPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the pooled `Arc<str>` for `s`, allocating it on first sight.
    ///
    /// Lookup is by content; no allocation happens on a pool hit.
    pub fn intern(&mut self, s: &str) -> Arc<str> {
        if let Some(existing) = self.strings.get(s) {
            return Arc::clone(existing);
        }
        let arc: Arc<str> = Arc::from(s);
        self.strings.insert(Arc::clone(&arc));
        arc
    }

    /// Number of distinct strings currently pooled.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Returns `true` if the pool holds no strings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Drops the pool's references.
    ///
    /// Strings already handed out stay alive; subsequent [`intern`] calls for
    /// the same content allocate fresh `Arc`s that are content-equal but not
    /// pointer-equal to the old ones.
    ///
    /// [`intern`]: StringPool::intern
    pub fn clear(&mut self) {
        self.strings.clear();
    }
}
