//! The parsing engine facade.
//!
//! [`ParserEngine`] is the batteries-included entry point: it fronts the
//! [`MultiLevelCache`] with the single-shot parser and a shared
//! [`StringPool`], so repeated documents cost one hash lookup and repeated
//! strings across documents share allocations.

use std::sync::Arc;

use crate::{
    error::ParseError,
    intern::StringPool,
    multilevel::{CacheConfig, MultiLevelCache, MultiLevelStats, PromotionPolicy},
    parser,
    streaming::{StreamOptions, StreamingParser},
    value::Value,
};

/// Counters exposed by [`ParserEngine::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Per-tier cache counters.
    pub cache: MultiLevelStats,
    /// Distinct strings currently interned (object keys and string values
    /// from parsed trees).
    pub pooled_strings: usize,
}

/// A caching, interning JSON parse engine.
///
/// `parse` looks the document text up in the tiered cache first; a hit
/// returns the shared tree without touching the parser. On a miss the
/// document is parsed with the engine's pool (so keys and string values are
/// interned engine-wide), wrapped in an `Arc`, and stored with the document's
/// byte length as its size estimate.
///
/// The engine is single-threaded by construction: every operation takes
/// `&mut self`, and callers who share one across threads wrap it in a lock.
///
/// # Examples
///
/// ```
/// use jsonmill::ParserEngine;
///
/// let mut engine = ParserEngine::default();
/// let first = engine.parse(r#"{"a":1}"#).unwrap();
/// let second = engine.parse(r#"{"a":1}"#).unwrap();
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// ```
#[derive(Debug)]
pub struct ParserEngine {
    cache: MultiLevelCache<Arc<str>, Arc<Value>>,
    pool: StringPool,
}

impl Default for ParserEngine {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl ParserEngine {
    /// Creates an engine over a tier stack sized by `config`.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self::with_policy(config, PromotionPolicy::default())
    }

    /// Creates an engine with an explicit cache promotion policy.
    #[must_use]
    pub fn with_policy(config: CacheConfig, policy: PromotionPolicy) -> Self {
        Self {
            cache: MultiLevelCache::with_policy(config, policy),
            pool: StringPool::new(),
        }
    }

    /// Parses a document, serving repeats from the cache.
    ///
    /// The cache key is the document text itself. Lookups borrow the text,
    /// so a repeat parse is one hash probe with no allocation; the key is
    /// allocated only when a result is stored, and it lives and dies with
    /// the cache entry rather than in the pool. Parse failures are returned
    /// as-is and never cached; a cache store rejected for size is logged and
    /// the parse still succeeds.
    ///
    /// # Errors
    ///
    /// The [`ParseError`] of the underlying parse on a cache miss.
    pub fn parse(&mut self, text: &str) -> Result<Arc<Value>, ParseError> {
        if let Some(hit) = self.cache.get(text) {
            tracing::debug!(bytes = text.len(), "cache hit");
            return Ok(hit);
        }
        tracing::debug!(bytes = text.len(), "cache miss");
        let value = Arc::new(parser::parse_with_pool(text, &mut self.pool)?);
        if let Err(err) = self.cache.set(Arc::from(text), Arc::clone(&value), text.len()) {
            tracing::debug!(%err, "parse result not cached");
        }
        Ok(value)
    }

    /// Opens an incremental session for chunked input.
    ///
    /// Sessions own their pool and buffer and are independent of the engine;
    /// values they emit are not stored in the engine's cache.
    #[must_use]
    pub fn open_stream(&self, options: StreamOptions) -> StreamingParser {
        StreamingParser::new(options)
    }

    /// Current cache and pool counters.
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            cache: self.cache.stats(),
            pooled_strings: self.pool.len(),
        }
    }

    /// The tier stack, for direct probing.
    #[must_use]
    pub fn cache(&self) -> &MultiLevelCache<Arc<str>, Arc<Value>> {
        &self.cache
    }

    /// Drops every cached tree and interned string and resets all counters.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.pool.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn repeat_parse_hits_the_cache() {
        let mut engine = ParserEngine::default();
        let first = engine.parse(r#"{"a":1,"b":"x"}"#).unwrap();
        let second = engine.parse(r#"{"a":1,"b":"x"}"#).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        let stats = engine.stats();
        assert_eq!(stats.cache.l1.hits, 1);
        assert_eq!(stats.cache.l1.misses, 1);
    }

    #[test]
    fn failures_are_returned_and_not_cached() {
        let mut engine = ParserEngine::default();
        let err = engine.parse("tru").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidToken);
        let err = engine.parse("tru").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidToken);
        // Both attempts missed; nothing was stored.
        assert_eq!(engine.stats().cache.l1.hits, 0);
        assert!(!engine.cache().l3().contains_key("tru"));
    }

    #[test]
    fn keys_intern_across_documents() {
        let mut engine = ParserEngine::default();
        let a = engine.parse(r#"{"id":1}"#).unwrap();
        let b = engine.parse(r#"{"id":2}"#).unwrap();
        let (Value::Object(ma), Value::Object(mb)) = (&*a, &*b) else {
            panic!("expected objects");
        };
        assert!(Arc::ptr_eq(ma.keys().next().unwrap(), mb.keys().next().unwrap()));
    }

    #[test]
    fn document_text_stays_out_of_the_pool() {
        let mut engine = ParserEngine::default();
        engine.parse(r#"{"id":1}"#).unwrap();
        // Only the object key is interned; the document text belongs to the
        // cache entry and goes away when the entry does.
        assert_eq!(engine.stats().pooled_strings, 1);
        engine.parse(r#"{"id":2}"#).unwrap();
        assert_eq!(engine.stats().pooled_strings, 1);
    }

    #[test]
    fn clear_forgets_cached_trees() {
        let mut engine = ParserEngine::default();
        let first = engine.parse("[1,2]").unwrap();
        engine.clear();
        assert_eq!(engine.stats(), EngineStats::default());
        let second = engine.parse("[1,2]").unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);
    }
}
