//! A cached, interning JSON parsing engine.
//!
//! The crate is built from five parts, usable separately or through the
//! [`ParserEngine`] facade:
//!
//! - [`scan`]: vectorized byte scanning (quote finding, digit runs) with
//!   byte-identical scalar fallbacks;
//! - [`parser`]: single-shot parsing to [`Value`] trees, plus a span-only
//!   surface for zero-copy extraction;
//! - [`StreamingParser`]: incremental parsing over arbitrarily chunked
//!   input;
//! - [`StringPool`]: content-addressed `Arc<str>` interning shared by the
//!   parsers;
//! - [`TieredCache`] / [`MultiLevelCache`]: bounded LRU tiers keyed by
//!   document text.
//!
//! ```
//! use jsonmill::{ParserEngine, Value};
//!
//! let mut engine = ParserEngine::default();
//! let tree = engine.parse(r#"{"answer":42}"#).unwrap();
//! let Value::Object(map) = &*tree else { unreachable!() };
//! assert_eq!(map.get("answer"), Some(&Value::Number(42.0)));
//! ```

mod cache;
mod chunk_utils;
mod engine;
mod error;
mod intern;
mod multilevel;
pub mod parser;
pub mod scan;
mod streaming;
mod value;

#[cfg(test)]
mod tests;

pub use cache::{CacheStats, TieredCache};
pub use chunk_utils::{partition_bytes, produce_chunks};
pub use engine::{EngineStats, ParserEngine};
pub use error::{CacheError, ErrorCode, ParseError};
pub use intern::StringPool;
pub use multilevel::{CacheConfig, MultiLevelCache, MultiLevelStats, PromotionPolicy};
pub use parser::{parse, parse_with_pool, value_span, ParseSpan, ValueKind};
pub use streaming::{StreamOptions, StreamingParser};
pub use value::{Array, Map, Value};
