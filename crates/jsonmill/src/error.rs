//! Error types shared across the parser, streaming sessions, and caches.

use thiserror::Error;

/// Classification of a parse failure.
///
/// Exactly one code is attached to any failed parse step; a successful step
/// is the `Ok` arm of a `Result` rather than a sentinel code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorCode {
    /// The buffer was exhausted before a token or value completed.
    #[error("unexpected end of input")]
    UnexpectedEof,
    /// A byte that cannot begin or continue any JSON token, a mismatched
    /// literal, or trailing content after the first top-level value.
    #[error("invalid token")]
    InvalidToken,
    /// A string with no closing quote.
    #[error("unterminated string")]
    UnterminatedString,
    /// A string containing an invalid escape sequence, a lone surrogate, or
    /// an unescaped control character.
    #[error("invalid string")]
    InvalidString,
    /// A malformed number (lone sign, duplicate decimal point, empty
    /// exponent, and similar).
    #[error("invalid number")]
    InvalidNumber,
    /// A structurally malformed array (misplaced separator or terminator).
    #[error("invalid array")]
    InvalidArray,
    /// A structurally malformed object (missing colon, non-string key,
    /// misplaced separator or terminator).
    #[error("invalid object")]
    InvalidObject,
}

/// A parse failure with the byte offset at which it was detected.
///
/// Offsets are relative to the start of the document for single-shot parses,
/// and to the start of the logical stream for streaming sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{code} at byte offset {offset}")]
pub struct ParseError {
    /// What went wrong.
    pub code: ErrorCode,
    /// Byte offset of the failure.
    pub offset: usize,
}

impl ParseError {
    pub(crate) fn new(code: ErrorCode, offset: usize) -> Self {
        Self { code, offset }
    }
}

/// A cache admission failure.
///
/// Capacity failures are reported distinctly from parse failures and never
/// abort an otherwise-successful parse; the value is simply not cached at
/// the rejecting tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The item's size estimate exceeds the tier's entire memory budget.
    #[error("item of {size} bytes exceeds the {budget}-byte memory budget")]
    Oversize {
        /// Size estimate of the rejected item.
        size: usize,
        /// Memory budget of the rejecting tier.
        budget: usize,
    },
}
