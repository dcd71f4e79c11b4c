//! Incremental parsing over chunked input.
//!
//! A [`StreamingParser`] session accepts input in arbitrary slices (one byte
//! at a time if need be, with UTF-8 sequences split anywhere) and emits each
//! completed top-level value as soon as its final byte arrives. Between
//! chunks the session carries only the bytes of the still-open value plus a
//! small resume state (string escape parity, open container frames), so a
//! long stream of small documents runs in bounded memory.
//!
//! The boundary scanner is deliberately permissive: it finds where a
//! top-level value *ends*, and the full [`parser`](crate::parser) then
//! materializes and validates that byte range. A structural error inside a
//! container therefore surfaces when the container completes, with the same
//! error code and offset a single-shot parse of the stream would produce.

use crate::{
    error::{ErrorCode, ParseError},
    intern::StringPool,
    parser,
    scan,
    value::Value,
};

/// Session-level options for a [`StreamingParser`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamOptions {
    /// Accept more than one top-level value per stream.
    ///
    /// Off by default: any non-whitespace byte after the first value fails
    /// with [`ErrorCode::InvalidToken`]. When set, the session resets after
    /// each value and keeps emitting.
    pub allow_multiple_values: bool,
}

/// Resume point of the scanner between chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Between tokens; whitespace and separators are consumed here.
    Idle,
    /// Inside a string literal, with the escape parity at the chunk edge.
    InString { escape_pending: bool },
    /// Inside a number token.
    InNumber,
    /// Inside a `true`/`false`/`null` literal (or a run that will fail as
    /// one).
    InLiteral,
}

/// An open container surrounding the scanner's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Array,
    Object,
}

/// An incremental JSON parser fed by [`write`](StreamingParser::write) calls.
///
/// The first error is terminal: it is recorded and every subsequent `write`
/// or [`end`](StreamingParser::end) returns the same [`ParseError`]. Error
/// offsets are relative to the start of the logical stream. Dropping a
/// session without `end` leaks nothing; the carry buffer is owned.
///
/// # Examples
///
/// ```
/// use jsonmill::{StreamingParser, StreamOptions};
///
/// let mut session = StreamingParser::new(StreamOptions::default());
/// assert!(session.write(b"{\"test\":tr").unwrap().is_empty());
/// let values = session.write(b"ue}").unwrap();
/// assert_eq!(values.len(), 1);
/// assert!(session.end().unwrap().is_empty());
/// ```
#[derive(Debug)]
pub struct StreamingParser {
    options: StreamOptions,
    /// Unconsumed bytes: the open value's prefix plus anything unscanned.
    buf: Vec<u8>,
    /// Scan cursor within `buf`.
    pos: usize,
    /// Bytes drained from `buf` so far; `consumed + pos` is the global
    /// stream offset.
    consumed: usize,
    state: State,
    frames: Vec<Frame>,
    /// Start of the current top-level value within `buf`.
    value_start: Option<usize>,
    failed: Option<ParseError>,
    emitted_any: bool,
    /// Set after the first value when multiple values are not allowed.
    done: bool,
    pool: StringPool,
}

impl Default for StreamingParser {
    fn default() -> Self {
        Self::new(StreamOptions::default())
    }
}

impl StreamingParser {
    /// Creates a session with the given options.
    #[must_use]
    pub fn new(options: StreamOptions) -> Self {
        Self {
            options,
            buf: Vec::new(),
            pos: 0,
            consumed: 0,
            state: State::Idle,
            frames: Vec::new(),
            value_start: None,
            failed: None,
            emitted_any: false,
            done: false,
            pool: StringPool::new(),
        }
    }

    /// Appends a chunk and returns every top-level value completed by it.
    ///
    /// Any chunk size is legal; chunks may split tokens, escapes, and UTF-8
    /// sequences.
    ///
    /// # Errors
    ///
    /// The first [`ParseError`] of the stream; repeated verbatim by every
    /// later call once the session has failed.
    pub fn write(&mut self, chunk: &[u8]) -> Result<Vec<Value>, ParseError> {
        if let Some(err) = self.failed {
            return Err(err);
        }
        self.buf.extend_from_slice(chunk);
        match self.scan() {
            Ok(values) => Ok(values),
            Err(err) => {
                self.failed = Some(err);
                Err(err)
            }
        }
    }

    /// Closes the stream, returning any value terminated by end-of-input.
    ///
    /// A top-level number or literal may be completed by `end` itself (the
    /// stream `42` has no delimiter after it).
    ///
    /// # Errors
    ///
    /// The session's recorded error, if it has already failed;
    /// [`ErrorCode::UnexpectedEof`] if a token or container is still open or
    /// the stream produced no value at all; any [`ParseError`] found while
    /// materializing a value completed by the end of input.
    pub fn end(mut self) -> Result<Vec<Value>, ParseError> {
        if let Some(err) = self.failed {
            return Err(err);
        }
        let eof = ParseError::new(ErrorCode::UnexpectedEof, self.consumed + self.buf.len());
        let mut out = Vec::new();
        match self.state {
            State::InString { .. } => return Err(eof),
            State::InNumber | State::InLiteral => {
                self.state = State::Idle;
                self.finish_token(&mut out)?;
            }
            State::Idle => {}
        }
        if !self.frames.is_empty() {
            return Err(eof);
        }
        if out.is_empty() && !self.emitted_any {
            return Err(eof);
        }
        Ok(out)
    }

    /// Number of distinct strings interned by this session so far.
    #[must_use]
    pub fn pooled_strings(&self) -> usize {
        self.pool.len()
    }

    fn scan(&mut self) -> Result<Vec<Value>, ParseError> {
        let mut out = Vec::new();
        loop {
            match self.state {
                State::InString { escape_pending } => {
                    if !self.resume_string(escape_pending) {
                        break;
                    }
                    self.finish_token(&mut out)?;
                }
                State::InNumber => {
                    if !self.resume_run(is_number_byte) {
                        break;
                    }
                    self.finish_token(&mut out)?;
                }
                State::InLiteral => {
                    if !self.resume_run(|b| b.is_ascii_alphabetic()) {
                        break;
                    }
                    self.finish_token(&mut out)?;
                }
                State::Idle => {
                    while self.pos < self.buf.len() && is_ws(self.buf[self.pos]) {
                        self.pos += 1;
                    }
                    if self.frames.is_empty() && self.value_start.is_none() && self.pos > 0 {
                        // Between top-level values; drop the whitespace.
                        self.consumed += self.pos;
                        self.buf.drain(..self.pos);
                        self.pos = 0;
                    }
                    let Some(&b) = self.buf.get(self.pos) else {
                        break;
                    };
                    if self.done {
                        return Err(self.error_at(ErrorCode::InvalidToken, self.pos));
                    }
                    match b {
                        b'"' => {
                            self.start_value();
                            self.pos += 1;
                            self.state = State::InString {
                                escape_pending: false,
                            };
                        }
                        b'-' | b'0'..=b'9' => {
                            self.start_value();
                            self.pos += 1;
                            self.state = State::InNumber;
                        }
                        b'[' => {
                            self.start_value();
                            self.pos += 1;
                            self.frames.push(Frame::Array);
                        }
                        b'{' => {
                            self.start_value();
                            self.pos += 1;
                            self.frames.push(Frame::Object);
                        }
                        b']' | b'}' => {
                            if self.frames.pop().is_none() {
                                return Err(self.error_at(ErrorCode::InvalidToken, self.pos));
                            }
                            self.pos += 1;
                            self.finish_token(&mut out)?;
                        }
                        b',' | b':' => {
                            if self.frames.is_empty() {
                                return Err(self.error_at(ErrorCode::InvalidToken, self.pos));
                            }
                            self.pos += 1;
                        }
                        b if b.is_ascii_alphabetic() => {
                            self.start_value();
                            self.pos += 1;
                            self.state = State::InLiteral;
                        }
                        _ => return Err(self.error_at(ErrorCode::InvalidToken, self.pos)),
                    }
                }
            }
        }
        Ok(out)
    }

    /// Marks the current position as the start of a top-level value.
    fn start_value(&mut self) {
        if self.frames.is_empty() && self.value_start.is_none() {
            self.value_start = Some(self.pos);
        }
    }

    /// Called when a token or closing bracket completes at `pos`. If no
    /// container is open, the finished top-level value is materialized,
    /// validated, emitted, and drained from the carry buffer.
    fn finish_token(&mut self, out: &mut Vec<Value>) -> Result<(), ParseError> {
        self.state = State::Idle;
        if !self.frames.is_empty() {
            return Ok(());
        }
        let start = self
            .value_start
            .take()
            .expect("completed top-level value has a recorded start");
        let end = self.pos;
        let text = std::str::from_utf8(&self.buf[start..end]).map_err(|err| {
            ParseError::new(
                ErrorCode::InvalidString,
                self.consumed + start + err.valid_up_to(),
            )
        })?;
        let value = parser::parse_with_pool(text, &mut self.pool)
            .map_err(|err| ParseError::new(err.code, self.consumed + start + err.offset))?;
        tracing::trace!(bytes = end - start, "completed streaming value");
        out.push(value);
        self.emitted_any = true;
        if !self.options.allow_multiple_values {
            self.done = true;
        }
        self.consumed += end;
        self.buf.drain(..end);
        self.pos = 0;
        Ok(())
    }

    /// Advances through string content. Returns `true` when the closing
    /// quote was found; otherwise records the escape parity at the buffer
    /// edge and waits for more input.
    fn resume_string(&mut self, escape_pending: bool) -> bool {
        let len = self.buf.len();
        let mut start = self.pos;
        if escape_pending {
            if start >= len {
                return false;
            }
            // The escaped byte itself; its validity is checked at
            // materialization.
            start += 1;
        }
        match scan::find_unescaped_quote(&self.buf, start, len) {
            Some(quote) => {
                self.pos = quote + 1;
                true
            }
            None => {
                // Escape parity at the edge equals the parity of the maximal
                // trailing backslash run: the byte before the run always
                // leaves the scanner in a non-escaped state.
                let mut i = len;
                while i > start && self.buf[i - 1] == b'\\' {
                    i -= 1;
                }
                self.state = State::InString {
                    escape_pending: (len - i) % 2 == 1,
                };
                self.pos = len;
                false
            }
        }
    }

    /// Advances through a byte run. Returns `true` when a non-matching byte
    /// terminates the token; `false` when the buffer ran out first.
    fn resume_run(&mut self, matches: impl Fn(u8) -> bool) -> bool {
        let len = self.buf.len();
        while self.pos < len && matches(self.buf[self.pos]) {
            self.pos += 1;
        }
        self.pos < len
    }

    fn error_at(&self, code: ErrorCode, idx: usize) -> ParseError {
        ParseError::new(code, self.consumed + idx)
    }
}

#[inline]
fn is_ws(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Bytes that can appear anywhere in a number token. Deliberately loose;
/// the materializing parser enforces the grammar.
#[inline]
fn is_number_byte(b: u8) -> bool {
    b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-')
}
