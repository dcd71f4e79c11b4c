//! Single-shot JSON parsing.
//!
//! Two surfaces share one grammar:
//!
//! - [`parse`] / [`parse_with_pool`] materialize a [`Value`] tree, interning
//!   every string value and object key as the node is created, so a finished
//!   tree never needs a re-keying pass.
//! - [`value_span`] reports the `[start, end)` extent and type tag of the
//!   next value without materializing anything, for callers that extract
//!   substrings themselves. Like the span layer it mirrors, it verifies
//!   structure and number shape but not string escape payloads.
//!
//! The parser is a pure function over `(buffer, cursor)`; all allocation
//! happens in the produced tree and the intern pool.

use std::sync::Arc;

use crate::{
    error::{ErrorCode, ParseError},
    intern::StringPool,
    scan,
    value::{Map, Value},
};

/// Type tag carried by a [`ParseSpan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// The `null` literal.
    Null,
    /// `true` or `false`.
    Boolean,
    /// A number token.
    Number,
    /// A string literal.
    String,
    /// An array.
    Array,
    /// An object.
    Object,
}

/// Half-open byte range `[start, end)` of one value within an input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseSpan {
    /// The type of the spanned value.
    pub kind: ValueKind,
    /// Byte offset of the value's first byte.
    pub start: usize,
    /// Byte offset one past the value's last byte.
    pub end: usize,
}

/// Nesting depth at which container parsing gives up; the rejecting
/// container reports itself as invalid.
const MAX_DEPTH: usize = 128;

/// Parses a complete JSON document into a [`Value`].
///
/// Exactly one top-level value is accepted: leading and trailing JSON
/// whitespace (space, tab, line feed, carriage return) is skipped, any other
/// trailing byte is [`ErrorCode::InvalidToken`], and an empty or truncated
/// document is [`ErrorCode::UnexpectedEof`].
///
/// Numbers are `f64`: integer literals beyond 2^53 lose precision, leading
/// zeros are accepted (a deliberate deviation from RFC 8259), and a literal
/// whose magnitude overflows `f64` is [`ErrorCode::InvalidNumber`], so
/// parsed trees never hold NaN or infinities.
///
/// # Errors
///
/// Returns the [`ParseError`] of the first failing parse step.
pub fn parse(text: &str) -> Result<Value, ParseError> {
    let mut pool = StringPool::new();
    parse_with_pool(text, &mut pool)
}

/// Like [`parse`], but interns string content and object keys against the
/// caller's pool, so equal strings across documents share one allocation.
///
/// # Errors
///
/// Returns the [`ParseError`] of the first failing parse step.
pub fn parse_with_pool(text: &str, pool: &mut StringPool) -> Result<Value, ParseError> {
    let mut parser = Parser {
        text,
        buf: text.as_bytes(),
        pos: 0,
        pool,
    };
    parser.skip_ws();
    if parser.at_end() {
        return Err(parser.error(ErrorCode::UnexpectedEof));
    }
    let value = parser.parse_value(0)?;
    parser.skip_ws();
    if !parser.at_end() {
        return Err(parser.error(ErrorCode::InvalidToken));
    }
    Ok(value)
}

/// Scans the span of the next value at or after `start`.
///
/// # Errors
///
/// Returns the [`ParseError`] of the first failing scan step.
pub fn value_span(text: &str, start: usize) -> Result<ParseSpan, ParseError> {
    let mut scanner = SpanScanner {
        buf: text.as_bytes(),
        pos: start,
    };
    scanner.pos = skip_ws_from(scanner.buf, scanner.pos);
    scanner.scan_value(0)
}

#[inline]
fn skip_ws_from(buf: &[u8], mut pos: usize) -> usize {
    while pos < buf.len() && matches!(buf[pos], b' ' | b'\t' | b'\n' | b'\r') {
        pos += 1;
    }
    pos
}

/// Matches `true`/`false`/`null` at `start`. Any mismatch, including
/// truncation, is `InvalidToken`.
fn literal_token(buf: &[u8], start: usize) -> Result<(usize, Value), ParseError> {
    let rest = &buf[start..];
    for (text, value) in [
        (&b"true"[..], Value::Boolean(true)),
        (&b"false"[..], Value::Boolean(false)),
        (&b"null"[..], Value::Null),
    ] {
        if rest.starts_with(text) {
            return Ok((start + text.len(), value));
        }
    }
    Err(ParseError::new(ErrorCode::InvalidToken, start))
}

/// Parses a number token at `start`, returning its end offset and value.
///
/// Grammar: optional `-`, integer digit run, optional `.` + fraction run,
/// optional `e`/`E` + optional sign + exponent run. The token must not be
/// followed by another number-ish byte; `1.2.3` fails here as
/// `InvalidNumber` rather than surviving to the trailing-garbage check.
/// A literal whose magnitude overflows `f64` (such as `1e400`) is also
/// `InvalidNumber`: trees never hold NaN or infinities. Underflow to zero
/// is accepted.
fn number_token(buf: &[u8], start: usize) -> Result<(usize, f64), ParseError> {
    let len = buf.len();
    let invalid = Err(ParseError::new(ErrorCode::InvalidNumber, start));

    let mut pos = start;
    let negative = buf[pos] == b'-';
    if negative {
        pos += 1;
    }

    let (int_len, int_part) = scan::classify_digit_run(buf, pos, len);
    if int_len == 0 {
        return invalid;
    }
    pos += int_len;
    let mut value = int_part;

    if pos < len && buf[pos] == b'.' {
        pos += 1;
        let (frac_len, frac_part) = scan::classify_digit_run(buf, pos, len);
        if frac_len == 0 {
            return invalid;
        }
        pos += frac_len;
        let places = i32::try_from(frac_len).unwrap_or(i32::MAX);
        value += frac_part / 10.0_f64.powi(places);
    }

    if pos < len && matches!(buf[pos], b'e' | b'E') {
        pos += 1;
        let mut exp_sign = 1.0_f64;
        if pos < len && matches!(buf[pos], b'+' | b'-') {
            if buf[pos] == b'-' {
                exp_sign = -1.0;
            }
            pos += 1;
        }
        let (exp_len, exp_part) = scan::classify_digit_run(buf, pos, len);
        if exp_len == 0 {
            return invalid;
        }
        pos += exp_len;
        value *= 10.0_f64.powf(exp_sign * exp_part);
    }

    if pos < len && (buf[pos].is_ascii_digit() || matches!(buf[pos], b'.' | b'e' | b'E')) {
        return invalid;
    }

    // Overflow surfaces as an infinity, or as NaN when an overflowing
    // mantissa meets a large negative exponent (inf * 0).
    if !value.is_finite() {
        return invalid;
    }

    Ok((pos, if negative { -value } else { value }))
}

/// Finds the end of the string token whose opening quote sits at `start`,
/// returning the offset one past the closing quote.
fn string_token(buf: &[u8], start: usize) -> Result<usize, ParseError> {
    match scan::find_unescaped_quote(buf, start + 1, buf.len()) {
        Some(quote) => Ok(quote + 1),
        None => Err(ParseError::new(ErrorCode::UnterminatedString, start)),
    }
}

struct Parser<'a, 'p> {
    text: &'a str,
    buf: &'a [u8],
    pos: usize,
    pool: &'p mut StringPool,
}

impl Parser<'_, '_> {
    #[inline]
    fn at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    #[inline]
    fn skip_ws(&mut self) {
        self.pos = skip_ws_from(self.buf, self.pos);
    }

    #[inline]
    fn error(&self, code: ErrorCode) -> ParseError {
        ParseError::new(code, self.pos)
    }

    fn parse_value(&mut self, depth: usize) -> Result<Value, ParseError> {
        match self.buf[self.pos] {
            b'"' => {
                let end = string_token(self.buf, self.pos)?;
                let content = self.unescape(self.pos + 1, end - 1)?;
                self.pos = end;
                Ok(Value::String(content))
            }
            b't' | b'f' | b'n' => {
                let (end, value) = literal_token(self.buf, self.pos)?;
                self.pos = end;
                Ok(value)
            }
            b'-' | b'0'..=b'9' => {
                let (end, value) = number_token(self.buf, self.pos)?;
                self.pos = end;
                Ok(Value::Number(value))
            }
            b'[' => self.parse_array(depth),
            b'{' => self.parse_object(depth),
            _ => Err(self.error(ErrorCode::InvalidToken)),
        }
    }

    fn parse_array(&mut self, depth: usize) -> Result<Value, ParseError> {
        if depth >= MAX_DEPTH {
            return Err(self.error(ErrorCode::InvalidArray));
        }
        self.pos += 1; // consume '['
        self.skip_ws();
        let mut items = Vec::new();
        if !self.at_end() && self.buf[self.pos] == b']' {
            self.pos += 1;
            return Ok(Value::Array(items));
        }
        loop {
            if self.at_end() {
                return Err(self.error(ErrorCode::UnexpectedEof));
            }
            if matches!(self.buf[self.pos], b']' | b',') {
                // A separator (or the opening bracket) with no value after it.
                return Err(self.error(ErrorCode::InvalidArray));
            }
            items.push(self.parse_value(depth + 1)?);
            self.skip_ws();
            match self.buf.get(self.pos).copied() {
                Some(b',') => {
                    self.pos += 1;
                    self.skip_ws();
                }
                Some(b']') => {
                    self.pos += 1;
                    return Ok(Value::Array(items));
                }
                Some(_) => return Err(self.error(ErrorCode::InvalidArray)),
                None => return Err(self.error(ErrorCode::UnexpectedEof)),
            }
        }
    }

    fn parse_object(&mut self, depth: usize) -> Result<Value, ParseError> {
        if depth >= MAX_DEPTH {
            return Err(self.error(ErrorCode::InvalidObject));
        }
        self.pos += 1; // consume '{'
        self.skip_ws();
        let mut map = Map::new();
        if !self.at_end() && self.buf[self.pos] == b'}' {
            self.pos += 1;
            return Ok(Value::Object(map));
        }
        loop {
            match self.buf.get(self.pos).copied() {
                None => return Err(self.error(ErrorCode::UnexpectedEof)),
                Some(b'"') => {}
                Some(_) => return Err(self.error(ErrorCode::InvalidObject)),
            }
            let key_end = string_token(self.buf, self.pos)?;
            let key = self.unescape(self.pos + 1, key_end - 1)?;
            self.pos = key_end;
            self.skip_ws();
            match self.buf.get(self.pos).copied() {
                Some(b':') => self.pos += 1,
                Some(_) => return Err(self.error(ErrorCode::InvalidObject)),
                None => return Err(self.error(ErrorCode::UnexpectedEof)),
            }
            self.skip_ws();
            if self.at_end() {
                return Err(self.error(ErrorCode::UnexpectedEof));
            }
            if matches!(self.buf[self.pos], b'}' | b',') {
                // A colon with no value after it.
                return Err(self.error(ErrorCode::InvalidObject));
            }
            let value = self.parse_value(depth + 1)?;
            // Last value wins for a repeated key; the key keeps its first
            // position.
            map.insert(key, value);
            self.skip_ws();
            match self.buf.get(self.pos).copied() {
                Some(b',') => {
                    self.pos += 1;
                    self.skip_ws();
                }
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(Value::Object(map));
                }
                Some(_) => return Err(self.error(ErrorCode::InvalidObject)),
                None => return Err(self.error(ErrorCode::UnexpectedEof)),
            }
        }
    }

    /// Decodes the raw string content `text[start..end]` (between the
    /// quotes), interning the result.
    fn unescape(&mut self, start: usize, end: usize) -> Result<Arc<str>, ParseError> {
        let content = &self.text[start..end];
        let bytes = content.as_bytes();

        // Fast path: no escapes and no control bytes, intern the slice as-is.
        if !bytes.iter().any(|&b| b == b'\\' || b < 0x20) {
            return Ok(self.pool.intern(content));
        }

        let mut out = String::with_capacity(content.len());
        let mut run_start = 0;
        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            if b < 0x20 {
                return Err(ParseError::new(ErrorCode::InvalidString, start + i));
            }
            if b != b'\\' {
                i += 1;
                continue;
            }
            out.push_str(&content[run_start..i]);
            let invalid = Err(ParseError::new(ErrorCode::InvalidString, start + i));
            let Some(&esc) = bytes.get(i + 1) else {
                return invalid;
            };
            i += 2;
            match esc {
                b'"' => out.push('"'),
                b'\\' => out.push('\\'),
                b'/' => out.push('/'),
                b'b' => out.push('\u{0008}'),
                b'f' => out.push('\u{000C}'),
                b'n' => out.push('\n'),
                b'r' => out.push('\r'),
                b't' => out.push('\t'),
                b'u' => {
                    let Some(first) = hex4(bytes, i) else {
                        return invalid;
                    };
                    i += 4;
                    let code = if (0xD800..0xDC00).contains(&first) {
                        // High surrogate: a low surrogate escape must follow.
                        if bytes.get(i) != Some(&b'\\') || bytes.get(i + 1) != Some(&b'u') {
                            return invalid;
                        }
                        let Some(low) = hex4(bytes, i + 2) else {
                            return invalid;
                        };
                        if !(0xDC00..0xE000).contains(&low) {
                            return invalid;
                        }
                        i += 6;
                        0x10000 + ((first - 0xD800) << 10) + (low - 0xDC00)
                    } else {
                        first
                    };
                    let Some(ch) = char::from_u32(code) else {
                        return invalid;
                    };
                    out.push(ch);
                }
                _ => return invalid,
            }
            run_start = i;
        }
        out.push_str(&content[run_start..]);
        Ok(self.pool.intern(&out))
    }
}

/// Reads four ASCII hex digits at `pos`.
fn hex4(bytes: &[u8], pos: usize) -> Option<u32> {
    if pos + 4 > bytes.len() {
        return None;
    }
    let mut code = 0_u32;
    for &b in &bytes[pos..pos + 4] {
        code = (code << 4) | (b as char).to_digit(16)?;
    }
    Some(code)
}

struct SpanScanner<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl SpanScanner<'_> {
    fn scan_value(&mut self, depth: usize) -> Result<ParseSpan, ParseError> {
        let start = self.pos;
        let Some(&b) = self.buf.get(start) else {
            return Err(ParseError::new(ErrorCode::UnexpectedEof, start));
        };
        let kind = match b {
            b'"' => {
                self.pos = string_token(self.buf, start)?;
                ValueKind::String
            }
            b't' | b'f' | b'n' => {
                let (end, value) = literal_token(self.buf, start)?;
                self.pos = end;
                if value.is_null() {
                    ValueKind::Null
                } else {
                    ValueKind::Boolean
                }
            }
            b'-' | b'0'..=b'9' => {
                let (end, _) = number_token(self.buf, start)?;
                self.pos = end;
                ValueKind::Number
            }
            b'[' => {
                self.scan_array(depth)?;
                ValueKind::Array
            }
            b'{' => {
                self.scan_object(depth)?;
                ValueKind::Object
            }
            _ => return Err(ParseError::new(ErrorCode::InvalidToken, start)),
        };
        Ok(ParseSpan {
            kind,
            start,
            end: self.pos,
        })
    }

    fn scan_array(&mut self, depth: usize) -> Result<(), ParseError> {
        if depth >= MAX_DEPTH {
            return Err(ParseError::new(ErrorCode::InvalidArray, self.pos));
        }
        self.pos = skip_ws_from(self.buf, self.pos + 1);
        if self.buf.get(self.pos) == Some(&b']') {
            self.pos += 1;
            return Ok(());
        }
        loop {
            if matches!(self.buf.get(self.pos).copied(), Some(b']' | b',')) {
                return Err(ParseError::new(ErrorCode::InvalidArray, self.pos));
            }
            self.scan_value(depth + 1)?;
            self.pos = skip_ws_from(self.buf, self.pos);
            match self.buf.get(self.pos).copied() {
                Some(b',') => self.pos = skip_ws_from(self.buf, self.pos + 1),
                Some(b']') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(_) => return Err(ParseError::new(ErrorCode::InvalidArray, self.pos)),
                None => return Err(ParseError::new(ErrorCode::UnexpectedEof, self.pos)),
            }
        }
    }

    fn scan_object(&mut self, depth: usize) -> Result<(), ParseError> {
        if depth >= MAX_DEPTH {
            return Err(ParseError::new(ErrorCode::InvalidObject, self.pos));
        }
        self.pos = skip_ws_from(self.buf, self.pos + 1);
        if self.buf.get(self.pos) == Some(&b'}') {
            self.pos += 1;
            return Ok(());
        }
        loop {
            match self.buf.get(self.pos).copied() {
                Some(b'"') => self.pos = string_token(self.buf, self.pos)?,
                Some(_) => return Err(ParseError::new(ErrorCode::InvalidObject, self.pos)),
                None => return Err(ParseError::new(ErrorCode::UnexpectedEof, self.pos)),
            }
            self.pos = skip_ws_from(self.buf, self.pos);
            match self.buf.get(self.pos).copied() {
                Some(b':') => self.pos = skip_ws_from(self.buf, self.pos + 1),
                Some(_) => return Err(ParseError::new(ErrorCode::InvalidObject, self.pos)),
                None => return Err(ParseError::new(ErrorCode::UnexpectedEof, self.pos)),
            }
            if self.pos >= self.buf.len() {
                return Err(ParseError::new(ErrorCode::UnexpectedEof, self.pos));
            }
            if matches!(self.buf[self.pos], b'}' | b',') {
                return Err(ParseError::new(ErrorCode::InvalidObject, self.pos));
            }
            self.scan_value(depth + 1)?;
            self.pos = skip_ws_from(self.buf, self.pos);
            match self.buf.get(self.pos).copied() {
                Some(b',') => self.pos = skip_ws_from(self.buf, self.pos + 1),
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(_) => return Err(ParseError::new(ErrorCode::InvalidObject, self.pos)),
                None => return Err(ParseError::new(ErrorCode::UnexpectedEof, self.pos)),
            }
        }
    }
}
