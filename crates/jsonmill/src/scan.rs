//! Vectorized structural-byte scanning.
//!
//! The scanners walk the input in 16-byte lanes and compute per-lane match
//! bitmasks with SWAR arithmetic (two 64-bit words per lane), so a lane that
//! contains no interesting byte is skipped in a couple of ALU operations.
//! Every lane routine has a scalar twin that produces byte-identical results
//! on any input and platform; the lane path falls back to it for lane tails
//! and whenever exact escape bookkeeping is needed. The scalar twins double
//! as the equivalence oracle in tests.

/// Lane width in bytes.
const LANE: usize = 16;

const LO: u64 = 0x0101_0101_0101_0101;
const HI: u64 = 0x8080_8080_8080_8080;

#[inline]
fn splat(b: u8) -> u64 {
    u64::from(b) * LO
}

/// High bit set in every byte of `word` equal to `b`.
///
/// The classic zero-byte test: false positives can only appear in bytes
/// *above* a true match (borrow propagation), so the mask is exact as a
/// "no match at all" predicate and its lowest set bit always marks a true
/// match.
#[inline]
fn eq_hi(word: u64, b: u8) -> u64 {
    let x = word ^ splat(b);
    x.wrapping_sub(LO) & !x & HI
}

/// Gathers the per-byte high bits of `hi` into the low 8 bits.
#[inline]
fn movemask(hi: u64) -> u16 {
    (((hi >> 7).wrapping_mul(0x0102_0408_1020_4080)) >> 56) as u16
}

#[inline]
fn load(lane: &[u8]) -> (u64, u64) {
    debug_assert!(lane.len() >= LANE);
    let lo = u64::from_le_bytes(lane[..8].try_into().expect("lane is 16 bytes"));
    let hi = u64::from_le_bytes(lane[8..16].try_into().expect("lane is 16 bytes"));
    (lo, hi)
}

/// Bitmask of bytes in the lane equal to `b`; bit `i` corresponds to byte `i`.
#[inline]
fn lane_eq(lane: &[u8], b: u8) -> u16 {
    let (lo, hi) = load(lane);
    movemask(eq_hi(lo, b)) | movemask(eq_hi(hi, b)) << 8
}

/// Bitmask of ASCII digit bytes (`0x30..=0x39`) in the lane.
///
/// Exact: the high-nibble comparison cannot produce borrow artifacts (the
/// xored bytes are multiples of 0x10) and the low-nibble range check adds at
/// most 0x85 per byte, so no carry crosses byte boundaries.
#[inline]
fn lane_digits(lane: &[u8]) -> u16 {
    #[inline]
    fn half(word: u64) -> u64 {
        let high_nibble_is_3 = eq_hi(word & 0xF0F0_F0F0_F0F0_F0F0, 0x30);
        let low_nibble_ge_10 = (word & 0x0F0F_0F0F_0F0F_0F0F).wrapping_add(splat(0x76)) & HI;
        high_nibble_is_3 & !low_nibble_ge_10
    }
    let (lo, hi) = load(lane);
    movemask(half(lo)) | movemask(half(hi)) << 8
}

/// Finds the next quote byte in `buf[start..end]` that is not preceded by an
/// odd number of consecutive escape bytes, processing 16-byte lanes.
///
/// A lane with neither quotes nor escapes is skipped whole; a lane with
/// quotes but no escapes (and no escape pending from the previous lane)
/// resolves directly from the quote bitmask; any lane containing escapes is
/// resolved by local scalar inspection so that runs of consecutive
/// backslashes keep exact parity.
#[must_use]
pub fn find_unescaped_quote(buf: &[u8], start: usize, end: usize) -> Option<usize> {
    let end = end.min(buf.len());
    if start >= end {
        return None;
    }

    let mut i = start;
    let mut pending_escape = false;
    while i + LANE <= end {
        let lane = &buf[i..i + LANE];
        let quotes = lane_eq(lane, b'"');
        let escapes = lane_eq(lane, b'\\');

        if !pending_escape && escapes == 0 {
            if quotes != 0 {
                return Some(i + quotes.trailing_zeros() as usize);
            }
            i += LANE;
            continue;
        }
        if quotes == 0 && escapes == 0 {
            // The pending escape consumed the lane's first byte; the rest is
            // plain content.
            pending_escape = false;
            i += LANE;
            continue;
        }

        for (j, &b) in lane.iter().enumerate() {
            if pending_escape {
                pending_escape = false;
            } else if b == b'\\' {
                pending_escape = true;
            } else if b == b'"' {
                return Some(i + j);
            }
        }
        i += LANE;
    }

    scalar_quote_from(buf, i, end, pending_escape)
}

/// Scalar fallback for [`find_unescaped_quote`]; byte-identical results.
#[must_use]
pub fn find_unescaped_quote_scalar(buf: &[u8], start: usize, end: usize) -> Option<usize> {
    scalar_quote_from(buf, start, end.min(buf.len()), false)
}

fn scalar_quote_from(
    buf: &[u8],
    start: usize,
    end: usize,
    mut pending_escape: bool,
) -> Option<usize> {
    for (i, &b) in buf.iter().enumerate().take(end).skip(start) {
        if pending_escape {
            pending_escape = false;
        } else if b == b'\\' {
            pending_escape = true;
        } else if b == b'"' {
            return Some(i);
        }
    }
    None
}

/// Measures the leading ASCII-digit run of `buf[start..end]` and accumulates
/// its decimal value in double precision.
///
/// The lane path vectorizes digit *detection* only; accumulation is the same
/// `acc * 10 + digit` recurrence as the scalar twin, in the same order, so
/// the returned value is bit-identical on every path. Integer runs beyond
/// 2^53 lose precision, an accepted consequence of representing JSON
/// numbers as `f64`.
#[must_use]
pub fn classify_digit_run(buf: &[u8], start: usize, end: usize) -> (usize, f64) {
    let end = end.min(buf.len());
    let mut i = start;
    let mut acc = 0.0_f64;

    while i + LANE <= end {
        let lane = &buf[i..i + LANE];
        let digits = lane_digits(lane);
        let run = (!digits).trailing_zeros() as usize;
        for &b in &lane[..run] {
            acc = acc * 10.0 + f64::from(b - b'0');
        }
        i += run;
        if run < LANE {
            return (i - start, acc);
        }
    }

    while i < end && buf[i].is_ascii_digit() {
        acc = acc * 10.0 + f64::from(buf[i] - b'0');
        i += 1;
    }
    (i - start, acc)
}

/// Scalar fallback for [`classify_digit_run`]; byte-identical results.
#[must_use]
pub fn classify_digit_run_scalar(buf: &[u8], start: usize, end: usize) -> (usize, f64) {
    let end = end.min(buf.len());
    let mut i = start;
    let mut acc = 0.0_f64;
    while i < end && buf[i].is_ascii_digit() {
        acc = acc * 10.0 + f64::from(buf[i] - b'0');
        i += 1;
    }
    (i - start, acc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_in_short_input() {
        assert_eq!(find_unescaped_quote(b"abc\"", 0, 4), Some(3));
        assert_eq!(find_unescaped_quote(b"abc", 0, 3), None);
    }

    #[test]
    fn escaped_quote_is_skipped() {
        assert_eq!(find_unescaped_quote(br#"a\"b""#, 0, 5), Some(4));
    }

    #[test]
    fn double_escape_does_not_mask_quote() {
        // \\ is a complete escape; the quote after it terminates.
        assert_eq!(find_unescaped_quote(br#"a\\"x"#, 0, 5), Some(3));
        // \\\" is an escaped backslash followed by an escaped quote.
        assert_eq!(find_unescaped_quote(br#"\\\"x"#, 0, 5), None);
    }

    #[test]
    fn quote_beyond_first_lane() {
        let mut buf = vec![b'x'; 40];
        buf[37] = b'"';
        assert_eq!(find_unescaped_quote(&buf, 0, 40), Some(37));
    }

    #[test]
    fn escape_straddles_lane_boundary() {
        // Backslash at byte 15, quote at byte 16: the escape carries into the
        // next lane.
        let mut buf = vec![b'x'; 48];
        buf[15] = b'\\';
        buf[16] = b'"';
        buf[30] = b'"';
        assert_eq!(find_unescaped_quote(&buf, 0, 48), Some(30));
        assert_eq!(
            find_unescaped_quote(&buf, 0, 48),
            find_unescaped_quote_scalar(&buf, 0, 48)
        );
    }

    #[test]
    fn backslash_run_straddling_lanes_keeps_parity() {
        let mut buf = vec![b'a'; 64];
        // Ten consecutive backslashes spanning the first lane boundary.
        for slot in buf.iter_mut().take(22).skip(12) {
            *slot = b'\\';
        }
        buf[22] = b'"';
        // Even parity: the quote is unescaped.
        assert_eq!(find_unescaped_quote(&buf, 0, 64), Some(22));
        // Nine backslashes: odd parity, the quote is escaped.
        buf[12] = b'a';
        assert_eq!(find_unescaped_quote(&buf, 0, 64), None);
        assert_eq!(find_unescaped_quote_scalar(&buf, 0, 64), None);
    }

    #[test]
    fn digit_run_short() {
        assert_eq!(classify_digit_run(b"123x", 0, 4), (3, 123.0));
        assert_eq!(classify_digit_run(b"x123", 0, 4), (0, 0.0));
    }

    #[test]
    fn digit_run_across_lanes() {
        let src = b"12345678901234567890123x";
        let (len, value) = classify_digit_run(src, 0, src.len());
        assert_eq!(len, 23);
        let (scalar_len, scalar_value) = classify_digit_run_scalar(src, 0, src.len());
        assert_eq!(len, scalar_len);
        assert_eq!(value.to_bits(), scalar_value.to_bits());
    }

    #[test]
    fn digit_mask_rejects_neighbors() {
        // '/' = 0x2F and ':' = 0x3A bracket the digit range.
        assert_eq!(classify_digit_run(b"5/5:5555555555555", 0, 17).0, 1);
    }

    #[test]
    fn non_ascii_content_is_opaque() {
        let src = "héllo \"there\"".as_bytes();
        assert_eq!(
            find_unescaped_quote(src, 0, src.len()),
            find_unescaped_quote_scalar(src, 0, src.len())
        );
    }
}
