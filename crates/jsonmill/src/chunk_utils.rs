//! Chunking helpers for exercising the streaming parser.

/// Split `payload` into approximately equal-sized chunks without
/// breaking UTF-8 code points.
///
/// # Panics
///
/// Panics if `parts` is zero.
#[must_use]
pub fn produce_chunks(payload: &str, parts: usize) -> Vec<&str> {
    assert!(parts > 0);
    let len = payload.len();
    let chunk_size = len.div_ceil(parts);
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < len {
        let mut end = usize::min(start + chunk_size, len);
        while end < len && !payload.is_char_boundary(end) {
            end += 1;
        }
        chunks.push(&payload[start..end]);
        start = end;
    }
    chunks
}

/// Split `payload` at the given cut offsets, in bytes.
///
/// Cuts are clamped to the payload length, sorted, and deduplicated; code
/// points may be split. Feeding the result to a
/// [`StreamingParser`](crate::StreamingParser) in order reproduces `payload`
/// exactly, which makes this the partition generator for chunking-equivalence
/// properties.
#[must_use]
pub fn partition_bytes<'p>(payload: &'p [u8], cuts: &[usize]) -> Vec<&'p [u8]> {
    let mut bounds: Vec<usize> = cuts
        .iter()
        .map(|&c| c.min(payload.len()))
        .chain([0, payload.len()])
        .collect();
    bounds.sort_unstable();
    bounds.dedup();
    bounds
        .windows(2)
        .map(|pair| &payload[pair[0]..pair[1]])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_respect_char_boundaries() {
        let payload = "[\"f😊o\",\"b🚀r\"]";
        let chunks = produce_chunks(payload, 5);
        let mut idx = 0;
        for chunk in &chunks {
            idx += chunk.len();
            assert!(payload.is_char_boundary(idx));
        }
        assert_eq!(chunks.concat(), payload);
    }

    #[test]
    fn partition_reassembles_exactly() {
        let payload = b"{\"a\":[1,2,3]}";
        let parts = partition_bytes(payload, &[3, 3, 99, 7, 0]);
        assert_eq!(parts.concat(), payload);
        assert_eq!(parts.len(), 3);
    }

    #[test]
    fn partition_with_no_cuts_is_whole_payload() {
        let payload = b"true";
        assert_eq!(partition_bytes(payload, &[]), [&payload[..]]);
    }
}
