#![no_main]

use arbitrary::Arbitrary;
use jsonmill::{parse, partition_bytes, StreamOptions, StreamingParser};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    payload: Vec<u8>,
    cuts: Vec<usize>,
    allow_multiple_values: bool,
}

// Drives arbitrary bytes through a streaming session in arbitrary chunk
// partitions. Nothing may panic, and on single-value streams of valid UTF-8
// the outcome must agree with the single-shot parser.
fuzz_target!(|input: Input| {
    let Input {
        payload,
        cuts,
        allow_multiple_values,
    } = input;

    let mut session = StreamingParser::new(StreamOptions {
        allow_multiple_values,
    });
    let mut streamed = Vec::new();
    let mut failed = false;
    for chunk in partition_bytes(&payload, &cuts) {
        match session.write(chunk) {
            Ok(values) => streamed.extend(values),
            Err(_) => {
                failed = true;
                break;
            }
        }
    }
    let ended = !failed
        && match session.end() {
            Ok(values) => {
                streamed.extend(values);
                true
            }
            Err(_) => false,
        };

    if allow_multiple_values {
        return;
    }
    let Ok(text) = std::str::from_utf8(&payload) else {
        return;
    };
    match parse(text) {
        Ok(value) => {
            assert!(ended, "single-shot accepted {text:?} but streaming failed");
            assert_eq!(streamed, [value]);
        }
        Err(_) => {
            assert!(
                !ended || streamed.is_empty(),
                "single-shot rejected {text:?} but streaming produced a value"
            );
        }
    }
});
