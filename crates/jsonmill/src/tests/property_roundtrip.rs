use quickcheck::QuickCheck;

use crate::{parse, Value};

/// Numbers re-read from their decimal rendering may wobble in the last few
/// bits (accumulation is plain `f64` arithmetic); everything else must be
/// exact.
fn approx_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let scale = x.abs().max(y.abs()).max(1.0);
            (x - y).abs() <= 1e-9 * scale
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| approx_eq(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(ys)
                    .all(|((kx, x), (ky, y))| kx == ky && approx_eq(x, y))
        }
        (a, b) => a == b,
    }
}

/// Property: rendering any value tree and parsing it back reproduces the
/// tree, with keys in order, strings byte-for-byte, and numbers within
/// tolerance.
#[test]
fn render_parse_roundtrip_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(value: Value) -> bool {
        let rendered = value.to_string();
        match parse(&rendered) {
            Ok(reparsed) => approx_eq(&reparsed, &value),
            Err(_) => false,
        }
    }

    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    QuickCheck::new().tests(tests).quickcheck(prop as fn(Value) -> bool);
}
