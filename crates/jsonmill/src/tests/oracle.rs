//! Cross-checks against `serde_json` on documents both parsers accept.

use crate::{parse, Value};

/// Structural comparison with tolerance on numbers; `serde_json` is built
/// with `preserve_order`, so key order is compared too.
fn assert_same(ours: &Value, theirs: &serde_json::Value) {
    match (ours, theirs) {
        (Value::Null, serde_json::Value::Null) => {}
        (Value::Boolean(a), serde_json::Value::Bool(b)) => assert_eq!(a, b),
        (Value::Number(a), serde_json::Value::Number(b)) => {
            let b = b.as_f64().expect("finite JSON number");
            assert!(
                (a - b).abs() <= 1e-9 * b.abs().max(1.0),
                "number mismatch: {a} vs {b}"
            );
        }
        (Value::String(a), serde_json::Value::String(b)) => assert_eq!(&**a, b),
        (Value::Array(a), serde_json::Value::Array(b)) => {
            assert_eq!(a.len(), b.len());
            for (x, y) in a.iter().zip(b) {
                assert_same(x, y);
            }
        }
        (Value::Object(a), serde_json::Value::Object(b)) => {
            assert_eq!(a.len(), b.len());
            for ((ka, va), (kb, vb)) in a.iter().zip(b) {
                assert_eq!(&**ka, kb);
                assert_same(va, vb);
            }
        }
        (ours, theirs) => panic!("shape mismatch: {ours:?} vs {theirs:?}"),
    }
}

#[test]
fn agrees_with_serde_json() {
    let docs = [
        "null",
        "true",
        "[]",
        "{}",
        "0",
        "-17",
        "3.625",
        "1e3",
        "6.02e23",
        r#""""#,
        r#""héllo \"there\" é 😀\n""#,
        r#"[1,[2,[3,[4]]],"x",null,false]"#,
        r#"{"a":1,"b":"x"}"#,
        r#"{"outer":{"inner":[{"k":true},{"k":false}],"n":-0.5}}"#,
        " \t{\"spaced\" : [ 1 , 2 ] }\n",
    ];
    for doc in docs {
        let ours = parse(doc).unwrap();
        let theirs: serde_json::Value = serde_json::from_str(doc).unwrap();
        assert_same(&ours, &theirs);
    }
}

#[test]
fn display_output_is_valid_json() {
    let docs = [
        r#"{"a":[1,2.5,"x\"y "],"b":null}"#,
        r#""control \u0001 char""#,
        r#"[true,false,{"k":"v"}]"#,
    ];
    for doc in docs {
        let ours = parse(doc).unwrap();
        let rendered = ours.to_string();
        let reparsed: serde_json::Value = serde_json::from_str(&rendered)
            .unwrap_or_else(|err| panic!("{rendered:?} is not valid JSON: {err}"));
        assert_same(&ours, &reparsed);
    }
}
