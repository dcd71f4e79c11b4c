use rstest::rstest;

use crate::{parse, parse_with_pool, value_span, StringPool, Value, ValueKind};

#[test]
fn object_preserves_key_order() {
    let value = parse(r#"{"a":1,"b":"x"}"#).unwrap();
    let Value::Object(map) = &value else {
        panic!("expected object");
    };
    let keys: Vec<&str> = map.keys().map(|k| &**k).collect();
    assert_eq!(keys, ["a", "b"]);
    assert_eq!(map.get("a"), Some(&Value::Number(1.0)));
    assert_eq!(map.get("b"), Some(&Value::String("x".into())));
}

#[rstest]
#[case("null", Value::Null)]
#[case("true", Value::Boolean(true))]
#[case("false", Value::Boolean(false))]
#[case("0", Value::Number(0.0))]
#[case("42", Value::Number(42.0))]
#[case("-7", Value::Number(-7.0))]
#[case("10.25", Value::Number(10.25))]
#[case("1e3", Value::Number(1000.0))]
// Leading zeros are accepted; documented deviation from RFC 8259.
#[case("007", Value::Number(7.0))]
// 2^53: the largest integer that survives f64 exactly.
#[case("9007199254740992", Value::Number(9_007_199_254_740_992.0))]
#[case(r#""""#, Value::String("".into()))]
#[case(r#""plain""#, Value::String("plain".into()))]
#[case(r#""a\"b\\c\/d""#, Value::String("a\"b\\c/d".into()))]
#[case(r#""\b\f\n\r\t""#, Value::String("\u{8}\u{c}\n\r\t".into()))]
#[case(r#""Aé""#, Value::String("Aé".into()))]
// UTF-16 surrogate pair.
#[case(r#""😀""#, Value::String("😀".into()))]
#[case("[]", Value::Array(vec![]))]
#[case("[1,2]", Value::Array(vec![Value::Number(1.0), Value::Number(2.0)]))]
#[case("{}", Value::Object(crate::Map::new()))]
#[case(" \t\r\n null \t", Value::Null)]
fn parses_to_expected_value(#[case] src: &str, #[case] expected: Value) {
    assert_eq!(parse(src).unwrap(), expected);
}

#[test]
fn small_exponents_are_close() {
    let Value::Number(n) = parse("2.5e-1").unwrap() else {
        panic!("expected number");
    };
    assert!((n - 0.25).abs() < 1e-15);
    let Value::Number(n) = parse("-1E2").unwrap() else {
        panic!("expected number");
    };
    assert!((n + 100.0).abs() < 1e-12);
}

#[test]
fn nested_containers() {
    let value = parse(r#"{"a":[1,{"b":[true,null]}],"c":{"d":"e"}}"#).unwrap();
    let Value::Object(map) = &value else {
        panic!("expected object");
    };
    let Some(Value::Array(a)) = map.get("a") else {
        panic!("expected array at a");
    };
    assert_eq!(a.len(), 2);
    let Value::Object(inner) = &a[1] else {
        panic!("expected object at a[1]");
    };
    assert_eq!(
        inner.get("b"),
        Some(&Value::Array(vec![Value::Boolean(true), Value::Null]))
    );
}

#[test]
fn duplicate_keys_last_value_wins_first_position_kept() {
    let value = parse(r#"{"a":1,"b":2,"a":3}"#).unwrap();
    let Value::Object(map) = &value else {
        panic!("expected object");
    };
    let keys: Vec<&str> = map.keys().map(|k| &**k).collect();
    assert_eq!(keys, ["a", "b"]);
    assert_eq!(map.get("a"), Some(&Value::Number(3.0)));
}

#[test]
fn deep_but_legal_nesting() {
    let depth = 100;
    let src = format!("{}1{}", "[".repeat(depth), "]".repeat(depth));
    assert!(parse(&src).is_ok());
}

#[test]
fn shared_pool_interns_across_documents() {
    let mut pool = StringPool::new();
    let a = parse_with_pool(r#"{"id":"x"}"#, &mut pool).unwrap();
    let b = parse_with_pool(r#"{"id":"y"}"#, &mut pool).unwrap();
    let (Value::Object(ma), Value::Object(mb)) = (&a, &b) else {
        panic!("expected objects");
    };
    assert!(std::sync::Arc::ptr_eq(
        ma.keys().next().unwrap(),
        mb.keys().next().unwrap()
    ));
}

#[rstest]
#[case("null", ValueKind::Null, 0, 4)]
#[case("  true ", ValueKind::Boolean, 2, 6)]
#[case("-12.5e2,", ValueKind::Number, 0, 7)]
#[case(r#""ab\"c" "#, ValueKind::String, 0, 7)]
#[case(r#"[1,[2],"x"] tail"#, ValueKind::Array, 0, 11)]
#[case(r#" {"a":{"b":[]}}"#, ValueKind::Object, 1, 15)]
fn spans_report_kind_and_extent(
    #[case] src: &str,
    #[case] kind: ValueKind,
    #[case] start: usize,
    #[case] end: usize,
) {
    let span = value_span(src, 0).unwrap();
    assert_eq!((span.kind, span.start, span.end), (kind, start, end));
}

#[test]
fn span_scan_from_interior_offset() {
    let src = r#"{"a":1}   [2]"#;
    let first = value_span(src, 0).unwrap();
    assert_eq!(first.kind, ValueKind::Object);
    let second = value_span(src, first.end).unwrap();
    assert_eq!((second.kind, second.start, second.end), (ValueKind::Array, 10, 13));
}

#[test]
fn span_scan_does_not_validate_escape_payloads() {
    // The escape is nonsense, but the string's extent is well-defined; the
    // materializing parse is the one that rejects it.
    let src = r#""a\qb""#;
    let span = value_span(src, 0).unwrap();
    assert_eq!((span.start, span.end), (0, 6));
    assert!(parse(src).is_err());
}
