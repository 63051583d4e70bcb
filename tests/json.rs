//! JSON interop and formatting tests.

use bose::{BoseBuf, BuildError, DataType};

#[test]
fn test_parse_scalars() {
    assert_eq!(BoseBuf::parse("null").unwrap().data_type().unwrap(), DataType::Null);
    assert!(BoseBuf::parse("true").unwrap().boolean().unwrap());
    assert_eq!(BoseBuf::parse("123").unwrap().integer().unwrap(), 123);
    assert_eq!(BoseBuf::parse("-123").unwrap().integer().unwrap(), -123);
    assert_eq!(BoseBuf::parse(r#""abc""#).unwrap().string().unwrap(), "abc");
}

#[test]
fn test_parse_rejects_floats() {
    assert!(matches!(
        BoseBuf::parse("1.5").unwrap_err(),
        BuildError::UnsupportedNumber(_)
    ));
    assert!(matches!(
        BoseBuf::parse("not json").unwrap_err(),
        BuildError::JsonError(_)
    ));
}

#[test]
fn test_compact_format_round_trip() {
    // keys chosen in sorted order so the formatted text matches the input
    let text = r#"{"a":1,"b":[true,null,"x"],"c":{"d":-5}}"#;
    let bose = BoseBuf::parse(text).unwrap();
    assert_eq!(bose.format(false).to_string(), text);
    assert_eq!(bose.to_string(), text);
}

#[test]
fn test_pretty_format() {
    let bose = BoseBuf::parse(r#"{"a": 1, "b": [true]}"#).unwrap();
    let expected = "{\n  \"a\": 1,\n  \"b\": [\n    true\n  ]\n}";
    assert_eq!(bose.format(true).to_string(), expected);

    let mut out = String::new();
    bose.format_to(true, &mut out).unwrap();
    assert_eq!(out, expected);
}

#[test]
fn test_format_escapes_strings() {
    let bose = BoseBuf::parse(r#"["quote \" backslash \\ newline \n"]"#).unwrap();
    assert_eq!(
        bose.to_string(),
        r#"["quote \" backslash \\ newline \n"]"#
    );
}

#[test]
fn test_to_json_round_trip() {
    let original: serde_json::Value =
        serde_json::from_str(r#"{"a": 1, "b": [true, null, "x"], "c": {"d": -5}}"#).unwrap();
    let bose = BoseBuf::try_from(&original).unwrap();
    assert_eq!(bose.to_json().unwrap(), original);
}

#[test]
fn test_large_unsigned_numbers() {
    let text = format!("[{}]", u64::MAX);
    let bose = BoseBuf::parse(&text).unwrap();
    assert_eq!(bose.to_string(), text);
    assert_eq!(
        bose.to_json().unwrap(),
        serde_json::from_str::<serde_json::Value>(&text).unwrap()
    );
}

#[test]
fn test_duplicate_keys_first_wins() {
    // built directly, since JSON text cannot carry duplicates portably
    let mut builder = bose::ObjectBuilder::new();
    builder.bind_integer("k", 1).unwrap();
    builder.bind_integer("k", 2).unwrap();
    let bose = builder.finish().unwrap();

    let json = bose.to_json().unwrap();
    assert_eq!(json, serde_json::json!({"k": 1}));
}

#[test]
fn test_empty_containers() {
    assert_eq!(BoseBuf::parse("[]").unwrap().to_string(), "[]");
    assert_eq!(BoseBuf::parse("{}").unwrap().to_string(), "{}");
    assert_eq!(BoseBuf::parse("[]").unwrap().array().unwrap().len().unwrap(), 0);
}
