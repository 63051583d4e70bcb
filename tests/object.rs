//! Object accessor and builder tests.

use bose::{
    object_add, object_concat, prefix, value_equal, Bose, BoseBuf, DataType, HeapPool,
    ObjectBuilder, Pool, Scalar,
};

#[test]
fn test_object_accessors() {
    let bose = BoseBuf::parse(r#"{"key1": 123, "key2": true, "key3": null, "key4": [1], "key5": "abc"}"#)
        .unwrap();
    assert_eq!(bose.data_type().unwrap(), DataType::Object);

    let object = bose.object().unwrap();
    assert_eq!(object.len().unwrap(), 5);
    assert!(!object.is_empty().unwrap());

    assert_eq!(object.get("key1").unwrap().unwrap().integer().unwrap(), 123);
    assert!(object.get("key2").unwrap().unwrap().boolean().unwrap());
    assert!(object.get("key3").unwrap().unwrap().is_null().unwrap());
    assert_eq!(
        object.get("key4").unwrap().unwrap().data_type().unwrap(),
        DataType::Array
    );
    assert_eq!(object.get("key5").unwrap().unwrap().string().unwrap(), "abc");
    assert!(object.get("missing").unwrap().is_none());

    assert!(object.contains_key("key1").unwrap());
    assert!(!object.contains_key("key9").unwrap());

    let keys: Vec<String> = object.keys().unwrap().collect::<Result<_, _>>().unwrap();
    assert_eq!(keys, ["key1", "key2", "key3", "key4", "key5"]);

    let mut values = object.values().unwrap();
    assert_eq!(values.next().unwrap().unwrap().integer().unwrap(), 123);

    for entry in object.iter().unwrap() {
        let (key, value) = entry.unwrap();
        if key == "key5" {
            assert_eq!(value.string().unwrap(), "abc");
        }
    }
}

#[test]
fn test_property_counting() {
    let empty = Bose::new(&[prefix::OBJECT_0]).unwrap();
    assert_eq!(empty.object().unwrap().len().unwrap(), 0);
    assert!(empty.object().unwrap().is_empty().unwrap());

    let single = BoseBuf::parse(r#"{"value": 42}"#).unwrap();
    assert_eq!(single.object().unwrap().len().unwrap(), 1);

    // heterogeneous values count by scanning, not by the embedded hint
    let lying_hint: &[u8] = &[
        prefix::OBJECT_N,
        0x8B,
        0x87, // count hint says 7
        prefix::UTF8,
        0x81,
        b'a',
        0x81,
        prefix::UTF8,
        0x81,
        b'b',
        prefix::UTF8,
        0x81,
        b'x',
    ];
    let object = Bose::new(lying_hint).unwrap().object().unwrap();
    assert_eq!(object.len().unwrap(), 2);
}

#[test]
fn test_key_encoding_irrelevant() {
    // object with a UTF-16 encoded key
    let utf16_key: &[u8] = &[
        prefix::OBJECT,
        0x8D,
        prefix::UTF16,
        0x8A,
        0xFE,
        0xFF,
        0,
        b'k',
        0,
        b'i',
        0,
        b'n',
        0,
        b'd',
        0x81,
    ];
    let object = Bose::new(utf16_key).unwrap().object().unwrap();
    assert_eq!(object.get("kind").unwrap().unwrap().integer().unwrap(), 1);
    assert!(object.contains_key("kind").unwrap());
}

#[test]
fn test_object_add_new_key() {
    let mut pool = HeapPool::new();
    let object = BoseBuf::parse(r#"{"a": 1}"#).unwrap();
    let name = Scalar::string("b").unwrap();
    let value = Scalar::integer(2);

    let handle = object_add(&mut pool, object.as_bytes(), name.as_bytes(), value.as_bytes()).unwrap();
    let expected = BoseBuf::parse(r#"{"a": 1, "b": 2}"#).unwrap();
    assert!(value_equal(pool.data(handle).unwrap(), expected.as_bytes()).unwrap());
    pool.release(handle).unwrap();

    // binding into the empty object
    let handle = object_add(&mut pool, &[prefix::OBJECT_0], name.as_bytes(), value.as_bytes()).unwrap();
    let expected = BoseBuf::parse(r#"{"b": 2}"#).unwrap();
    assert!(value_equal(pool.data(handle).unwrap(), expected.as_bytes()).unwrap());
    pool.release(handle).unwrap();
}

#[test]
fn test_object_add_rebinds_existing_key() {
    let mut pool = HeapPool::new();
    let object = BoseBuf::parse(r#"{"a": 1, "b": 2}"#).unwrap();
    let name = Scalar::string("a").unwrap();
    let value = Scalar::integer(99);

    let handle = object_add(&mut pool, object.as_bytes(), name.as_bytes(), value.as_bytes()).unwrap();
    let bytes = pool.data(handle).unwrap();
    let rebound = Bose::new(&bytes[..value_len(bytes)]).unwrap();

    // last write wins and the stale binding is gone
    let view = rebound.object().unwrap();
    assert_eq!(view.len().unwrap(), 2);
    assert_eq!(view.get("a").unwrap().unwrap().integer().unwrap(), 99);
    assert_eq!(view.get("b").unwrap().unwrap().integer().unwrap(), 2);

    let expected = BoseBuf::parse(r#"{"a": 99, "b": 2}"#).unwrap();
    assert!(value_equal(rebound.as_bytes(), expected.as_bytes()).unwrap());
    pool.release(handle).unwrap();
}

#[test]
fn test_object_concat_right_wins() {
    let mut pool = HeapPool::new();
    let left = BoseBuf::parse(r#"{"a": 1, "b": 2}"#).unwrap();
    let right = BoseBuf::parse(r#"{"b": 20, "c": 30}"#).unwrap();

    let handle = object_concat(&mut pool, left.as_bytes(), right.as_bytes()).unwrap();
    let expected = BoseBuf::parse(r#"{"a": 1, "b": 20, "c": 30}"#).unwrap();
    assert!(value_equal(pool.data(handle).unwrap(), expected.as_bytes()).unwrap());
    pool.release(handle).unwrap();
}

#[test]
fn test_object_builder() {
    let mut builder = ObjectBuilder::new();
    builder.bind_integer("a", 1).unwrap();
    builder.bind_bool("b", true).unwrap();
    builder.bind_null("c").unwrap();
    builder.bind_string("d", "text").unwrap();
    builder.bind_value("e", &Scalar::integer(-1000)).unwrap();
    let bose = builder.finish().unwrap();

    let object = bose.object().unwrap();
    assert_eq!(object.len().unwrap(), 5);
    assert_eq!(object.get("e").unwrap().unwrap().integer().unwrap(), -1000);

    let expected = BoseBuf::parse(r#"{"a": 1, "b": true, "c": null, "d": "text", "e": -1000}"#).unwrap();
    assert!(value_equal(bose.as_bytes(), expected.as_bytes()).unwrap());
}

/// Encoded length of the value leading `bytes`.
fn value_len(bytes: &[u8]) -> usize {
    let mut memo = bose::MemoTable::new();
    let mut cursor = bose::Cursor::new(bytes);
    cursor.parse_value(&mut memo).unwrap();
    cursor.end
}
