//! Array accessor and builder tests.

use bose::{
    array_add, array_concat, prefix, value_equal, ArrayBuilder, Bose, BoseBuf, BoseError,
    DataType, HeapPool, Pool, Scalar,
};

fn literal_123() -> &'static [u8] {
    &[prefix::ARRAY, 0x83, 0x81, 0x82, 0x83] // [1, 2, 3]
}

#[test]
fn test_array_accessors() {
    let bose = BoseBuf::parse(r#"[123, "abc", null, false, [true], {"key": "value"}]"#).unwrap();
    assert_eq!(bose.data_type().unwrap(), DataType::Array);

    let array = bose.array().unwrap();
    assert_eq!(array.len().unwrap(), 6);
    assert!(!array.is_empty().unwrap());

    assert_eq!(array.get(0).unwrap().integer().unwrap(), 123);
    assert_eq!(array.get(1).unwrap().string().unwrap(), "abc");
    assert!(array.get(2).unwrap().is_null().unwrap());
    assert!(!array.get(3).unwrap().boolean().unwrap());
    assert_eq!(array.get(4).unwrap().data_type().unwrap(), DataType::Array);
    assert_eq!(array.get(5).unwrap().data_type().unwrap(), DataType::Object);

    let nested = array.get(4).unwrap().array().unwrap();
    assert!(nested.get(0).unwrap().boolean().unwrap());
    let object = array.get(5).unwrap().object().unwrap();
    assert_eq!(object.get("key").unwrap().unwrap().string().unwrap(), "value");

    assert!(matches!(
        array.get(10).unwrap_err(),
        BoseError::IndexOutOfBounds { len: 6, index: 10 }
    ));

    for (index, item) in array.iter().unwrap().enumerate() {
        let item = item.unwrap();
        if index == 0 {
            assert_eq!(item.integer().unwrap(), 123);
        } else if index == 1 {
            assert_eq!(item.string().unwrap(), "abc");
        }
    }
}

#[test]
fn test_empty_array() {
    let empty = Bose::new(&[prefix::ARRAY_0]).unwrap();
    let array = empty.array().unwrap();
    assert_eq!(array.len().unwrap(), 0);
    assert!(array.is_empty().unwrap());
    assert!(array.iter().unwrap().next().is_none());
    assert!(array.get(0).is_err());
}

#[test]
fn test_array_add_positions() {
    let mut pool = HeapPool::new();
    let zero = Scalar::integer(0);

    // insert at the front
    let handle = array_add(&mut pool, literal_123(), zero.as_bytes(), 0).unwrap();
    let expected = BoseBuf::parse("[0, 1, 2, 3]").unwrap();
    assert!(value_equal(pool.data(handle).unwrap(), expected.as_bytes()).unwrap());
    pool.release(handle).unwrap();

    // insert in the middle
    let handle = array_add(&mut pool, literal_123(), zero.as_bytes(), 2).unwrap();
    let expected = BoseBuf::parse("[1, 2, 0, 3]").unwrap();
    assert!(value_equal(pool.data(handle).unwrap(), expected.as_bytes()).unwrap());
    pool.release(handle).unwrap();

    // index == length appends
    let handle = array_add(&mut pool, literal_123(), zero.as_bytes(), 3).unwrap();
    let expected = BoseBuf::parse("[1, 2, 3, 0]").unwrap();
    assert!(value_equal(pool.data(handle).unwrap(), expected.as_bytes()).unwrap());
    pool.release(handle).unwrap();

    // index > length fails
    assert!(matches!(
        array_add(&mut pool, literal_123(), zero.as_bytes(), 4).unwrap_err(),
        BoseError::IndexOutOfBounds { len: 3, index: 4 }
    ));
}

#[test]
fn test_append_matches_literal() {
    let mut pool = HeapPool::new();
    let empty = Scalar::empty_array();

    let one = array_add(&mut pool, empty.as_bytes(), Scalar::integer(1).as_bytes(), 0).unwrap();
    let first = pool.data(one).unwrap().to_vec();
    let two = array_add(&mut pool, &first, Scalar::integer(2).as_bytes(), 1).unwrap();
    let second = pool.data(two).unwrap().to_vec();
    let three = array_add(&mut pool, &second, Scalar::integer(3).as_bytes(), 2).unwrap();

    assert!(value_equal(pool.data(three).unwrap(), literal_123()).unwrap());

    pool.release(one).unwrap();
    pool.release(two).unwrap();
    pool.release(three).unwrap();
}

#[test]
fn test_array_concat() {
    let mut pool = HeapPool::new();
    let left = BoseBuf::parse("[1, 2]").unwrap();
    let right = BoseBuf::parse("[3]").unwrap();

    let handle = array_concat(&mut pool, left.as_bytes(), right.as_bytes()).unwrap();
    assert!(value_equal(pool.data(handle).unwrap(), literal_123()).unwrap());
    pool.release(handle).unwrap();

    // concatenation with an empty side keeps the other
    let handle = array_concat(&mut pool, &[prefix::ARRAY_0], literal_123()).unwrap();
    assert!(value_equal(pool.data(handle).unwrap(), literal_123()).unwrap());
    pool.release(handle).unwrap();
}

#[test]
fn test_array_add_rejects_non_arrays() {
    let mut pool = HeapPool::new();
    let err = array_add(&mut pool, &[prefix::N_0], &[prefix::N_0], 0).unwrap_err();
    assert!(matches!(
        err,
        BoseError::UnexpectedType {
            expected: DataType::Array,
            ..
        }
    ));
}

#[test]
fn test_array_builder() {
    let mut builder = ArrayBuilder::new();
    builder.push_integer(1);
    builder.push_integer(2);
    builder.push_integer(3);
    let bose = builder.finish().unwrap();
    assert!(value_equal(bose.as_bytes(), literal_123()).unwrap());

    let mut builder = ArrayBuilder::new();
    builder.push_null();
    builder.push_bool(true);
    builder.push_string("x").unwrap();
    builder.push_value(&Scalar::integer(500));
    let bose = builder.finish().unwrap();
    let array = bose.array().unwrap();
    assert_eq!(array.len().unwrap(), 4);
    assert_eq!(array.get(3).unwrap().integer().unwrap(), 500);
}
