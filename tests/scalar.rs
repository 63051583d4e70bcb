//! Scalar scanning and encoding tests.

use bose::{prefix, Bose, BoseError, Cursor, DataType, MemoTable, Scalar};

#[test]
fn test_parse_integer_sequence() {
    let data = [
        prefix::N_0,
        prefix::N_0 + 1,
        0x7F, // -1
        prefix::P_INT_0,
        0x81,
        42,
        prefix::M_INT_0,
        0x83,
        0xFF,
        0xFF,
        0xFF,
        prefix::P_INT_0 + 4,
        0x82,
        0x00,
        0x08,
        prefix::M_INT_0 + 4,
        0x82,
        0x00,
        0xF8,
        prefix::M_INT_0,
        0x84,
        0xFE,
        0xFF,
        0xFF,
        0xFF,
        prefix::P_INT_0,
        0x82,
        0xFE,
        0xFF,
        prefix::M_INT_0 + 3,
        0x89,
        0x00,
        0x01,
        0x23,
        0x45,
        0x67,
        0x89,
        0xAB,
        0xCD,
        0xEF,
        prefix::P_INT_0,
        prefix::N_0,
    ];
    let expected: [(usize, i64); 9] = [
        (1, 0),
        (1, 1),
        (1, -1),
        (3, 42),
        (5, -1),
        (4, 2048),
        (4, -2048),
        (6, -2),
        (4, 65534),
    ];

    let mut memo = MemoTable::new();
    let mut cursor = Cursor::new(&data);
    for (width, value) in expected {
        cursor.parse_integer(&mut memo).unwrap();
        assert_eq!(cursor.end - cursor.start, width);
        assert_eq!(cursor.value as i64, value);
        cursor.advance();
    }

    // a 9-byte payload exceeds the native word
    let err = cursor.parse_integer(&mut memo).unwrap_err();
    assert!(matches!(err, BoseError::NumberTooWide(9)));
    assert_eq!(cursor.end - cursor.start, 11);
    cursor.advance();

    // empty payload decodes to zero
    cursor.parse_integer(&mut memo).unwrap();
    assert_eq!(cursor.end - cursor.start, 2);
    assert_eq!(cursor.value, 0);

    assert_eq!(cursor.end, data.len()); // used up all the data
}

#[test]
fn test_parse_string_sequence() {
    let data = [
        prefix::STRING_0,
        prefix::OCTETS,
        0x84,
        b'k',
        b'i',
        b'n',
        b'd',
        prefix::UTF8,
        0x84,
        b'k',
        b'i',
        b'n',
        b'd',
        prefix::UTF8,
        0x87,
        0xEF,
        0xBB,
        0xBF,
        b'k',
        b'i',
        b'n',
        b'd',
        prefix::UTF16,
        0x88,
        0,
        b'k',
        0,
        b'i',
        0,
        b'n',
        0,
        b'd',
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
        prefix::UTF16,
        0x8A,
        0xFF,
        0xFE,
        b'k',
        0,
        b'i',
        0,
        b'n',
        0,
        b'd',
        0,
        prefix::UTF8,
        0x83,
        0xEF,
        0xBB,
        0xBF,
        prefix::UTF16,
        0x82,
        0xFF,
        0xFE,
        prefix::UTF8,
        prefix::N_0,
    ];
    // (encoded width, reported payload size)
    let expected: [(usize, u64); 10] = [
        (1, 0),
        (6, 4),
        (6, 4),
        (9, 4),
        (10, 8),
        (12, 8),
        (12, 8),
        (5, 0),
        (4, 0),
        (2, 0),
    ];

    let mut memo = MemoTable::new();
    let mut cursor = Cursor::new(&data);
    for (width, size) in expected {
        cursor.parse_string(&mut memo).unwrap();
        assert_eq!(cursor.end - cursor.start, width);
        assert_eq!(cursor.value, size);
        cursor.advance();
    }
    assert_eq!(cursor.end, data.len()); // used up all the data
}

#[test]
fn test_scalar_encoding() {
    assert_eq!(Scalar::null().as_bytes(), [prefix::NULL]);
    assert_eq!(Scalar::bool(true).as_bytes(), [prefix::TRUE]);
    assert_eq!(Scalar::bool(false).as_bytes(), [prefix::FALSE]);
    assert_eq!(Scalar::empty_array().as_bytes(), [prefix::ARRAY_0]);
    assert_eq!(Scalar::empty_object().as_bytes(), [prefix::OBJECT_0]);

    assert_eq!(Scalar::integer(0).as_bytes(), [prefix::N_0]);
    assert_eq!(Scalar::integer(126).as_bytes(), [prefix::N_126]);
    assert_eq!(Scalar::integer(-64).as_bytes(), [prefix::N_M64]);
    assert_eq!(Scalar::integer(127).as_bytes(), [prefix::P_INT_0, 0x81, 0x7F]);
    assert_eq!(Scalar::integer(-65).as_bytes(), [prefix::M_INT_0, 0x81, 0xBF]);

    let s = Scalar::string("kind").unwrap();
    assert_eq!(s.as_bytes(), [prefix::UTF8, 0x84, b'k', b'i', b'n', b'd']);
}

#[test]
fn test_scalar_round_trip() {
    for value in [0i64, 1, -1, 42, -64, 126, 127, 2048, -2048, i64::MAX, i64::MIN] {
        let bose = Scalar::integer(value);
        assert_eq!(bose.data_type().unwrap(), DataType::Number);
        assert_eq!(bose.integer().unwrap(), value);
    }

    let bose = Scalar::string("héllo wörld").unwrap();
    assert_eq!(bose.string().unwrap(), "héllo wörld");

    let bose = Scalar::null();
    assert!(bose.is_null().unwrap());
    assert_eq!(bose.data_type().unwrap(), DataType::Null);

    assert!(Scalar::bool(true).boolean().unwrap());
    assert!(!Scalar::bool(false).boolean().unwrap());
}

#[test]
fn test_capability_octets() {
    let capability = Scalar::capability(&[0x01, 0x02, 0x03]).unwrap();
    assert!(capability.is_capability().unwrap());
    assert_eq!(bose::string_count(capability.as_bytes()).unwrap(), 3);
    assert_eq!(bose::string_get(capability.as_bytes(), 0).unwrap(), 0x01);

    let plain = Scalar::octets(&[0x41, 0x42]).unwrap();
    assert!(!plain.is_capability().unwrap());
    assert_eq!(plain.string().unwrap(), "AB");
}

#[test]
fn test_type_mismatch() {
    let bose = Scalar::integer(5);
    assert!(matches!(
        bose.string().unwrap_err(),
        BoseError::UnexpectedType {
            expected: DataType::String,
            actual: DataType::Number,
        }
    ));
    assert!(Bose::new(&[prefix::TRUE]).unwrap().integer().is_err());
}

#[test]
fn test_trailing_bytes_rejected() {
    assert!(matches!(
        Bose::new(&[prefix::N_0, prefix::N_0]).unwrap_err(),
        BoseError::TrailingBytes { len: 2, end: 1 }
    ));
}
