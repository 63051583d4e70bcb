//! String memoization tests.

use bose::{prefix, value_equiv, Bose, BoseBuf, BoseError, Cursor, MemoEncoder, MemoTable, ObjectBuilder};

#[test]
fn test_back_reference_resolution() {
    // ["kind" (memoizable), <back-reference 0>]
    let array: &[u8] = &[
        prefix::ARRAY,
        0x88,
        prefix::UTF8_MEM,
        0x84,
        b'k',
        b'i',
        b'n',
        b'd',
        prefix::MEM_REF,
        0x00,
    ];
    let bose = Bose::new(array).unwrap();
    let elements = bose.array().unwrap();
    assert_eq!(elements.len().unwrap(), 2);
    assert_eq!(elements.get(0).unwrap().string().unwrap(), "kind");
    assert_eq!(elements.get(1).unwrap().string().unwrap(), "kind");

    let plain = BoseBuf::parse(r#"["kind", "kind"]"#).unwrap();
    assert!(value_equiv(array, plain.as_bytes()).unwrap());
}

#[test]
fn test_registration_is_idempotent() {
    // the same memoizable string keeps its slot across repeated scans
    let data: &[u8] = &[prefix::UTF8_MEM, 0x83, b'a', b'b', b'c'];
    let mut memo = MemoTable::new();
    for _ in 0..10 {
        let mut cursor = Cursor::new(data);
        cursor.parse_string(&mut memo).unwrap();
        cursor.advance();
    }
    assert_eq!(memo.get(0), data);
    assert_eq!(memo.get(1), &[prefix::UTF8, prefix::N_0][..]); // empty sentinel
}

#[test]
fn test_table_freezes_after_256_entries() {
    // 257 distinct memoizable strings back to back
    let mut data = Vec::new();
    for i in 0..257u16 {
        data.extend_from_slice(&[prefix::UTF8_MEM, 0x82, (i >> 8) as u8, (i & 0xFF) as u8]);
    }

    let mut memo = MemoTable::new();
    let mut cursor = Cursor::new(&data);
    for _ in 0..256 {
        cursor.parse_string(&mut memo).unwrap();
        cursor.advance();
    }
    assert!(memo.is_frozen());
    assert!(matches!(
        cursor.parse_string(&mut memo).unwrap_err(),
        BoseError::MemoTableFull
    ));

    // a reset unfreezes the table for the next top-level value
    memo.reset();
    assert!(!memo.is_frozen());
    let mut cursor = Cursor::new(&data);
    cursor.parse_string(&mut memo).unwrap();
    assert_eq!(memo.get(0), &data[..4]);
}

#[test]
fn test_memoized_contents_reproduce() {
    // register distinct strings, then resolve every index
    let strings: Vec<Vec<u8>> = (0..64u8)
        .map(|i| vec![prefix::UTF8_MEM, 0x82, b'k', i])
        .collect();
    let mut memo = MemoTable::new();
    for s in &strings {
        let mut cursor = Cursor::new(s);
        cursor.parse_string(&mut memo).unwrap();
    }
    let back_refs: Vec<[u8; 2]> = (0..strings.len() as u8)
        .map(|i| [prefix::MEM_REF, i])
        .collect();
    for (i, s) in strings.iter().enumerate() {
        let entry = memo.get(i as u8);
        assert_eq!(entry, s.as_slice());
        // resolving through a back-reference reads the same bytes
        let mut cursor = Cursor::new(&back_refs[i]);
        cursor.parse_string(&mut memo).unwrap();
        let resolved = cursor.resolve_memo(&mut memo).unwrap();
        assert_eq!(resolved.span(), s.as_slice());
    }
}

#[test]
fn test_memo_encoder() {
    let mut payload = Vec::new();
    let mut encoder = MemoEncoder::new();
    encoder.encode("kind", &mut payload).unwrap();
    encoder.encode("kind", &mut payload).unwrap();
    encoder.encode("name", &mut payload).unwrap();
    encoder.encode("kind", &mut payload).unwrap();

    // first occurrence declares, later occurrences back-reference
    assert_eq!(
        payload,
        [
            prefix::UTF8_MEM,
            0x84,
            b'k',
            b'i',
            b'n',
            b'd',
            prefix::MEM_REF,
            0x00,
            prefix::UTF8_MEM,
            0x84,
            b'n',
            b'a',
            b'm',
            b'e',
            prefix::MEM_REF,
            0x00,
        ]
    );
}

#[test]
fn test_object_builder_with_key_memo() {
    // duplicate keys are permitted; lookup is first-match-wins
    let mut builder = ObjectBuilder::with_key_memo();
    builder.bind_integer("kind", 1).unwrap();
    builder.bind_integer("kind", 2).unwrap();
    let bose = builder.finish().unwrap();

    // the second key is a one-byte back-reference
    assert!(bose.as_bytes().contains(&prefix::MEM_REF));
    let object = bose.object().unwrap();
    assert_eq!(object.len().unwrap(), 2);
    assert_eq!(object.get("kind").unwrap().unwrap().integer().unwrap(), 1);

    let keys: Vec<String> = object.keys().unwrap().collect::<Result<_, _>>().unwrap();
    assert_eq!(keys, ["kind", "kind"]);
}
