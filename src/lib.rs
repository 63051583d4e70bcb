//! Encoding and decoding support for BOSE in Rust.
//!
//! BOSE (Binary Octet-Stream Encoding) is a self-describing, variable-length
//! binary value encoding. Its distinguishing property is that every accessor
//! (length, element lookup, equality, iteration) operates directly on the
//! encoded byte buffer, returning only offsets and scalar metadata; no parsed
//! tree is ever materialized.
//!
//! ## Optional features
//!
//! ### `serde`
//!
//! When this optional dependency is enabled, `BoseBuf` implements the
//! `serde::Serialize` and `serde::Deserialize` traits.
//!
//! ## BOSE binary format
//!
//! ```BNF
//! value ::= prefix extension*
//!
//! prefix ::=                  // one byte selecting base type and flags
//!     0x00 |                  // false
//!     0x01 |                  // true
//!     0x02 |                  // array_0 (empty array)
//!     0x03 |                  // object_0 (empty object)
//!     0x04 |                  // array: size element*
//!     0x05 |                  // object: size (string value)*
//!     0x06 |                  // array_n: size count element*
//!     0x07 |                  // object_n: size count (string value)*
//!     0x08 |                  // octets: size byte*
//!     0x09 |                  // mem_ref: index
//!     0x0A |                  // utf8: size [BOM] byte*
//!     0x0B |                  // utf8_mem: size [BOM] byte* (memoized)
//!     0x0C |                  // utf16: size [BOM] byte-pair*
//!     0x0D |                  // utf16_mem: size [BOM] byte-pair* (memoized)
//!     0x0E |                  // s_encoded (custom charset, unsupported)
//!     0x0F |                  // string_0 (empty string)
//!     0x10-0x17 |             // p_int_0..7: size byte* (positive integer)
//!     0x18-0x1F |             // m_int_0..7: size byte* (negative integer)
//!     0x20-0x2F |             // p_flt/m_flt (unum, unsupported)
//!     0x30-0x3F |             // p_rng/m_rng (range, unsupported)
//!     0x40-0x7F |             // small integer -64..-1
//!     0x80-0xFE |             // small integer 0..126
//!     0xFF                    // null
//!
//! size ::= value              // a nested Number encoding
//! count ::= value             // a nested Number encoding
//! index ::= uint8             // memo table slot
//! ```
//!
//! Extended integers hold 0 to 8 little-endian payload bytes, sign-extended
//! per the prefix's sign. String payloads may start with a byte-order mark
//! (`EF BB BF` for UTF-8; `FE FF`/`FF FE` selecting UTF-16 endianness,
//! big-endian by default), which is stripped from the reported payload. An
//! octet string whose payload leads with `0x10` is a capability. A string
//! encoded with a `*_mem` prefix registers in the decoder's
//! [`MemoTable`] and can be referenced later by a one-byte `mem_ref`.
//!
//! ## Usage
//!
//! To encode scalar values, use [`Scalar`]:
//!
//! ```rust
//! use bose::{DataType, Scalar};
//!
//! let bose = Scalar::integer(42);
//! assert_eq!(bose.data_type().unwrap(), DataType::Number);
//! assert_eq!(bose.integer().unwrap(), 42);
//! ```
//!
//! To encode containers, use [`ArrayBuilder`] / [`ObjectBuilder`] or parse
//! JSON text:
//!
//! ```rust
//! use bose::BoseBuf;
//!
//! let bose = BoseBuf::parse(r#"{"kind": "example", "items": [1, 2, 3]}"#).unwrap();
//! let object = bose.object().unwrap();
//! assert_eq!(object.len().unwrap(), 2);
//! assert_eq!(object.get("kind").unwrap().unwrap().string().unwrap(), "example");
//! ```
//!
//! Comparison never materializes either side: [`value_equal`] and
//! [`value_equiv`] walk the encoded buffers directly, so different valid
//! encodings of the same content compare equal:
//!
//! ```rust
//! use bose::value_equiv;
//!
//! let utf8 = [0x0A, 0x84, b'k', b'i', b'n', b'd'];
//! let utf16 = [0x0C, 0x88, 0, b'k', 0, b'i', 0, b'n', 0, b'd'];
//! assert!(value_equiv(&utf8, &utf16).unwrap());
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

mod binary;
mod bose;
mod builder;
mod compare;
mod cursor;
mod data_type;
mod format;
mod json;
mod memo;
mod pool;
mod vec;

#[cfg(feature = "serde")]
mod serde;

pub use self::{
    binary::{prefix, TypeInfo, CAP_MARK, MAX_CODEPOINT},
    bose::{
        array_add, array_concat, object_add, object_concat, string_add, string_concat,
        string_count, string_get, Array, ArrayIter, Bose, BoseBuf, BoseError, BoseResult,
        CodepointIter, KeyIter, Object, ObjectIter, Value, ValueIter,
    },
    builder::{ArrayBuilder, BuildError, BuildResult, MemoEncoder, ObjectBuilder, Scalar},
    compare::{parse_equal, parse_equiv, value_equal, value_equiv},
    cursor::Cursor,
    data_type::DataType,
    format::{FormatError, FormatResult},
    memo::MemoTable,
    pool::{ArenaPool, AuditPool, AuditRecord, CountedPool, Handle, HeapPool, Pool, PoolError, PoolResult},
};
