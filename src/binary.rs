//! BOSE binary format.

use crate::DataType;

/// Prefix byte assignments.
///
/// Every encoded value begins with exactly one of these bytes. The numeric
/// suffixes of the extended-number prefixes (`P_INT_0` through `P_INT_7` and
/// so on) are interchangeable aliases; encoders conventionally emit the `_0`
/// form.
pub mod prefix {
    pub const FALSE: u8 = 0x00;
    pub const TRUE: u8 = 0x01;
    pub const ARRAY_0: u8 = 0x02;
    pub const OBJECT_0: u8 = 0x03;
    pub const ARRAY: u8 = 0x04;
    pub const OBJECT: u8 = 0x05;
    pub const ARRAY_N: u8 = 0x06;
    pub const OBJECT_N: u8 = 0x07;
    pub const OCTETS: u8 = 0x08;
    pub const MEM_REF: u8 = 0x09;
    pub const UTF8: u8 = 0x0A;
    pub const UTF8_MEM: u8 = 0x0B;
    pub const UTF16: u8 = 0x0C;
    pub const UTF16_MEM: u8 = 0x0D;
    pub const S_ENCODED: u8 = 0x0E;
    pub const STRING_0: u8 = 0x0F;
    pub const P_INT_0: u8 = 0x10;
    pub const M_INT_0: u8 = 0x18;
    pub const P_FLT_0: u8 = 0x20;
    pub const M_FLT_0: u8 = 0x28;
    pub const P_RNG_0: u8 = 0x30;
    pub const M_RNG_0: u8 = 0x38;
    /// Small integer -64, the lowest direct-coded integer.
    pub const N_M64: u8 = 0x40;
    /// Small integer 0; a small integer's value is its prefix minus `N_0`.
    pub const N_0: u8 = 0x80;
    /// Small integer 126, the highest direct-coded integer.
    pub const N_126: u8 = 0xFE;
    pub const NULL: u8 = 0xFF;
}

/// Reserved first payload byte marking an octet string as a capability.
pub const CAP_MARK: u8 = 0x10;

/// Highest valid Unicode codepoint.
pub const MAX_CODEPOINT: u32 = 0x0010_FFFF;

/// Widest extended-integer payload accepted by the scanner, in bytes.
pub(crate) const WORD_SIZE: usize = 8;

/// Ceiling on the encodings produced by the value builders.
pub(crate) const MAX_VALUE_SIZE: usize = 0xFFFF;

/// Size of the canonical `array_n`/`object_n` header emitted by the value
/// builders: prefix byte plus two fixed two-byte integer fields.
pub(crate) const CONTAINER_HEADER_SIZE: usize = 9;

pub(crate) const SMALL_INT_MIN: i64 = -64;
pub(crate) const SMALL_INT_MAX: i64 = 126;

/// The canonical encoding of the empty string.
pub(crate) const EMPTY_STRING: &[u8] = &[prefix::UTF8, prefix::N_0];

/// Prefix byte classification: base category plus modifier flags.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct TypeInfo(u8);

impl TypeInfo {
    pub const BASE_MASK: u8 = 0x07;
    /// Sign for numbers; UTF-16 little-endian for strings.
    pub const NEGATIVE: u8 = 1 << 3;
    /// Memoizable for strings; non-unum for numbers.
    pub const EXACT: u8 = 1 << 4;
    /// An explicit length field follows the prefix.
    pub const SIZED: u8 = 1 << 5;
    /// An explicit element/byte count follows the length field; also marks
    /// custom-encoded strings and exponent-bearing ("unum") numbers.
    pub const COUNTED: u8 = 1 << 6;
    /// Octet string payload carries a capability mark.
    pub const CAPABILITY: u8 = 1 << 7;

    /// Classifies a prefix byte.
    #[inline]
    pub fn of(prefix: u8) -> TypeInfo {
        TypeInfo(PREFIX_TYPE[prefix as usize])
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn base(self) -> DataType {
        match self.0 & Self::BASE_MASK {
            0 => DataType::Null,
            1 => DataType::Boolean,
            2 => DataType::Number,
            3 => DataType::String,
            4 => DataType::Array,
            5 => DataType::Object,
            _ => unreachable!("prefix table produced an unknown base type"),
        }
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 & Self::NEGATIVE != 0
    }

    #[inline]
    pub fn is_exact(self) -> bool {
        self.0 & Self::EXACT != 0
    }

    #[inline]
    pub fn is_sized(self) -> bool {
        self.0 & Self::SIZED != 0
    }

    #[inline]
    pub fn is_counted(self) -> bool {
        self.0 & Self::COUNTED != 0
    }

    #[inline]
    pub fn is_capability(self) -> bool {
        self.0 & Self::CAPABILITY != 0
    }

    /// True for direct-coded small integers, with or without sign.
    #[inline]
    pub fn is_small(self) -> bool {
        self.0 & !Self::NEGATIVE == SMALL
    }

    #[inline]
    pub(crate) fn set_negative(&mut self) {
        self.0 |= Self::NEGATIVE;
    }

    #[inline]
    pub(crate) fn set_capability(&mut self) {
        self.0 |= Self::CAPABILITY;
    }
}

const NULL: u8 = DataType::Null as u8;
const BOOLEAN: u8 = DataType::Boolean as u8;
const NUMBER: u8 = DataType::Number as u8;
const STRING: u8 = DataType::String as u8;
const ARRAY: u8 = DataType::Array as u8;
const OBJECT: u8 = DataType::Object as u8;

const SMALL: u8 = NUMBER | TypeInfo::EXACT;
const INTEGER: u8 = NUMBER | TypeInfo::EXACT | TypeInfo::SIZED;
const FLOAT: u8 = NUMBER | TypeInfo::EXACT | TypeInfo::SIZED | TypeInfo::COUNTED;
const RANGE: u8 = NUMBER | TypeInfo::SIZED | TypeInfo::COUNTED;

const fn build_type_table() -> [u8; 256] {
    const NEGATIVE: u8 = TypeInfo::NEGATIVE;
    const EXACT: u8 = TypeInfo::EXACT;
    const SIZED: u8 = TypeInfo::SIZED;
    const COUNTED: u8 = TypeInfo::COUNTED;

    let mut t = [0u8; 256];
    t[0x00] = BOOLEAN; // false
    t[0x01] = BOOLEAN; // true
    t[0x02] = ARRAY; // array_0
    t[0x03] = OBJECT; // object_0
    t[0x04] = ARRAY | SIZED; // array
    t[0x05] = OBJECT | SIZED; // object
    t[0x06] = ARRAY | SIZED | COUNTED; // array_n
    t[0x07] = OBJECT | SIZED | COUNTED; // object_n
    t[0x08] = STRING | SIZED; // octets
    t[0x09] = STRING; // mem_ref
    t[0x0A] = STRING | SIZED; // utf8
    t[0x0B] = STRING | SIZED | EXACT; // utf8_mem
    t[0x0C] = STRING | SIZED; // utf16
    t[0x0D] = STRING | SIZED | EXACT; // utf16_mem
    t[0x0E] = STRING | SIZED | COUNTED; // s_encoded
    t[0x0F] = STRING; // string_0

    let mut i = 0x10;
    while i < 0x18 {
        t[i] = INTEGER; // p_int_0..p_int_7
        i += 1;
    }
    while i < 0x20 {
        t[i] = INTEGER | NEGATIVE; // m_int_0..m_int_7
        i += 1;
    }
    while i < 0x28 {
        t[i] = FLOAT; // p_flt_0..p_flt_7
        i += 1;
    }
    while i < 0x30 {
        t[i] = FLOAT | NEGATIVE; // m_flt_0..m_flt_7
        i += 1;
    }
    while i < 0x38 {
        t[i] = RANGE; // p_rng_0..p_rng_7
        i += 1;
    }
    while i < 0x40 {
        t[i] = RANGE | NEGATIVE; // m_rng_0..m_rng_7
        i += 1;
    }
    while i < 0x80 {
        t[i] = SMALL | NEGATIVE; // n_-64..n_-1
        i += 1;
    }
    while i < 0xFF {
        t[i] = SMALL; // n_0..n_126
        i += 1;
    }
    t[0xFF] = NULL; // null
    t
}

/// 256-entry lookup mapping each possible prefix byte to its type info.
pub(crate) static PREFIX_TYPE: [u8; 256] = build_type_table();

/// Direct-coded form for integers in the small range, if representable.
#[inline]
pub(crate) fn small_int(value: i64) -> Option<u8> {
    if (SMALL_INT_MIN..=SMALL_INT_MAX).contains(&value) {
        Some((prefix::N_0 as i64 + value) as u8)
    } else {
        None
    }
}
