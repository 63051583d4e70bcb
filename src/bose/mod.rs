//! Bose value manipulation.

mod array;
mod object;
mod string;

pub use crate::bose::array::{array_add, array_concat, Array, ArrayIter};
pub use crate::bose::object::{object_add, object_concat, KeyIter, Object, ObjectIter, ValueIter};
pub use crate::bose::string::{string_add, string_concat, string_count, string_get, CodepointIter};

use crate::binary::TypeInfo;
use crate::compare::{value_equal, value_equiv};
use crate::cursor::Cursor;
use crate::format::LazyFormat;
use crate::memo::MemoTable;
use crate::pool::PoolError;
use crate::{BuildError, DataType};
use std::borrow::Borrow;
use std::error::Error;
use std::fmt;
use std::fmt::Display;
use std::ops::Deref;

/// Possible errors that can arise during scanning and building.
#[derive(Debug)]
pub enum BoseError {
    /// The scanner would read past the end of the buffer.
    OutOfBounds { len: usize, index: usize },
    /// A value's base type does not match the caller's expectation.
    UnexpectedType { expected: DataType, actual: DataType },
    /// Custom-encoded (`s_encoded`) strings are not supported.
    UnsupportedEncoding,
    /// Exponent-bearing ("unum") numbers are not supported.
    UnsupportedNumber,
    /// An extended integer payload is wider than the native word.
    NumberTooWide(usize),
    /// A malformed UTF-8 sequence at the given payload offset.
    InvalidUtf8 { offset: usize },
    /// A malformed UTF-16 sequence at the given payload offset.
    InvalidUtf16 { offset: usize },
    /// Codepoint iteration was attempted on an unresolved memo reference.
    UnresolvedMemoRef,
    /// The memo table is frozen; no further strings can be registered.
    MemoTableFull,
    /// A container index is out of range.
    IndexOutOfBounds { len: usize, index: usize },
    /// A built value would exceed the encoding size ceiling.
    ValueTooLarge(usize),
    /// Encoded bytes continue past the end of the value.
    TrailingBytes { len: usize, end: usize },
    /// A string operation on a capability-marked octet string.
    CapabilityString,
    /// A codepoint that cannot be encoded in the string's charset.
    InvalidCodepoint(u32),
    /// Concatenation of strings with different encodings.
    EncodingMismatch,
    /// A pool operation failed.
    Alloc(PoolError),
}

impl Display for BoseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoseError::OutOfBounds { len, index } => {
                write!(f, "out of bounds: the buffer size is {} but the offset is {}", len, index)
            }
            BoseError::UnexpectedType { expected, actual } => {
                write!(f, "type mismatch, expect {}, but actual {}", expected, actual)
            }
            BoseError::UnsupportedEncoding => write!(f, "custom string encodings are not supported"),
            BoseError::UnsupportedNumber => write!(f, "unum numbers are not supported"),
            BoseError::NumberTooWide(size) => {
                write!(f, "number payload of {} bytes exceeds the native word", size)
            }
            BoseError::InvalidUtf8 { offset } => write!(f, "invalid UTF-8 sequence at offset {}", offset),
            BoseError::InvalidUtf16 { offset } => write!(f, "invalid UTF-16 sequence at offset {}", offset),
            BoseError::UnresolvedMemoRef => write!(f, "unresolved memo reference"),
            BoseError::MemoTableFull => write!(f, "memo table is frozen"),
            BoseError::IndexOutOfBounds { len, index } => {
                write!(f, "index out of bounds: the len is {} but the index is {}", len, index)
            }
            BoseError::ValueTooLarge(size) => write!(f, "value too large, size is {}", size),
            BoseError::TrailingBytes { len, end } => {
                write!(f, "trailing bytes: the value ends at {} but the buffer size is {}", end, len)
            }
            BoseError::CapabilityString => write!(f, "cannot splice into a capability string"),
            BoseError::InvalidCodepoint(codepoint) => {
                write!(f, "codepoint {:#x} is not encodable in this charset", codepoint)
            }
            BoseError::EncodingMismatch => write!(f, "string encodings do not match"),
            BoseError::Alloc(e) => write!(f, "{}", e),
        }
    }
}

impl Error for BoseError {}

impl From<PoolError> for BoseError {
    #[inline]
    fn from(e: PoolError) -> Self {
        BoseError::Alloc(e)
    }
}

impl From<BuildError> for BoseError {
    #[inline]
    fn from(e: BuildError) -> Self {
        match e {
            BuildError::StringTooLong(len) => BoseError::ValueTooLarge(len),
            _ => unreachable!(),
        }
    }
}

pub type BoseResult<T> = std::result::Result<T, BoseError>;

/// An owned `Bose` value, backed by a buffer of bytes in BOSE binary format.
#[repr(transparent)]
pub struct BoseBuf {
    bytes: Vec<u8>,
}

impl BoseBuf {
    /// Creates a new `BoseBuf` from `Vec<u8>`, validating that the bytes hold
    /// exactly one well-formed value.
    #[inline]
    pub fn new(bytes: Vec<u8>) -> BoseResult<Self> {
        let mut memo = MemoTable::new();
        let mut cursor = Cursor::new(&bytes);
        cursor.parse_value(&mut memo)?;
        if cursor.end != bytes.len() {
            return Err(BoseError::TrailingBytes {
                len: bytes.len(),
                end: cursor.end,
            });
        }
        Ok(BoseBuf { bytes })
    }

    /// Creates a new `BoseBuf` from `Vec<u8>`.
    ///
    /// # Safety
    ///
    /// Callers should guarantee the `bytes` is a valid `BOSE` value.
    #[inline]
    pub unsafe fn new_unchecked(bytes: Vec<u8>) -> Self {
        debug_assert!(!bytes.is_empty());
        BoseBuf { bytes }
    }

    #[inline]
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}

/// A slice of a `Bose` value. This can be created from a [`BoseBuf`] or any
/// type that contains valid bytes in BOSE binary format.
#[repr(transparent)]
pub struct Bose {
    bytes: [u8],
}

impl Deref for BoseBuf {
    type Target = Bose;

    #[inline]
    fn deref(&self) -> &Bose {
        unsafe { Bose::new_unchecked(&self.bytes) }
    }
}

impl Borrow<Bose> for BoseBuf {
    #[inline]
    fn borrow(&self) -> &Bose {
        self.deref()
    }
}

impl ToOwned for Bose {
    type Owned = BoseBuf;

    #[inline]
    fn to_owned(&self) -> BoseBuf {
        self.to_bose_buf()
    }
}

impl AsRef<Bose> for BoseBuf {
    #[inline]
    fn as_ref(&self) -> &Bose {
        self
    }
}

impl Bose {
    /// Creates a new `Bose` from a byte slice, validating that it holds
    /// exactly one well-formed value.
    #[inline]
    pub fn new<B: AsRef<[u8]> + ?Sized>(bytes: &B) -> BoseResult<&Bose> {
        let bytes = bytes.as_ref();
        let mut memo = MemoTable::new();
        let mut cursor = Cursor::new(bytes);
        cursor.parse_value(&mut memo)?;
        if cursor.end != bytes.len() {
            return Err(BoseError::TrailingBytes {
                len: bytes.len(),
                end: cursor.end,
            });
        }
        Ok(unsafe { Bose::new_unchecked(bytes) })
    }

    /// Creates a new `Bose` from the reference of `[u8]`.
    ///
    /// # Safety
    ///
    /// Callers should guarantee the `bytes` is a valid `BOSE` value.
    #[inline]
    pub unsafe fn new_unchecked<B: AsRef<[u8]> + ?Sized>(bytes: &B) -> &Bose {
        debug_assert!(!bytes.as_ref().is_empty());
        &*(bytes.as_ref() as *const [u8] as *const Bose)
    }

    #[inline]
    pub fn to_bose_buf(&self) -> BoseBuf {
        BoseBuf {
            bytes: self.bytes.to_vec(),
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Base category of this value, classified from its prefix byte.
    #[inline]
    pub fn data_type(&self) -> BoseResult<DataType> {
        let prefix = self.prefix_byte()?;
        Ok(TypeInfo::of(prefix).base())
    }

    /// Decodes this value into a [`Value`].
    #[inline]
    pub fn value(&self) -> BoseResult<Value> {
        let value = match self.data_type()? {
            DataType::Null => Value::Null,
            DataType::Boolean => Value::Bool(self.boolean()?),
            DataType::Number => Value::Integer(self.integer()?),
            DataType::String => Value::String(self.string()?),
            DataType::Array => Value::Array(self.array()?),
            DataType::Object => Value::Object(self.object()?),
        };
        Ok(value)
    }

    /// If `Bose` is a `Number`, return its integer value. Returns `BoseError`
    /// otherwise. The value is sign-extended to the full word width according
    /// to the encoding's sign flag.
    #[inline]
    pub fn integer(&self) -> BoseResult<i64> {
        let mut memo = MemoTable::new();
        let mut cursor = Cursor::new(&self.bytes);
        cursor.parse_integer(&mut memo)?;
        Ok(cursor.value as i64)
    }

    /// If `Bose` is a `Boolean`, return its value. Returns `BoseError`
    /// otherwise.
    #[inline]
    pub fn boolean(&self) -> BoseResult<bool> {
        let prefix = self.prefix_byte()?;
        let info = TypeInfo::of(prefix);
        if info.base() != DataType::Boolean {
            return Err(BoseError::UnexpectedType {
                expected: DataType::Boolean,
                actual: info.base(),
            });
        }
        Ok(prefix == crate::prefix::TRUE)
    }

    /// If `Bose` is `Null`, return true. Returns false otherwise.
    #[inline]
    pub fn is_null(&self) -> BoseResult<bool> {
        Ok(self.prefix_byte()? == crate::prefix::NULL)
    }

    /// If `Bose` is a `String`, decode its codepoint sequence. Returns
    /// `BoseError` otherwise. Codepoints that are not Unicode scalar values
    /// (raw octets above 0x7F inside an `octets` string, unpaired UTF-16
    /// surrogates) are replaced with U+FFFD.
    #[inline]
    pub fn string(&self) -> BoseResult<String> {
        let mut memo = MemoTable::new();
        let mut cursor = Cursor::new(&self.bytes);
        cursor.parse_string(&mut memo)?;
        string::decode(&cursor, &mut memo)
    }

    /// If `Bose` is an `Array`, return its accessor. Returns `BoseError`
    /// otherwise.
    #[inline]
    pub fn array(&self) -> BoseResult<Array> {
        let mut memo = MemoTable::new();
        let mut cursor = Cursor::new(&self.bytes);
        cursor.parse_array(&mut memo)?;
        Ok(Array::new(self))
    }

    /// If `Bose` is an `Object`, return its accessor. Returns `BoseError`
    /// otherwise.
    #[inline]
    pub fn object(&self) -> BoseResult<Object> {
        let mut memo = MemoTable::new();
        let mut cursor = Cursor::new(&self.bytes);
        cursor.parse_object(&mut memo)?;
        Ok(Object::new(self))
    }

    /// Strict structural equality with another encoded value.
    #[inline]
    pub fn equals(&self, other: &Bose) -> BoseResult<bool> {
        value_equal(&self.bytes, &other.bytes)
    }

    /// Abstract equivalence with another encoded value.
    #[inline]
    pub fn equivalent(&self, other: &Bose) -> BoseResult<bool> {
        value_equiv(&self.bytes, &other.bytes)
    }

    /// Formats the value as a compact or pretty JSON string.
    #[inline]
    pub fn format(&self, pretty: bool) -> impl Display + '_ {
        LazyFormat::new(self, pretty)
    }

    #[inline]
    fn prefix_byte(&self) -> BoseResult<u8> {
        self.bytes.first().copied().ok_or(BoseError::OutOfBounds {
            len: 0,
            index: 0,
        })
    }
}

impl PartialEq for Bose {
    #[inline]
    fn eq(&self, other: &Bose) -> bool {
        self.equals(other).unwrap_or(false)
    }
}

impl PartialEq for BoseBuf {
    #[inline]
    fn eq(&self, other: &BoseBuf) -> bool {
        self.deref() == other.deref()
    }
}

impl fmt::Debug for Bose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bose({:02x?})", &self.bytes)
    }
}

impl fmt::Debug for BoseBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoseBuf({:02x?})", self.bytes.as_slice())
    }
}

/// Possible decoded value corresponding to the data type.
#[derive(Clone, Debug)]
pub enum Value<'a> {
    Object(Object<'a>),
    Array(Array<'a>),
    String(String),
    Integer(i64),
    Bool(bool),
    Null,
}

impl<'a> Value<'a> {
    #[inline]
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Object(_) => DataType::Object,
            Value::Array(_) => DataType::Array,
            Value::String(_) => DataType::String,
            Value::Integer(_) => DataType::Number,
            Value::Bool(_) => DataType::Boolean,
            Value::Null => DataType::Null,
        }
    }
}

impl<'a> TryFrom<&'a Bose> for Value<'a> {
    type Error = BoseError;

    #[inline]
    fn try_from(bose: &'a Bose) -> Result<Self, Self::Error> {
        bose.value()
    }
}

/// The encoded bytes of a scanned element, with memo references redirected
/// to the span they reference.
#[inline]
pub(super) fn element_span<'b>(cursor: &Cursor<'b>, memo: &MemoTable<'b>) -> &'b [u8] {
    if cursor.prefix == crate::prefix::MEM_REF {
        memo.get(cursor.value as u8)
    } else {
        cursor.span()
    }
}

/// Canonical builder header: container prefix, two-byte size field,
/// two-byte count field. Size and count are patched in afterwards.
#[inline]
pub(super) fn write_container_header(data: &mut [u8], prefix_byte: u8) {
    data[0] = prefix_byte;
    data[1] = crate::prefix::P_INT_0;
    data[2] = crate::prefix::N_0 + 2;
    data[3] = 0;
    data[4] = 0;
    data[5] = crate::prefix::P_INT_0;
    data[6] = crate::prefix::N_0 + 2;
    data[7] = 0;
    data[8] = 0;
}

/// Fills in the size and count fields once the payload has been written;
/// the size field covers everything after itself.
#[inline]
pub(super) fn patch_container_header(data: &mut [u8], end: usize, count: u64) {
    let size = end - 5;
    data[3] = (size & 0xFF) as u8;
    data[4] = (size >> 8) as u8;
    data[7] = (count & 0xFF) as u8;
    data[8] = ((count >> 8) & 0xFF) as u8;
}
