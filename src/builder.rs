//! Value encoders.

use crate::binary::MAX_VALUE_SIZE;
use crate::bose::{Bose, BoseBuf};
use crate::prefix;
use crate::vec::VecExt;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Possible errors that can arise during encoding.
#[derive(Debug)]
pub enum BuildError {
    StringTooLong(usize),
    ValueTooLarge(usize),
    UnsupportedNumber(String),
    JsonError(serde_json::Error),
}

impl Display for BuildError {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            BuildError::StringTooLong(len) => write!(f, "string too long, length is {}", len),
            BuildError::ValueTooLarge(size) => write!(f, "value too large, size is {}", size),
            BuildError::UnsupportedNumber(repr) => {
                write!(f, "number '{}' has no integer encoding", repr)
            }
            BuildError::JsonError(e) => write!(f, "{}", e),
        }
    }
}

impl Error for BuildError {}

pub type BuildResult<T> = std::result::Result<T, BuildError>;

/// Builder for encoding a scalar value.
#[derive(Debug)]
pub struct Scalar {}

impl Scalar {
    /// Encodes the null value.
    #[inline]
    pub fn null() -> BoseBuf {
        unsafe { BoseBuf::new_unchecked(vec![prefix::NULL]) }
    }

    /// Encodes a boolean value.
    #[inline]
    pub fn bool(value: bool) -> BoseBuf {
        let byte = if value { prefix::TRUE } else { prefix::FALSE };
        unsafe { BoseBuf::new_unchecked(vec![byte]) }
    }

    /// Encodes an integer, direct-coded when it fits the small range.
    #[inline]
    pub fn integer(value: i64) -> BoseBuf {
        let mut bytes = Vec::with_capacity(10);
        bytes.push_integer(value);
        unsafe { BoseBuf::new_unchecked(bytes) }
    }

    /// Encodes a string value as UTF-8.
    #[inline]
    pub fn string<T: AsRef<str>>(s: T) -> BuildResult<BoseBuf> {
        let s = s.as_ref();
        let mut bytes = Vec::with_capacity(5 + s.len());
        bytes.push_str_utf8(s)?;
        Ok(unsafe { BoseBuf::new_unchecked(bytes) })
    }

    /// Encodes raw octets; each byte is a literal codepoint.
    pub fn octets(data: &[u8]) -> BuildResult<BoseBuf> {
        if data.len() > MAX_VALUE_SIZE {
            return Err(BuildError::StringTooLong(data.len()));
        }
        let mut bytes = Vec::with_capacity(5 + data.len());
        bytes.push(prefix::OCTETS);
        bytes.push_size(data.len());
        bytes.extend_from_slice(data);
        Ok(unsafe { BoseBuf::new_unchecked(bytes) })
    }

    /// Encodes a capability-marked octet string.
    pub fn capability(data: &[u8]) -> BuildResult<BoseBuf> {
        if data.len() + 1 > MAX_VALUE_SIZE {
            return Err(BuildError::StringTooLong(data.len()));
        }
        let mut bytes = Vec::with_capacity(6 + data.len());
        bytes.push(prefix::OCTETS);
        bytes.push_size(data.len() + 1);
        bytes.push(crate::binary::CAP_MARK);
        bytes.extend_from_slice(data);
        Ok(unsafe { BoseBuf::new_unchecked(bytes) })
    }

    /// The empty-array literal.
    #[inline]
    pub fn empty_array() -> BoseBuf {
        unsafe { BoseBuf::new_unchecked(vec![prefix::ARRAY_0]) }
    }

    /// The empty-object literal.
    #[inline]
    pub fn empty_object() -> BoseBuf {
        unsafe { BoseBuf::new_unchecked(vec![prefix::OBJECT_0]) }
    }
}

/// Builder for encoding an array. Elements are appended in order; `finish`
/// produces a counted array. Nested containers are encoded first and
/// appended with [`push_value`](ArrayBuilder::push_value).
#[derive(Default)]
pub struct ArrayBuilder {
    payload: Vec<u8>,
    count: usize,
}

impl ArrayBuilder {
    #[inline]
    pub fn new() -> Self {
        ArrayBuilder::default()
    }

    #[inline]
    pub fn push_null(&mut self) -> &mut Self {
        self.payload.push(prefix::NULL);
        self.count += 1;
        self
    }

    #[inline]
    pub fn push_bool(&mut self, value: bool) -> &mut Self {
        self.payload.push(if value { prefix::TRUE } else { prefix::FALSE });
        self.count += 1;
        self
    }

    #[inline]
    pub fn push_integer(&mut self, value: i64) -> &mut Self {
        self.payload.push_integer(value);
        self.count += 1;
        self
    }

    #[inline]
    pub fn push_string<T: AsRef<str>>(&mut self, s: T) -> BuildResult<&mut Self> {
        self.payload.push_str_utf8(s.as_ref())?;
        self.count += 1;
        Ok(self)
    }

    /// Appends an already-encoded value.
    #[inline]
    pub fn push_value(&mut self, value: &Bose) -> &mut Self {
        self.payload.extend_from_slice(value.as_bytes());
        self.count += 1;
        self
    }

    pub fn finish(self) -> BuildResult<BoseBuf> {
        let mut bytes = Vec::with_capacity(9 + self.payload.len());
        bytes.push_container(prefix::ARRAY_N, &self.payload, self.count)?;
        Ok(unsafe { BoseBuf::new_unchecked(bytes) })
    }
}

/// Builder for encoding an object. Keys are encoded as UTF-8, or through a
/// [`MemoEncoder`] when the builder is constructed with
/// [`with_key_memo`](ObjectBuilder::with_key_memo).
#[derive(Default)]
pub struct ObjectBuilder {
    payload: Vec<u8>,
    count: usize,
    key_memo: Option<MemoEncoder>,
}

impl ObjectBuilder {
    #[inline]
    pub fn new() -> Self {
        ObjectBuilder::default()
    }

    /// A builder that memoizes repeated keys: the first occurrence is
    /// encoded as a memoizable string, later occurrences as one-byte
    /// back-references.
    #[inline]
    pub fn with_key_memo() -> Self {
        ObjectBuilder {
            payload: Vec::new(),
            count: 0,
            key_memo: Some(MemoEncoder::new()),
        }
    }

    fn push_key(&mut self, key: &str) -> BuildResult<()> {
        match &mut self.key_memo {
            Some(encoder) => encoder.encode(key, &mut self.payload),
            None => self.payload.push_str_utf8(key),
        }
    }

    #[inline]
    pub fn bind_null<K: AsRef<str>>(&mut self, key: K) -> BuildResult<&mut Self> {
        self.push_key(key.as_ref())?;
        self.payload.push(prefix::NULL);
        self.count += 1;
        Ok(self)
    }

    #[inline]
    pub fn bind_bool<K: AsRef<str>>(&mut self, key: K, value: bool) -> BuildResult<&mut Self> {
        self.push_key(key.as_ref())?;
        self.payload.push(if value { prefix::TRUE } else { prefix::FALSE });
        self.count += 1;
        Ok(self)
    }

    #[inline]
    pub fn bind_integer<K: AsRef<str>>(&mut self, key: K, value: i64) -> BuildResult<&mut Self> {
        self.push_key(key.as_ref())?;
        self.payload.push_integer(value);
        self.count += 1;
        Ok(self)
    }

    #[inline]
    pub fn bind_string<K: AsRef<str>, T: AsRef<str>>(&mut self, key: K, value: T) -> BuildResult<&mut Self> {
        self.push_key(key.as_ref())?;
        self.payload.push_str_utf8(value.as_ref())?;
        self.count += 1;
        Ok(self)
    }

    /// Binds an already-encoded value.
    #[inline]
    pub fn bind_value<K: AsRef<str>>(&mut self, key: K, value: &Bose) -> BuildResult<&mut Self> {
        self.push_key(key.as_ref())?;
        self.payload.extend_from_slice(value.as_bytes());
        self.count += 1;
        Ok(self)
    }

    pub fn finish(self) -> BuildResult<BoseBuf> {
        let mut bytes = Vec::with_capacity(9 + self.payload.len());
        bytes.push_container(prefix::OBJECT_N, &self.payload, self.count)?;
        Ok(unsafe { BoseBuf::new_unchecked(bytes) })
    }
}

/// Encoder-side string memoization: the first occurrence of a string is
/// emitted as a memoizable declaration, later occurrences as one-byte
/// back-references. Once 256 distinct strings have been declared, further
/// strings are emitted plain.
#[derive(Default)]
pub struct MemoEncoder {
    indices: HashMap<String, u8>,
    next: u16,
}

impl MemoEncoder {
    #[inline]
    pub fn new() -> Self {
        MemoEncoder::default()
    }

    /// Encodes `s` into `out`, memoizing when possible.
    pub fn encode(&mut self, s: &str, out: &mut Vec<u8>) -> BuildResult<()> {
        if let Some(&index) = self.indices.get(s) {
            out.push(prefix::MEM_REF);
            out.push(index);
            return Ok(());
        }
        if s.len() > MAX_VALUE_SIZE {
            return Err(BuildError::StringTooLong(s.len()));
        }
        if self.next < 256 {
            out.push(prefix::UTF8_MEM);
            out.push_size(s.len());
            out.extend_from_slice(s.as_bytes());
            self.indices.insert(s.to_owned(), self.next as u8);
            self.next += 1;
        } else {
            // the decoder's table would freeze past 256 entries
            out.push_str_utf8(s)?;
        }
        Ok(())
    }
}
