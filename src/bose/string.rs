//! String operations.

use crate::binary::{MAX_CODEPOINT, MAX_VALUE_SIZE};
use crate::bose::{Bose, BoseError, BoseResult};
use crate::cursor::Cursor;
use crate::memo::MemoTable;
use crate::pool::{Handle, Pool};
use crate::prefix;

/// Decodes a scanned string cursor into a `String`, resolving memo
/// references. Codepoints outside the Unicode scalar range are replaced
/// with U+FFFD.
pub(crate) fn decode(cursor: &Cursor, memo: &mut MemoTable) -> BoseResult<String> {
    let resolved;
    let cursor = if cursor.prefix == prefix::MEM_REF {
        resolved = cursor.resolve_memo(memo)?;
        &resolved
    } else {
        cursor
    };
    let mut codepoints = cursor.codepoints()?;
    let mut out = String::with_capacity(codepoints.data.len());
    while !codepoints.is_exhausted() {
        let codepoint = codepoints.parse_codepoint()?;
        out.push(char::from_u32(codepoint).unwrap_or(char::REPLACEMENT_CHARACTER));
        codepoints.advance();
    }
    Ok(out)
}

impl Bose {
    /// If `Bose` is a `String`, return an iterator over its codepoints.
    /// Returns `BoseError` otherwise.
    pub fn codepoints(&self) -> BoseResult<CodepointIter> {
        let mut memo = MemoTable::new();
        let mut cursor = Cursor::new(self.as_bytes());
        cursor.parse_string(&mut memo)?;
        if cursor.prefix == prefix::MEM_REF {
            return Err(BoseError::UnresolvedMemoRef);
        }
        Ok(CodepointIter {
            codepoints: cursor.codepoints()?,
        })
    }

    /// True for an octet string carrying the capability mark.
    pub fn is_capability(&self) -> BoseResult<bool> {
        let mut memo = MemoTable::new();
        let mut cursor = Cursor::new(self.as_bytes());
        cursor.parse_value(&mut memo)?;
        Ok(cursor.info.is_capability())
    }
}

/// An iterator over a string's codepoints.
pub struct CodepointIter<'a> {
    codepoints: Cursor<'a>,
}

impl<'a> Iterator for CodepointIter<'a> {
    type Item = BoseResult<u32>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.codepoints.is_exhausted() {
            return None;
        }
        match self.codepoints.parse_codepoint() {
            Ok(codepoint) => {
                self.codepoints.advance();
                Some(Ok(codepoint))
            }
            Err(e) => {
                self.codepoints.start = self.codepoints.data.len(); // stop after an error
                Some(Err(e))
            }
        }
    }
}

/// Returns the number of codepoints in an encoded string.
pub fn string_count(string: &[u8]) -> BoseResult<usize> {
    let mut memo = MemoTable::new();
    let mut cursor = Cursor::new(string);
    cursor.parse_string(&mut memo)?;
    if cursor.prefix == prefix::MEM_REF {
        return Err(BoseError::UnresolvedMemoRef);
    }
    if cursor.prefix == prefix::OCTETS {
        return Ok(cursor.value as usize); // each byte is a codepoint
    }
    let mut codepoints = cursor.codepoints()?;
    let mut count = 0;
    while !codepoints.is_exhausted() {
        codepoints.parse_codepoint()?;
        codepoints.advance();
        count += 1;
    }
    Ok(count)
}

/// Returns the codepoint at `index` of an encoded string.
pub fn string_get(string: &[u8], index: usize) -> BoseResult<u32> {
    let mut memo = MemoTable::new();
    let mut cursor = Cursor::new(string);
    cursor.parse_string(&mut memo)?;
    if cursor.prefix == prefix::MEM_REF {
        return Err(BoseError::UnresolvedMemoRef);
    }
    if cursor.prefix == prefix::OCTETS {
        let payload = cursor.payload()?;
        return match payload.get(index) {
            Some(&byte) => Ok(byte as u32),
            None => Err(BoseError::IndexOutOfBounds {
                len: payload.len(),
                index,
            }),
        };
    }
    let mut codepoints = cursor.codepoints()?;
    let mut count = 0;
    while !codepoints.is_exhausted() {
        let codepoint = codepoints.parse_codepoint()?;
        if count == index {
            return Ok(codepoint);
        }
        codepoints.advance();
        count += 1;
    }
    Err(BoseError::IndexOutOfBounds { len: count, index })
}

/// Re-encodes one codepoint in the string's own charset.
fn encode_codepoint(
    data: &mut [u8],
    mut offset: usize,
    string_prefix: u8,
    little_endian: bool,
    codepoint: u32,
) -> BoseResult<usize> {
    if codepoint > MAX_CODEPOINT {
        return Err(BoseError::InvalidCodepoint(codepoint));
    }
    match string_prefix {
        prefix::OCTETS => {
            if codepoint > 0xFF {
                return Err(BoseError::InvalidCodepoint(codepoint));
            }
            data[offset] = codepoint as u8;
            offset += 1;
        }
        prefix::UTF8 | prefix::UTF8_MEM => {
            if codepoint <= 0x7F {
                data[offset] = codepoint as u8;
                offset += 1;
            } else if codepoint <= 0x07FF {
                data[offset] = 0xC0 | ((codepoint >> 6) & 0x1F) as u8;
                data[offset + 1] = 0x80 | (codepoint & 0x3F) as u8;
                offset += 2;
            } else if codepoint <= 0xFFFF {
                data[offset] = 0xE0 | ((codepoint >> 12) & 0x0F) as u8;
                data[offset + 1] = 0x80 | ((codepoint >> 6) & 0x3F) as u8;
                data[offset + 2] = 0x80 | (codepoint & 0x3F) as u8;
                offset += 3;
            } else {
                data[offset] = 0xF0 | ((codepoint >> 18) & 0x07) as u8;
                data[offset + 1] = 0x80 | ((codepoint >> 12) & 0x3F) as u8;
                data[offset + 2] = 0x80 | ((codepoint >> 6) & 0x3F) as u8;
                data[offset + 3] = 0x80 | (codepoint & 0x3F) as u8;
                offset += 4;
            }
        }
        prefix::UTF16 | prefix::UTF16_MEM => {
            if codepoint <= 0xFFFF {
                let unit = codepoint as u16;
                offset = put_utf16_unit(data, offset, unit, little_endian);
            } else {
                let reduced = codepoint - 0x10000;
                let high = 0xD800 | ((reduced >> 10) & 0x03FF) as u16;
                let low = 0xDC00 | (reduced & 0x03FF) as u16;
                offset = put_utf16_unit(data, offset, high, little_endian);
                offset = put_utf16_unit(data, offset, low, little_endian);
            }
        }
        _ => return Err(BoseError::InvalidCodepoint(codepoint)),
    }
    Ok(offset)
}

#[inline]
fn put_utf16_unit(data: &mut [u8], offset: usize, unit: u16, little_endian: bool) -> usize {
    if little_endian {
        data[offset] = (unit & 0xFF) as u8;
        data[offset + 1] = (unit >> 8) as u8;
    } else {
        data[offset] = (unit >> 8) as u8;
        data[offset + 1] = (unit & 0xFF) as u8;
    }
    offset + 2
}

/// Produces a new string with `codepoint` inserted at `index`, preserving
/// the source string's charset. Inserting at the string's length appends;
/// past it fails. Capability strings cannot be spliced.
pub fn string_add(pool: &mut dyn Pool, string: &[u8], codepoint: u32, index: usize) -> BoseResult<Handle> {
    let mut memo = MemoTable::new();
    let mut cursor = Cursor::new(string);
    cursor.parse_string(&mut memo)?;
    if cursor.prefix == prefix::MEM_REF {
        return Err(BoseError::UnresolvedMemoRef);
    }
    if cursor.info.is_capability() {
        return Err(BoseError::CapabilityString);
    }
    let string_prefix = if cursor.prefix == prefix::STRING_0 {
        prefix::UTF8 // splicing into the empty string produces UTF-8
    } else {
        cursor.prefix
    };

    // full header with length field and BOM, plus the inserted codepoint
    let size = 12 + cursor.value as usize;
    if size > MAX_VALUE_SIZE {
        return Err(BoseError::ValueTooLarge(size));
    }
    let handle = pool.reserve(size)?;
    match write_splice(pool, handle, &cursor, string_prefix, codepoint, index) {
        Ok(()) => Ok(handle),
        Err(e) => {
            let _ = pool.release(handle); // free memory on failure
            Err(e)
        }
    }
}

fn write_splice(
    pool: &mut dyn Pool,
    handle: Handle,
    string: &Cursor<'_>,
    string_prefix: u8,
    codepoint: u32,
    index: usize,
) -> BoseResult<()> {
    let little_endian = string.info.is_negative();
    let data = pool.data_mut(handle)?;
    data[0] = string_prefix;
    data[1] = prefix::P_INT_0;
    data[2] = prefix::N_0 + 2;
    data[3] = 0;
    data[4] = 0;
    let mut end = 5;
    if string_prefix == prefix::UTF8 {
        data[end] = 0xEF;
        data[end + 1] = 0xBB;
        data[end + 2] = 0xBF;
        end += 3;
    } else if string_prefix == prefix::UTF16 {
        if little_endian {
            data[end] = 0xFF;
            data[end + 1] = 0xFE;
        } else {
            data[end] = 0xFE;
            data[end + 1] = 0xFF;
        }
        end += 2;
    }

    // copy codepoints, injecting the new value at `index`
    let mut count = 0;
    if string.prefix != prefix::STRING_0 {
        let mut codepoints = string.codepoints()?;
        while !codepoints.is_exhausted() {
            if count == index {
                end = encode_codepoint(data, end, string_prefix, little_endian, codepoint)?;
            }
            let next = codepoints.parse_codepoint()?;
            end = encode_codepoint(data, end, string_prefix, little_endian, next)?;
            codepoints.advance();
            count += 1;
        }
    }
    if count == index {
        end = encode_codepoint(data, end, string_prefix, little_endian, codepoint)?;
    }
    if index > count {
        return Err(BoseError::IndexOutOfBounds { len: count, index });
    }

    let size = end - 5;
    data[3] = (size & 0xFF) as u8;
    data[4] = (size >> 8) as u8;
    Ok(())
}

/// Writes a size field: a small integer when it fits, a fixed two-byte
/// extended integer otherwise.
fn encode_size(data: &mut [u8], mut offset: usize, size: usize) -> usize {
    if size < 127 {
        data[offset] = prefix::N_0 + size as u8;
        offset += 1;
    } else {
        data[offset] = prefix::P_INT_0;
        data[offset + 1] = prefix::N_0 + 2;
        data[offset + 2] = (size & 0xFF) as u8;
        data[offset + 3] = (size >> 8) as u8;
        offset += 4;
    }
    offset
}

/// Produces a new string holding `left`'s codepoints followed by
/// `right`'s. Both sides must use the same charset (and, for octet
/// strings, agree on the capability mark); an empty side is answered with
/// a copy of the other.
pub fn string_concat(pool: &mut dyn Pool, left: &[u8], right: &[u8]) -> BoseResult<Handle> {
    let mut left_memo = MemoTable::new();
    let mut left_cursor = Cursor::new(left);
    left_cursor.parse_string(&mut left_memo)?;
    let mut right_memo = MemoTable::new();
    let mut right_cursor = Cursor::new(right);
    right_cursor.parse_string(&mut right_memo)?;
    if left_cursor.prefix == prefix::MEM_REF || right_cursor.prefix == prefix::MEM_REF {
        return Err(BoseError::UnresolvedMemoRef);
    }

    // an empty side is answered with a copy of the other
    if left_cursor.prefix == prefix::STRING_0 {
        return Ok(pool.copy(right)?);
    }
    if right_cursor.prefix == prefix::STRING_0 {
        return Ok(pool.copy(left)?);
    }
    if left_cursor.info != right_cursor.info {
        return Err(BoseError::EncodingMismatch);
    }

    let content = left_cursor.value as usize + right_cursor.value as usize;
    let marks = match left_cursor.prefix {
        prefix::OCTETS => {
            if left_cursor.info.is_capability() {
                1
            } else {
                0
            }
        }
        prefix::UTF8 => 3,
        prefix::UTF16 => 2,
        prefix::UTF8_MEM | prefix::UTF16_MEM => 0,
        _ => return Err(BoseError::EncodingMismatch),
    };
    let declared = content + marks;
    if declared > MAX_VALUE_SIZE {
        return Err(BoseError::ValueTooLarge(declared));
    }
    let size_field = if declared < 127 { 1 } else { 4 };
    let total = 1 + size_field + marks + content;

    let handle = pool.reserve(total)?;
    let data = pool.data_mut(handle)?;
    data[0] = left_cursor.prefix;
    let mut end = encode_size(data, 1, declared);
    match left_cursor.prefix {
        prefix::OCTETS => {
            if left_cursor.info.is_capability() {
                data[end] = crate::binary::CAP_MARK;
                end += 1;
            }
        }
        prefix::UTF8 => {
            data[end] = 0xEF;
            data[end + 1] = 0xBB;
            data[end + 2] = 0xBF;
            end += 3;
        }
        prefix::UTF16 => {
            if left_cursor.info.is_negative() {
                data[end] = 0xFF;
                data[end + 1] = 0xFE;
            } else {
                data[end] = 0xFE;
                data[end + 1] = 0xFF;
            }
            end += 2;
        }
        _ => {}
    }

    // same charset on both sides, so the payload bytes copy through
    let left_payload = left_cursor.payload()?;
    data[end..end + left_payload.len()].copy_from_slice(left_payload);
    end += left_payload.len();
    let right_payload = right_cursor.payload()?;
    data[end..end + right_payload.len()].copy_from_slice(right_payload);
    Ok(handle)
}
