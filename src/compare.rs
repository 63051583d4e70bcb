//! Structural comparison.
//!
//! Strict equality and abstract equivalence share one recursive engine so
//! the two can never diverge. Strings are compared as decoded codepoint
//! sequences and numbers byte-wise under sign extension, so different
//! valid encodings of the same content (octets, UTF-8, UTF-16 of either
//! endianness, with or without BOM; integer payloads of any width) compare
//! equal under both entry points.

use crate::cursor::Cursor;
use crate::memo::MemoTable;
use crate::prefix;
use crate::bose::{BoseError, BoseResult};
use crate::DataType;

/// Strict structural equality of two encoded values.
pub fn value_equal(x: &[u8], y: &[u8]) -> BoseResult<bool> {
    if x.as_ptr() == y.as_ptr() && x.len() == y.len() {
        return Ok(true); // identical spans are equal
    }
    let mut x_memo = MemoTable::new();
    let mut y_memo = MemoTable::new();
    let mut x_cursor = Cursor::new(x);
    let mut y_cursor = Cursor::new(y);
    parse_equal(&mut x_cursor, &mut x_memo, &mut y_cursor, &mut y_memo)
}

/// Abstract equivalence of two encoded values.
pub fn value_equiv(x: &[u8], y: &[u8]) -> BoseResult<bool> {
    if x.as_ptr() == y.as_ptr() && x.len() == y.len() {
        return Ok(true); // identical spans are equivalent
    }
    let mut x_memo = MemoTable::new();
    let mut y_memo = MemoTable::new();
    let mut x_cursor = Cursor::new(x);
    let mut y_cursor = Cursor::new(y);
    x_cursor.parse_value(&mut x_memo)?;
    y_cursor.parse_value(&mut y_memo)?;
    parse_equiv(&x_cursor, &mut x_memo, &y_cursor, &mut y_memo)
}

/// Scans a value on each side, then compares. Each cursor is left
/// describing the value it scanned, so sequences can be compared by
/// advancing both sides.
pub fn parse_equal<'x, 'y>(
    x: &mut Cursor<'x>,
    x_memo: &mut MemoTable<'x>,
    y: &mut Cursor<'y>,
    y_memo: &mut MemoTable<'y>,
) -> BoseResult<bool> {
    x.parse_value(x_memo)?;
    y.parse_value(y_memo)?;
    parse_equiv(x, x_memo, y, y_memo)
}

/// Compares two values that have already been scanned with `parse_value`.
/// Usable mid-scan, which is what dictionary-key lookup relies on.
pub fn parse_equiv<'x, 'y>(
    x: &Cursor<'x>,
    x_memo: &mut MemoTable<'x>,
    y: &Cursor<'y>,
    y_memo: &mut MemoTable<'y>,
) -> BoseResult<bool> {
    if x.info.base() != y.info.base() {
        return Ok(false);
    }
    match x.info.base() {
        DataType::Number => number_equiv(x, y),
        DataType::String => string_equiv(x, x_memo, y, y_memo),
        DataType::Array => array_equiv(x, x_memo, y, y_memo),
        DataType::Object => object_equiv(x, x_memo, y, y_memo),
        _ => Ok(x.prefix == y.prefix),
    }
}

/// Byte-wise comparison under sign extension to the longer operand.
fn number_equiv(x: &Cursor, y: &Cursor) -> BoseResult<bool> {
    if x.info.is_counted() || y.info.is_counted() {
        return Err(BoseError::UnsupportedNumber); // no unum support
    }
    let x_small = [(x.value & 0xFF) as u8];
    let x_digits: &[u8] = if x.info.is_sized() { x.payload()? } else { &x_small };
    let y_small = [(y.value & 0xFF) as u8];
    let y_digits: &[u8] = if y.info.is_sized() { y.payload()? } else { &y_small };
    let x_sign: u8 = if x.info.is_negative() { 0xFF } else { 0x00 };
    let y_sign: u8 = if y.info.is_negative() { 0xFF } else { 0x00 };
    for i in 0..x_digits.len().max(y_digits.len()) {
        let x_byte = x_digits.get(i).copied().unwrap_or(x_sign);
        let y_byte = y_digits.get(i).copied().unwrap_or(y_sign);
        if x_byte != y_byte {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Codepoint-sequence comparison; the encodings are irrelevant, and both
/// payloads must exhaust together.
fn string_equiv<'x, 'y>(
    x: &Cursor<'x>,
    x_memo: &mut MemoTable<'x>,
    y: &Cursor<'y>,
    y_memo: &mut MemoTable<'y>,
) -> BoseResult<bool> {
    let x_resolved;
    let x = if x.prefix == prefix::MEM_REF {
        x_resolved = x.resolve_memo(x_memo)?;
        &x_resolved
    } else {
        x
    };
    let y_resolved;
    let y = if y.prefix == prefix::MEM_REF {
        y_resolved = y.resolve_memo(y_memo)?;
        &y_resolved
    } else {
        y
    };
    let mut x_code = x.codepoints()?;
    let mut y_code = y.codepoints()?;
    while !x_code.is_exhausted() && !y_code.is_exhausted() {
        if x_code.parse_codepoint()? != y_code.parse_codepoint()? {
            return Ok(false);
        }
        x_code.advance();
        y_code.advance();
    }
    // one string must not end before the other
    Ok(x_code.is_exhausted() && y_code.is_exhausted())
}

/// Positional recursive comparison of corresponding elements.
fn array_equiv<'x, 'y>(
    x: &Cursor<'x>,
    x_memo: &mut MemoTable<'x>,
    y: &Cursor<'y>,
    y_memo: &mut MemoTable<'y>,
) -> BoseResult<bool> {
    let mut x_item = x.elements()?;
    let mut y_item = y.elements()?;
    while !x_item.is_exhausted() && !y_item.is_exhausted() {
        if !parse_equal(&mut x_item, x_memo, &mut y_item, y_memo)? {
            return Ok(false);
        }
        x_item.advance();
        y_item.advance();
    }
    // one array must not end before the other
    Ok(x_item.is_exhausted() && y_item.is_exhausted())
}

/// Order-insensitive comparison gated on recomputed property counts; an
/// embedded count hint is advisory only and never consulted.
fn object_equiv<'x, 'y>(
    x: &Cursor<'x>,
    x_memo: &mut MemoTable<'x>,
    y: &Cursor<'y>,
    y_memo: &mut MemoTable<'y>,
) -> BoseResult<bool> {
    let mut x_prop = x.elements()?;
    let mut y_prop = y.elements()?;
    let x_count = x_prop.property_count(x_memo)?;
    let y_count = y_prop.property_count(y_memo)?;
    if x_count != y_count {
        return Ok(false);
    }
    while !x_prop.is_exhausted() {
        x_prop.parse_string(x_memo)?; // key
        let key = x_prop.clone();
        x_prop.advance();
        x_prop.parse_value(x_memo)?; // value
        if !y_prop.find_property(y_memo, &key, x_memo)? {
            return Ok(false); // missing property
        }
        if !parse_equiv(&x_prop, x_memo, &y_prop, y_memo)? {
            return Ok(false); // mismatched property value
        }
        y_prop.start = 0; // restart the search for the next key
        x_prop.advance();
    }
    Ok(true)
}
