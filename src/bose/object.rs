//! Object (dictionary) operations.

use crate::binary::{CONTAINER_HEADER_SIZE, MAX_VALUE_SIZE};
use crate::bose::string::decode;
use crate::bose::{element_span, patch_container_header, write_container_header};
use crate::bose::{Bose, BoseError, BoseResult};
use crate::compare::parse_equiv;
use crate::cursor::Cursor;
use crate::memo::MemoTable;
use crate::pool::{Handle, Pool};
use crate::prefix;
use crate::Scalar;

/// An object in BOSE binary format.
///
/// The payload is a flat sequence of key/value pairs in declaration order.
/// Duplicate keys are permitted; lookup is first-match-wins on a forward
/// scan.
#[derive(Clone, Copy, Debug)]
pub struct Object<'a>(&'a Bose);

impl<'a> Object<'a> {
    #[inline]
    pub(crate) fn new(bose: &'a Bose) -> Self {
        Object(bose)
    }

    /// The underlying encoded value.
    #[inline]
    pub fn bose(&self) -> &'a Bose {
        self.0
    }

    /// Returns the number of properties. The count is always recomputed by
    /// scanning; an embedded count hint is informational only.
    pub fn len(&self) -> BoseResult<usize> {
        let mut memo = MemoTable::new();
        let mut cursor = Cursor::new(self.0.as_bytes());
        cursor.parse_object(&mut memo)?;
        if cursor.value == 0 {
            return Ok(0);
        }
        let mut props = cursor.elements()?;
        Ok(props.property_count(&mut memo)? as usize)
    }

    /// Returns true if the object contains no properties.
    #[inline]
    pub fn is_empty(&self) -> BoseResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Returns true if the object binds the given key.
    #[inline]
    pub fn contains_key<T: AsRef<str>>(&self, key: T) -> BoseResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Returns the value bound to `key`, if any. The key is matched by
    /// equivalence, so its encoding in the object is irrelevant.
    #[inline]
    pub fn get<T: AsRef<str>>(&self, key: T) -> BoseResult<Option<&'a Bose>> {
        let name = Scalar::string(key.as_ref())?;
        self.get_encoded(&name)
    }

    /// Returns the value bound to an already-encoded key, if any.
    pub fn get_encoded(&self, name: &Bose) -> BoseResult<Option<&'a Bose>> {
        let mut memo = MemoTable::new();
        let mut cursor = Cursor::new(self.0.as_bytes());
        cursor.parse_object(&mut memo)?;
        if cursor.value == 0 {
            return Ok(None);
        }
        let mut name_memo = MemoTable::new();
        let mut name_cursor = Cursor::new(name.as_bytes());
        name_cursor.parse_string(&mut name_memo)?;
        let mut props = cursor.elements()?;
        if props.find_property(&mut memo, &name_cursor, &mut name_memo)? {
            let bytes = element_span(&props, &memo);
            Ok(Some(unsafe { Bose::new_unchecked(bytes) }))
        } else {
            Ok(None)
        }
    }

    /// Gets an iterator over the entries of the object.
    pub fn iter(&self) -> BoseResult<ObjectIter<'a>> {
        let mut memo = MemoTable::new();
        let mut cursor = Cursor::new(self.0.as_bytes());
        cursor.parse_object(&mut memo)?;
        Ok(ObjectIter {
            props: cursor.elements()?,
            memo,
        })
    }

    /// Gets an iterator over the keys of the object.
    pub fn keys(&self) -> BoseResult<KeyIter<'a>> {
        Ok(KeyIter { inner: self.iter()? })
    }

    /// Gets an iterator over the values of the object.
    pub fn values(&self) -> BoseResult<ValueIter<'a>> {
        Ok(ValueIter { inner: self.iter()? })
    }
}

/// An iterator over an object's entries.
pub struct ObjectIter<'a> {
    props: Cursor<'a>,
    memo: MemoTable<'a>,
}

impl<'a> ObjectIter<'a> {
    fn next_entry(&mut self) -> BoseResult<(String, &'a Bose)> {
        self.props.parse_string(&mut self.memo)?; // key
        let key = decode(&self.props, &mut self.memo)?;
        self.props.advance();
        self.props.parse_value(&mut self.memo)?; // value
        let bytes = element_span(&self.props, &self.memo);
        self.props.advance();
        Ok((key, unsafe { Bose::new_unchecked(bytes) }))
    }
}

impl<'a> Iterator for ObjectIter<'a> {
    type Item = BoseResult<(String, &'a Bose)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.props.is_exhausted() {
            return None;
        }
        match self.next_entry() {
            Ok(entry) => Some(Ok(entry)),
            Err(e) => {
                self.props.start = self.props.data.len(); // stop after an error
                Some(Err(e))
            }
        }
    }
}

/// An iterator over an object's keys.
pub struct KeyIter<'a> {
    inner: ObjectIter<'a>,
}

impl<'a> Iterator for KeyIter<'a> {
    type Item = BoseResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.inner.next()?.map(|(key, _)| key))
    }
}

/// An iterator over an object's values.
pub struct ValueIter<'a> {
    inner: ObjectIter<'a>,
}

impl<'a> Iterator for ValueIter<'a> {
    type Item = BoseResult<&'a Bose>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.inner.next()?.map(|(_, value)| value))
    }
}

/// Produces a new object with `name` bound to `value`. Binding is
/// last-write-wins: the new property leads the payload and any previous
/// binding of an equivalent key is dropped while copying, so the recomputed
/// property count stays exact. The inputs are never mutated; the result is
/// allocated from `pool` and owned by the caller.
pub fn object_add(pool: &mut dyn Pool, object: &[u8], name: &[u8], value: &[u8]) -> BoseResult<Handle> {
    let mut memo = MemoTable::new();
    let mut cursor = Cursor::new(object);
    cursor.parse_object(&mut memo)?;
    let mut name_memo = MemoTable::new();
    let mut name_cursor = Cursor::new(name);
    name_cursor.parse_string(&mut name_memo)?;
    let mut value_memo = MemoTable::new();
    let mut value_cursor = Cursor::new(value);
    value_cursor.parse_value(&mut value_memo)?;

    // margin for size/count growth
    let size = 8 + cursor.span().len() + name_cursor.span().len() + value_cursor.span().len();
    if size > MAX_VALUE_SIZE {
        return Err(BoseError::ValueTooLarge(size));
    }
    let handle = pool.reserve(size)?;
    match write_bind(
        pool,
        handle,
        &cursor,
        &mut memo,
        &name_cursor,
        &mut name_memo,
        &value_cursor,
    ) {
        Ok(()) => Ok(handle),
        Err(e) => {
            let _ = pool.release(handle); // free memory on failure
            Err(e)
        }
    }
}

fn write_bind<'a, 'k>(
    pool: &mut dyn Pool,
    handle: Handle,
    object: &Cursor<'a>,
    memo: &mut MemoTable<'a>,
    name: &Cursor<'k>,
    name_memo: &mut MemoTable<'k>,
    value: &Cursor<'_>,
) -> BoseResult<()> {
    let data = pool.data_mut(handle)?;
    write_container_header(data, prefix::OBJECT_N);
    let mut end = CONTAINER_HEADER_SIZE;

    // the new binding leads the payload
    let span = name.span();
    data[end..end + span.len()].copy_from_slice(span);
    end += span.len();
    let span = value.span();
    data[end..end + span.len()].copy_from_slice(span);
    end += span.len();
    let mut count: u64 = 1;

    // copy the original properties, dropping any previous binding of `name`
    let mut props = object.elements()?;
    while !props.is_exhausted() {
        props.parse_string(memo)?; // property name
        let duplicate = parse_equiv(name, name_memo, &props, memo)?;
        if !duplicate {
            let span = props.span();
            data[end..end + span.len()].copy_from_slice(span);
            end += span.len();
        }
        props.advance();
        props.parse_value(memo)?; // property value
        if !duplicate {
            let span = props.span();
            data[end..end + span.len()].copy_from_slice(span);
            end += span.len();
            count += 1;
        }
        props.advance();
    }

    patch_container_header(data, end, count);
    Ok(())
}

/// Produces a new object holding every property of `right` plus those
/// properties of `left` whose keys `right` does not bind; on a duplicate
/// key, the right side wins.
pub fn object_concat(pool: &mut dyn Pool, left: &[u8], right: &[u8]) -> BoseResult<Handle> {
    let mut left_memo = MemoTable::new();
    let mut left_cursor = Cursor::new(left);
    left_cursor.parse_object(&mut left_memo)?;
    let mut right_memo = MemoTable::new();
    let mut right_cursor = Cursor::new(right);
    right_cursor.parse_object(&mut right_memo)?;

    let right_count = {
        let mut props = right_cursor.elements()?;
        props.property_count(&mut right_memo)?
    };

    let left_payload_len = left_cursor.payload()?.len();
    let right_payload = right_cursor.payload()?;
    let size = CONTAINER_HEADER_SIZE + left_payload_len + right_payload.len();
    if size > MAX_VALUE_SIZE {
        return Err(BoseError::ValueTooLarge(size));
    }
    let handle = pool.reserve(size)?;
    match write_merge(
        pool,
        handle,
        &left_cursor,
        &mut left_memo,
        &right_cursor,
        &mut right_memo,
        right_count,
    ) {
        Ok(()) => Ok(handle),
        Err(e) => {
            let _ = pool.release(handle); // free memory on failure
            Err(e)
        }
    }
}

fn write_merge<'l, 'r>(
    pool: &mut dyn Pool,
    handle: Handle,
    left: &Cursor<'l>,
    left_memo: &mut MemoTable<'l>,
    right: &Cursor<'r>,
    right_memo: &mut MemoTable<'r>,
    right_count: u64,
) -> BoseResult<()> {
    let data = pool.data_mut(handle)?;
    write_container_header(data, prefix::OBJECT_N);
    let mut end = CONTAINER_HEADER_SIZE;

    // all properties from the right
    let right_payload = right.payload()?;
    data[end..end + right_payload.len()].copy_from_slice(right_payload);
    end += right_payload.len();
    let mut count = right_count;

    // properties from the left, filtering keys the right already binds
    let mut props = left.elements()?;
    while !props.is_exhausted() {
        props.parse_string(left_memo)?; // property name
        let mut right_props = right.elements()?;
        let duplicate = right_props.find_property(right_memo, &props, left_memo)?;
        if !duplicate {
            let span = props.span();
            data[end..end + span.len()].copy_from_slice(span);
            end += span.len();
        }
        props.advance();
        props.parse_value(left_memo)?; // property value
        if !duplicate {
            let span = props.span();
            data[end..end + span.len()].copy_from_slice(span);
            end += span.len();
            count += 1;
        }
        props.advance();
    }

    patch_container_header(data, end, count);
    Ok(())
}
