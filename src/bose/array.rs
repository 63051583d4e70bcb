//! Array (list) operations.

use crate::binary::{CONTAINER_HEADER_SIZE, MAX_VALUE_SIZE};
use crate::bose::{element_span, patch_container_header, write_container_header};
use crate::bose::{Bose, BoseError, BoseResult};
use crate::cursor::Cursor;
use crate::memo::MemoTable;
use crate::pool::{Handle, Pool};
use crate::prefix;

/// An array in BOSE binary format.
#[derive(Clone, Copy, Debug)]
pub struct Array<'a>(&'a Bose);

impl<'a> Array<'a> {
    #[inline]
    pub(crate) fn new(bose: &'a Bose) -> Self {
        Array(bose)
    }

    /// The underlying encoded value.
    #[inline]
    pub fn bose(&self) -> &'a Bose {
        self.0
    }

    /// Returns the number of elements. A counted array's embedded count is
    /// trusted; otherwise the payload is scanned.
    pub fn len(&self) -> BoseResult<usize> {
        let mut memo = MemoTable::new();
        let mut cursor = Cursor::new(self.0.as_bytes());
        cursor.parse_array(&mut memo)?;
        if cursor.value == 0 {
            return Ok(0);
        }
        if cursor.info.is_counted() {
            return Ok(cursor.count as usize);
        }
        let mut items = cursor.elements()?;
        let mut count = 0;
        while !items.is_exhausted() {
            items.parse_value(&mut memo)?;
            items.advance();
            count += 1;
        }
        Ok(count)
    }

    /// Returns true if the array contains no elements.
    #[inline]
    pub fn is_empty(&self) -> BoseResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Returns the element at `index` as an encoded value. Memo references
    /// are resolved to the string they reference.
    pub fn get(&self, index: usize) -> BoseResult<&'a Bose> {
        let mut memo = MemoTable::new();
        let mut cursor = Cursor::new(self.0.as_bytes());
        cursor.parse_array(&mut memo)?;
        if cursor.info.is_counted() && index as u64 >= cursor.count {
            return Err(BoseError::IndexOutOfBounds {
                len: cursor.count as usize,
                index,
            });
        }
        let mut items = cursor.elements()?;
        let mut count = 0;
        while !items.is_exhausted() {
            items.parse_value(&mut memo)?;
            if count == index {
                let bytes = element_span(&items, &memo);
                return Ok(unsafe { Bose::new_unchecked(bytes) });
            }
            items.advance();
            count += 1;
        }
        Err(BoseError::IndexOutOfBounds { len: count, index })
    }

    /// Gets an iterator over the elements of the array.
    pub fn iter(&self) -> BoseResult<ArrayIter<'a>> {
        let mut memo = MemoTable::new();
        let mut cursor = Cursor::new(self.0.as_bytes());
        cursor.parse_array(&mut memo)?;
        Ok(ArrayIter {
            items: cursor.elements()?,
            memo,
        })
    }
}

/// An iterator over an array's elements.
pub struct ArrayIter<'a> {
    items: Cursor<'a>,
    memo: MemoTable<'a>,
}

impl<'a> Iterator for ArrayIter<'a> {
    type Item = BoseResult<&'a Bose>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.items.is_exhausted() {
            return None;
        }
        if let Err(e) = self.items.parse_value(&mut self.memo) {
            self.items.start = self.items.data.len(); // stop after an error
            return Some(Err(e));
        }
        let bytes = element_span(&self.items, &self.memo);
        self.items.advance();
        Some(Ok(unsafe { Bose::new_unchecked(bytes) }))
    }
}

/// Produces a new array holding `array`'s elements with `item` inserted at
/// `index`. Inserting at the array's length appends; past it fails. The
/// inputs are never mutated; the result is allocated from `pool` and owned
/// by the caller.
pub fn array_add(pool: &mut dyn Pool, array: &[u8], item: &[u8], index: usize) -> BoseResult<Handle> {
    let mut memo = MemoTable::new();
    let mut cursor = Cursor::new(array);
    cursor.parse_array(&mut memo)?;
    let mut item_memo = MemoTable::new();
    let mut item_cursor = Cursor::new(item);
    item_cursor.parse_value(&mut item_memo)?;
    if cursor.info.is_counted() && index as u64 > cursor.count {
        return Err(BoseError::IndexOutOfBounds {
            len: cursor.count as usize,
            index,
        });
    }

    // margin for size/count growth
    let size = 8 + cursor.span().len() + item_cursor.span().len();
    if size > MAX_VALUE_SIZE {
        return Err(BoseError::ValueTooLarge(size));
    }
    let handle = pool.reserve(size)?;
    match write_insert(pool, handle, &cursor, &item_cursor, index, &mut memo) {
        Ok(()) => Ok(handle),
        Err(e) => {
            let _ = pool.release(handle); // free memory on failure
            Err(e)
        }
    }
}

fn write_insert<'a>(
    pool: &mut dyn Pool,
    handle: Handle,
    array: &Cursor<'a>,
    item: &Cursor<'_>,
    index: usize,
    memo: &mut MemoTable<'a>,
) -> BoseResult<()> {
    let data = pool.data_mut(handle)?;
    write_container_header(data, prefix::ARRAY_N);
    let mut end = CONTAINER_HEADER_SIZE;

    let mut items = array.elements()?;
    let mut count: usize = 0;

    // elements before the insertion point
    while count < index && !items.is_exhausted() {
        items.parse_value(memo)?;
        let span = items.span();
        data[end..end + span.len()].copy_from_slice(span);
        end += span.len();
        items.advance();
        count += 1;
    }

    // the new item
    let span = item.span();
    data[end..end + span.len()].copy_from_slice(span);
    end += span.len();

    // elements after the insertion point
    while !items.is_exhausted() {
        items.parse_value(memo)?;
        let span = items.span();
        data[end..end + span.len()].copy_from_slice(span);
        end += span.len();
        items.advance();
        count += 1;
    }

    if index > count {
        return Err(BoseError::IndexOutOfBounds { len: count, index });
    }
    patch_container_header(data, end, (count + 1) as u64);
    Ok(())
}

/// Produces a new array holding all of `left`'s elements followed by all of
/// `right`'s.
pub fn array_concat(pool: &mut dyn Pool, left: &[u8], right: &[u8]) -> BoseResult<Handle> {
    let mut left_memo = MemoTable::new();
    let mut left_cursor = Cursor::new(left);
    left_cursor.parse_array(&mut left_memo)?;
    let left_count = element_count(&left_cursor, &mut left_memo)?;

    let mut right_memo = MemoTable::new();
    let mut right_cursor = Cursor::new(right);
    right_cursor.parse_array(&mut right_memo)?;
    let right_count = element_count(&right_cursor, &mut right_memo)?;

    let left_payload = left_cursor.payload()?;
    let right_payload = right_cursor.payload()?;
    let size = CONTAINER_HEADER_SIZE + left_payload.len() + right_payload.len();
    if size > MAX_VALUE_SIZE {
        return Err(BoseError::ValueTooLarge(size));
    }
    let handle = pool.reserve(size)?;
    let data = pool.data_mut(handle)?;
    write_container_header(data, prefix::ARRAY_N);
    let mut end = CONTAINER_HEADER_SIZE;
    data[end..end + left_payload.len()].copy_from_slice(left_payload);
    end += left_payload.len();
    data[end..end + right_payload.len()].copy_from_slice(right_payload);
    end += right_payload.len();
    patch_container_header(data, end, left_count + right_count);
    Ok(handle)
}

/// Element count of a scanned array cursor: the embedded count when
/// present, a payload scan otherwise.
fn element_count<'a>(cursor: &Cursor<'a>, memo: &mut MemoTable<'a>) -> BoseResult<u64> {
    if cursor.value == 0 {
        return Ok(0);
    }
    if cursor.info.is_counted() {
        return Ok(cursor.count);
    }
    let mut items = cursor.elements()?;
    let mut count = 0;
    while !items.is_exhausted() {
        items.parse_value(memo)?;
        items.advance();
        count += 1;
    }
    Ok(count)
}
