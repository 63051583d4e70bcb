//! Memory pools.
//!
//! Every value-producing operation allocates through the [`Pool`]
//! capability: `reserve` raw space, `copy` an encoded value, `share` an
//! existing allocation, `release` it. Plain heap, reference-counted, and
//! linear arena pools implement the same capability, so builders are
//! agnostic to strategy; the choice is made where the pool is constructed.
//! [`AuditPool`] decorates any of them with allocation tracking for leak
//! and double-free detection.

use crate::cursor::Cursor;
use crate::memo::MemoTable;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::panic::Location;

/// Possible errors that can arise during pool operations.
#[derive(Debug)]
pub enum PoolError {
    /// The pool cannot satisfy an allocation of the requested size.
    Exhausted { requested: usize, available: usize },
    /// The handle does not refer to a live allocation of this pool.
    UnknownHandle,
    /// The allocation has already been released.
    DoubleRelease,
    /// The bytes passed to `copy` do not hold a well-formed value.
    InvalidValue,
}

impl Display for PoolError {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolError::Exhausted { requested, available } => {
                write!(f, "pool exhausted: requested {} bytes, {} available", requested, available)
            }
            PoolError::UnknownHandle => write!(f, "handle does not belong to this pool"),
            PoolError::DoubleRelease => write!(f, "allocation already released"),
            PoolError::InvalidValue => write!(f, "copied bytes are not a well-formed value"),
        }
    }
}

impl Error for PoolError {}

pub type PoolResult<T> = std::result::Result<T, PoolError>;

/// An allocation owned by some pool. Handles are only meaningful to the
/// pool that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(u32);

impl Handle {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Finds the exact encoded span of a value, for `copy`.
fn value_span(value: &[u8]) -> PoolResult<&[u8]> {
    let mut memo = MemoTable::new();
    let mut cursor = Cursor::new(value);
    if cursor.parse_value(&mut memo).is_err() {
        return Err(PoolError::InvalidValue);
    }
    Ok(&value[cursor.start..cursor.end])
}

/// The three-operation allocation capability, plus data access.
pub trait Pool {
    /// Allocates `size` zeroed bytes.
    fn reserve(&mut self, size: usize) -> PoolResult<Handle>;

    /// Produces an owned buffer holding an equivalent encoded value. The
    /// value's span is found by scanning, then duplicated.
    fn copy(&mut self, value: &[u8]) -> PoolResult<Handle> {
        let span = value_span(value)?;
        let handle = self.reserve(span.len())?;
        self.data_mut(handle)?.copy_from_slice(span);
        Ok(handle)
    }

    /// Produces another owned reference to an existing allocation: aliased
    /// where the pool supports sharing, duplicated otherwise.
    fn share(&mut self, handle: Handle) -> PoolResult<Handle>;

    /// Gives up ownership of an allocation.
    fn release(&mut self, handle: Handle) -> PoolResult<()>;

    /// The allocation's bytes.
    fn data(&self, handle: Handle) -> PoolResult<&[u8]>;

    /// The allocation's bytes, writable.
    fn data_mut(&mut self, handle: Handle) -> PoolResult<&mut [u8]>;
}

/// Thin wrapper over the global allocator; `release` frees unconditionally
/// and `share` degenerates to a deep copy.
#[derive(Default)]
pub struct HeapPool {
    blocks: Vec<Option<Box<[u8]>>>,
    free: Vec<usize>,
}

impl HeapPool {
    #[inline]
    pub fn new() -> Self {
        HeapPool::default()
    }

    fn slot(&mut self, block: Box<[u8]>) -> Handle {
        match self.free.pop() {
            Some(index) => {
                self.blocks[index] = Some(block);
                Handle(index as u32)
            }
            None => {
                self.blocks.push(Some(block));
                Handle((self.blocks.len() - 1) as u32)
            }
        }
    }
}

impl Pool for HeapPool {
    fn reserve(&mut self, size: usize) -> PoolResult<Handle> {
        Ok(self.slot(vec![0u8; size].into_boxed_slice()))
    }

    fn share(&mut self, handle: Handle) -> PoolResult<Handle> {
        let block: Box<[u8]> = self.data(handle)?.into();
        Ok(self.slot(block))
    }

    fn release(&mut self, handle: Handle) -> PoolResult<()> {
        let slot = self
            .blocks
            .get_mut(handle.index())
            .ok_or(PoolError::UnknownHandle)?;
        if slot.take().is_none() {
            return Err(PoolError::DoubleRelease);
        }
        self.free.push(handle.index());
        Ok(())
    }

    fn data(&self, handle: Handle) -> PoolResult<&[u8]> {
        match self.blocks.get(handle.index()) {
            Some(Some(block)) => Ok(block),
            Some(None) => Err(PoolError::DoubleRelease),
            None => Err(PoolError::UnknownHandle),
        }
    }

    fn data_mut(&mut self, handle: Handle) -> PoolResult<&mut [u8]> {
        match self.blocks.get_mut(handle.index()) {
            Some(Some(block)) => Ok(block),
            Some(None) => Err(PoolError::DoubleRelease),
            None => Err(PoolError::UnknownHandle),
        }
    }
}

struct CountedBlock {
    bytes: Box<[u8]>,
    refs: u32,
}

/// Reference-counted pool: `share` increments an allocation's count and
/// aliases the handle; `release` decrements and frees at zero. Releasing a
/// dead handle is a reported error.
#[derive(Default)]
pub struct CountedPool {
    blocks: Vec<Option<CountedBlock>>,
    free: Vec<usize>,
}

impl CountedPool {
    #[inline]
    pub fn new() -> Self {
        CountedPool::default()
    }

    /// Number of live allocations.
    pub fn live(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_some()).count()
    }

    /// Reference count of a live allocation.
    pub fn ref_count(&self, handle: Handle) -> PoolResult<u32> {
        match self.blocks.get(handle.index()) {
            Some(Some(block)) => Ok(block.refs),
            Some(None) => Err(PoolError::DoubleRelease),
            None => Err(PoolError::UnknownHandle),
        }
    }
}

impl Pool for CountedPool {
    fn reserve(&mut self, size: usize) -> PoolResult<Handle> {
        let block = CountedBlock {
            bytes: vec![0u8; size].into_boxed_slice(),
            refs: 1,
        };
        match self.free.pop() {
            Some(index) => {
                self.blocks[index] = Some(block);
                Ok(Handle(index as u32))
            }
            None => {
                self.blocks.push(Some(block));
                Ok(Handle((self.blocks.len() - 1) as u32))
            }
        }
    }

    fn share(&mut self, handle: Handle) -> PoolResult<Handle> {
        match self.blocks.get_mut(handle.index()) {
            Some(Some(block)) => {
                block.refs += 1;
                Ok(handle)
            }
            Some(None) => Err(PoolError::DoubleRelease),
            None => Err(PoolError::UnknownHandle),
        }
    }

    fn release(&mut self, handle: Handle) -> PoolResult<()> {
        let slot = self
            .blocks
            .get_mut(handle.index())
            .ok_or(PoolError::UnknownHandle)?;
        match slot {
            Some(block) => {
                block.refs -= 1;
                if block.refs == 0 {
                    *slot = None;
                    self.free.push(handle.index());
                }
                Ok(())
            }
            None => Err(PoolError::DoubleRelease),
        }
    }

    fn data(&self, handle: Handle) -> PoolResult<&[u8]> {
        match self.blocks.get(handle.index()) {
            Some(Some(block)) => Ok(&block.bytes),
            Some(None) => Err(PoolError::DoubleRelease),
            None => Err(PoolError::UnknownHandle),
        }
    }

    fn data_mut(&mut self, handle: Handle) -> PoolResult<&mut [u8]> {
        match self.blocks.get_mut(handle.index()) {
            Some(Some(block)) => Ok(&mut block.bytes),
            Some(None) => Err(PoolError::DoubleRelease),
            None => Err(PoolError::UnknownHandle),
        }
    }
}

/// Linear arena: a single block with a monotonic bump offset. `reserve`
/// fails once the block is exhausted; `release` is a no-op, and the whole
/// arena is reclaimed at once with [`reset`](ArenaPool::reset).
pub struct ArenaPool {
    buffer: Box<[u8]>,
    offset: usize,
    spans: Vec<(usize, usize)>,
}

impl ArenaPool {
    pub fn new(capacity: usize) -> Self {
        ArenaPool {
            buffer: vec![0u8; capacity].into_boxed_slice(),
            offset: 0,
            spans: Vec::new(),
        }
    }

    /// Bytes handed out so far.
    #[inline]
    pub fn used(&self) -> usize {
        self.offset
    }

    /// Reclaims the whole arena, invalidating every handle.
    pub fn reset(&mut self) {
        self.offset = 0;
        self.spans.clear();
    }
}

impl Pool for ArenaPool {
    fn reserve(&mut self, size: usize) -> PoolResult<Handle> {
        if self.offset + size > self.buffer.len() {
            return Err(PoolError::Exhausted {
                requested: size,
                available: self.buffer.len() - self.offset,
            });
        }
        let span = (self.offset, self.offset + size);
        self.offset += size;
        self.spans.push(span);
        Ok(Handle((self.spans.len() - 1) as u32))
    }

    fn share(&mut self, handle: Handle) -> PoolResult<Handle> {
        // nothing is ever freed individually, so aliasing is free
        self.data(handle)?;
        Ok(handle)
    }

    fn release(&mut self, _handle: Handle) -> PoolResult<()> {
        Ok(()) // bulk-freed by reset
    }

    fn data(&self, handle: Handle) -> PoolResult<&[u8]> {
        let &(from, to) = self.spans.get(handle.index()).ok_or(PoolError::UnknownHandle)?;
        Ok(&self.buffer[from..to])
    }

    fn data_mut(&mut self, handle: Handle) -> PoolResult<&mut [u8]> {
        let &(from, to) = self.spans.get(handle.index()).ok_or(PoolError::UnknownHandle)?;
        Ok(&mut self.buffer[from..to])
    }
}

/// One tracked allocation of an [`AuditPool`].
#[derive(Debug)]
pub struct AuditRecord {
    pub handle: Handle,
    pub size: usize,
    pub reserved_at: &'static Location<'static>,
    pub released_at: Option<&'static Location<'static>>,
}

/// Decorator recording every allocation and release of the wrapped pool.
/// A verification aid, not required for correctness.
pub struct AuditPool<P: Pool> {
    inner: P,
    records: Vec<AuditRecord>,
}

impl<P: Pool> AuditPool<P> {
    #[inline]
    pub fn new(inner: P) -> Self {
        AuditPool {
            inner,
            records: Vec::new(),
        }
    }

    #[track_caller]
    pub fn reserve(&mut self, size: usize) -> PoolResult<Handle> {
        self.reserve_at(size, Location::caller())
    }

    #[track_caller]
    pub fn copy(&mut self, value: &[u8]) -> PoolResult<Handle> {
        self.copy_at(value, Location::caller())
    }

    #[track_caller]
    pub fn share(&mut self, handle: Handle) -> PoolResult<Handle> {
        self.share_at(handle, Location::caller())
    }

    #[track_caller]
    pub fn release(&mut self, handle: Handle) -> PoolResult<()> {
        self.release_at(handle, Location::caller())
    }

    /// Every allocation that has not been released.
    pub fn leaks(&self) -> Vec<&AuditRecord> {
        self.records.iter().filter(|r| r.released_at.is_none()).collect()
    }

    /// Marks every outstanding record released at once, for pool teardown.
    #[track_caller]
    pub fn release_all(&mut self) {
        let site = Location::caller();
        for record in &mut self.records {
            if record.released_at.is_none() {
                record.released_at = Some(site);
            }
        }
    }

    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    pub fn into_inner(self) -> P {
        self.inner
    }

    fn reserve_at(&mut self, size: usize, site: &'static Location<'static>) -> PoolResult<Handle> {
        let handle = self.inner.reserve(size)?;
        self.records.push(AuditRecord {
            handle,
            size,
            reserved_at: site,
            released_at: None,
        });
        Ok(handle)
    }

    fn copy_at(&mut self, value: &[u8], site: &'static Location<'static>) -> PoolResult<Handle> {
        let handle = self.inner.copy(value)?;
        let size = self.inner.data(handle)?.len();
        self.records.push(AuditRecord {
            handle,
            size,
            reserved_at: site,
            released_at: None,
        });
        Ok(handle)
    }

    fn share_at(&mut self, handle: Handle, site: &'static Location<'static>) -> PoolResult<Handle> {
        let shared = self.inner.share(handle)?;
        let size = self.inner.data(shared)?.len();
        self.records.push(AuditRecord {
            handle: shared,
            size,
            reserved_at: site,
            released_at: None,
        });
        Ok(shared)
    }

    fn release_at(&mut self, handle: Handle, site: &'static Location<'static>) -> PoolResult<()> {
        self.inner.release(handle)?;
        // mark the most recent live record for this handle
        for record in self.records.iter_mut().rev() {
            if record.handle == handle && record.released_at.is_none() {
                record.released_at = Some(site);
                return Ok(());
            }
        }
        Err(PoolError::UnknownHandle)
    }
}

impl<P: Pool> Pool for AuditPool<P> {
    fn reserve(&mut self, size: usize) -> PoolResult<Handle> {
        self.reserve_at(size, Location::caller())
    }

    fn copy(&mut self, value: &[u8]) -> PoolResult<Handle> {
        self.copy_at(value, Location::caller())
    }

    fn share(&mut self, handle: Handle) -> PoolResult<Handle> {
        self.share_at(handle, Location::caller())
    }

    fn release(&mut self, handle: Handle) -> PoolResult<()> {
        self.release_at(handle, Location::caller())
    }

    fn data(&self, handle: Handle) -> PoolResult<&[u8]> {
        self.inner.data(handle)
    }

    fn data_mut(&mut self, handle: Handle) -> PoolResult<&mut [u8]> {
        self.inner.data_mut(handle)
    }
}
