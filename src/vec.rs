//! Vec extension.

use crate::binary::{small_int, MAX_VALUE_SIZE};
use crate::builder::{BuildError, BuildResult};
use crate::prefix;

pub(crate) trait VecExt {
    fn push_prefix(&mut self, prefix_byte: u8);
    /// Minimal-width integer encoding: direct-coded when small, extended
    /// little-endian otherwise.
    fn push_integer(&mut self, value: i64);
    /// Like `push_integer`, but keeps values above `i64::MAX` positive by
    /// emitting a full-width extended integer.
    fn push_unsigned(&mut self, value: u64);
    /// Size field: a small integer when it fits, a fixed two-byte extended
    /// integer otherwise. The caller bounds `size` beforehand.
    fn push_size(&mut self, size: usize);
    /// A UTF-8 string value.
    fn push_str_utf8(&mut self, s: &str) -> BuildResult<()>;
    /// A container with the canonical fixed-width header.
    fn push_container(&mut self, prefix_byte: u8, payload: &[u8], count: usize) -> BuildResult<()>;
}

impl VecExt for Vec<u8> {
    #[inline]
    fn push_prefix(&mut self, prefix_byte: u8) {
        self.push(prefix_byte);
    }

    fn push_integer(&mut self, value: i64) {
        if let Some(direct) = small_int(value) {
            self.push(direct);
            return;
        }
        let bytes = value.to_le_bytes();
        let sign: u8 = if value < 0 { 0xFF } else { 0x00 };
        // narrowest payload whose sign extension reproduces the value
        let mut width = bytes.len();
        while width > 0 && bytes[width - 1] == sign {
            width -= 1;
        }
        self.push(if value < 0 { prefix::M_INT_0 } else { prefix::P_INT_0 });
        self.push(prefix::N_0 + width as u8);
        self.extend_from_slice(&bytes[..width]);
    }

    fn push_unsigned(&mut self, value: u64) {
        if let Ok(signed) = i64::try_from(value) {
            self.push_integer(signed);
            return;
        }
        // the top bit is set: a full-width payload keeps it positive
        self.push(prefix::P_INT_0);
        self.push(prefix::N_0 + 8);
        self.extend_from_slice(&value.to_le_bytes());
    }

    fn push_size(&mut self, size: usize) {
        if size <= 126 {
            self.push(prefix::N_0 + size as u8);
        } else {
            debug_assert!(size <= MAX_VALUE_SIZE);
            self.push(prefix::P_INT_0);
            self.push(prefix::N_0 + 2);
            self.push((size & 0xFF) as u8);
            self.push((size >> 8) as u8);
        }
    }

    fn push_str_utf8(&mut self, s: &str) -> BuildResult<()> {
        if s.len() > MAX_VALUE_SIZE {
            return Err(BuildError::StringTooLong(s.len()));
        }
        self.push(prefix::UTF8);
        self.push_size(s.len());
        self.extend_from_slice(s.as_bytes());
        Ok(())
    }

    fn push_container(&mut self, prefix_byte: u8, payload: &[u8], count: usize) -> BuildResult<()> {
        // size field covers the count field plus the payload
        let declared = payload.len() + 4;
        if declared > MAX_VALUE_SIZE || count > MAX_VALUE_SIZE {
            return Err(BuildError::ValueTooLarge(declared));
        }
        self.push(prefix_byte);
        self.push(prefix::P_INT_0);
        self.push(prefix::N_0 + 2);
        self.push((declared & 0xFF) as u8);
        self.push((declared >> 8) as u8);
        self.push(prefix::P_INT_0);
        self.push(prefix::N_0 + 2);
        self.push((count & 0xFF) as u8);
        self.push((count >> 8) as u8);
        self.extend_from_slice(payload);
        Ok(())
    }
}
