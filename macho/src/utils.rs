//! Bounds-checked little-endian reads

use crate::error::{MachOError, Result};

/// Borrow `len` bytes at `offset`, or report how far past the end the read goes.
#[inline]
pub(crate) fn bytes_at(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or(MachOError::Truncated { offset, needed: len })
}

#[inline]
pub(crate) fn read_u32(data: &[u8], offset: usize) -> Result<u32> {
    let b = bytes_at(data, offset, 4)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

#[inline]
pub(crate) fn read_u64(data: &[u8], offset: usize) -> Result<u64> {
    let b = bytes_at(data, offset, 8)?;
    Ok(u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
}
