//! Physical memory region
//!
//! The whole boot sequence works inside one caller-supplied region. Source
//! images, loaded segments, the boot arguments block and the copied device
//! tree are all addressed by physical address within it, so a single
//! `&mut [u8]` covers both the reads and the writes.
//!
//! Every access is checked against the region; nothing is checked against
//! the true extent of the images inside it.

use crate::error::{BootError, Result};

/// Round `value` up to a multiple of `align` (a power of two)
pub const fn align_up(value: u64, align: u64) -> Option<u64> {
    match value.checked_add(align - 1) {
        Some(v) => Some(v & !(align - 1)),
        None => None,
    }
}

/// A contiguous range of physical memory
pub struct PhysMemory<'a> {
    base: u64,
    bytes: &'a mut [u8],
}

impl<'a> PhysMemory<'a> {
    /// Wrap `bytes` as the physical range starting at `base`
    pub fn new(base: u64, bytes: &'a mut [u8]) -> Self {
        Self { base, bytes }
    }

    /// Physical base address
    pub fn base(&self) -> u64 {
        self.base
    }

    /// First address past the region
    pub fn end(&self) -> u64 {
        self.base + self.bytes.len() as u64
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn range(&self, addr: u64, len: u64) -> Result<core::ops::Range<usize>> {
        let oob = BootError::OutOfBounds { addr, len };
        let start = addr.checked_sub(self.base).ok_or(oob)?;
        let end = start.checked_add(len).ok_or(oob)?;

        if end > self.bytes.len() as u64 {
            return Err(oob);
        }

        Ok(start as usize..end as usize)
    }

    /// Borrow `len` bytes at `addr`
    pub fn read(&self, addr: u64, len: u64) -> Result<&[u8]> {
        let range = self.range(addr, len)?;
        Ok(&self.bytes[range])
    }

    /// Borrow everything from `addr` to the end of the region.
    ///
    /// Used for inputs whose size is only known from their own contents.
    pub fn tail(&self, addr: u64) -> Result<&[u8]> {
        let start = self.range(addr, 0)?.start;
        Ok(&self.bytes[start..])
    }

    /// Copy `data` to `addr`
    pub fn write(&mut self, addr: u64, data: &[u8]) -> Result<()> {
        let range = self.range(addr, data.len() as u64)?;
        self.bytes[range].copy_from_slice(data);
        Ok(())
    }

    pub fn write_u16(&mut self, addr: u64, value: u16) -> Result<()> {
        self.write(addr, &value.to_le_bytes())
    }

    pub fn write_u32(&mut self, addr: u64, value: u32) -> Result<()> {
        self.write(addr, &value.to_le_bytes())
    }

    pub fn write_u64(&mut self, addr: u64, value: u64) -> Result<()> {
        self.write(addr, &value.to_le_bytes())
    }

    /// Copy `len` bytes from `src` to `dst`. Ranges may overlap.
    pub fn copy(&mut self, src: u64, dst: u64, len: u64) -> Result<()> {
        let from = self.range(src, len)?;
        let to = self.range(dst, len)?;
        self.bytes.copy_within(from, to.start);
        Ok(())
    }

    /// Set `len` bytes at `addr` to `value`
    pub fn fill(&mut self, addr: u64, len: u64, value: u8) -> Result<()> {
        let range = self.range(addr, len)?;
        self.bytes[range].fill(value);
        Ok(())
    }

    /// The whole region as bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..]
    }
}

impl PhysMemory<'static> {
    /// Region over real RAM.
    ///
    /// # Safety
    /// `[base, base + len)` must be identity-mapped, writable, and hold
    /// nothing the running loader still needs (its own code, stack, heap).
    pub unsafe fn from_raw(base: u64, len: usize) -> Self {
        Self {
            base,
            bytes: core::slice::from_raw_parts_mut(base as *mut u8, len),
        }
    }
}
