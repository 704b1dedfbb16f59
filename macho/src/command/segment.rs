//! Segment load command

use crate::error::Result;
use crate::types::{Variant, SEGMENT_NAME_LEN};
use crate::utils::{bytes_at, read_u32};

/// Segment command: one source-to-destination copy region.
///
/// `dst_len >= src_len` is expected but not checked; the tail
/// `[src_len, dst_len)` of the destination is zero-filled by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// NUL-padded segment name (`__TEXT`, `__DATA`, ...)
    pub name: [u8; SEGMENT_NAME_LEN],
    /// Destination virtual address
    pub dst: u64,
    /// Destination length in memory
    pub dst_len: u64,
    /// Source offset within the image
    pub src_offset: u64,
    /// Number of bytes present in the image
    pub src_len: u64,
    /// Maximum VM protection
    pub max_protection: u32,
    /// Initial VM protection
    pub initial_protection: u32,
    /// Number of section records after the command
    pub sections_nb: u32,
    /// Segment flags
    pub flags: u32,
}

impl Segment {
    pub(crate) fn parse(image: &[u8], offset: usize, variant: Variant) -> Result<Self> {
        // Reject a record cut off by the end of the image up front
        let record = bytes_at(image, offset, variant.segment_command_size())?;

        let mut name = [0u8; SEGMENT_NAME_LEN];
        name.copy_from_slice(&record[8..8 + SEGMENT_NAME_LEN]);

        let word = variant.word_size();
        let fields = 8 + SEGMENT_NAME_LEN;
        let tail = fields + 4 * word;

        Ok(Segment {
            name,
            dst: variant.read_word(record, fields)?,
            dst_len: variant.read_word(record, fields + word)?,
            src_offset: variant.read_word(record, fields + 2 * word)?,
            src_len: variant.read_word(record, fields + 3 * word)?,
            max_protection: read_u32(record, tail)?,
            initial_protection: read_u32(record, tail + 4)?,
            sections_nb: read_u32(record, tail + 8)?,
            flags: read_u32(record, tail + 12)?,
        })
    }

    /// Segment name without NUL padding
    pub fn name_str(&self) -> &str {
        let len = self.name.iter().position(|&c| c == 0).unwrap_or(SEGMENT_NAME_LEN);
        core::str::from_utf8(&self.name[..len]).unwrap_or("<invalid>")
    }

    /// First address past the destination range
    pub const fn dst_end(&self) -> u64 {
        self.dst.saturating_add(self.dst_len)
    }

    /// Bytes of the destination that are zero-filled rather than copied
    pub const fn zero_fill_len(&self) -> u64 {
        self.dst_len.saturating_sub(self.src_len)
    }
}
