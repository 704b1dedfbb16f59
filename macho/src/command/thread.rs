//! Unix-thread load command

use crate::error::Result;
use crate::types::ThreadLayout;
use crate::utils::{bytes_at, read_u32, read_u64};

/// Offset of the register block within the command (header, flavor, count)
const STATE_OFFSET: usize = 16;

/// Initial thread state; only the program counter is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadState {
    /// Thread state flavor
    pub flavor: u32,
    /// Register block size in 32-bit words, as declared
    pub count: u32,
    /// Saved program counter (image virtual address)
    pub pc: u64,
}

impl ThreadState {
    pub(crate) fn parse(image: &[u8], offset: usize, layout: ThreadLayout) -> Result<Self> {
        let record = bytes_at(image, offset, STATE_OFFSET + layout.state_size())?;

        Ok(ThreadState {
            flavor: read_u32(record, 8)?,
            count: read_u32(record, 12)?,
            pc: read_u64(record, STATE_OFFSET + layout.pc_offset())?,
        })
    }
}
