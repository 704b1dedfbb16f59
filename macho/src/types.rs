//! Mach-O constants and layout variants

use crate::error::Result;
use crate::utils::{read_u32, read_u64};

/// 32-bit Mach-O magic
pub const MH_MAGIC: u32 = 0xfeed_face;

/// 64-bit Mach-O magic
pub const MH_MAGIC_64: u32 = 0xfeed_facf;

/// Demand-paged executable file type
pub const MH_EXECUTE: u32 = 0x2;

/// 32-bit segment load command
pub const LC_SEGMENT: u32 = 0x1;

/// 64-bit segment load command
pub const LC_SEGMENT_64: u32 = 0x19;

/// Unix thread load command (initial register state)
pub const LC_UNIXTHREAD: u32 = 0x5;

/// Size of the generic load command header (`cmd` + `cmdsize`)
pub const LOAD_COMMAND_HEADER_SIZE: usize = 8;

/// Length of the fixed segment name field
pub const SEGMENT_NAME_LEN: usize = 16;

/// Header word size, selected once at configuration time.
///
/// Selects the magic, the segment command tag and the width of every
/// address/length field in a segment command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// `mach_header` with 32-bit addresses
    Bits32,
    /// `mach_header_64` with 64-bit addresses
    Bits64,
}

impl Variant {
    /// Expected header magic
    pub const fn magic(self) -> u32 {
        match self {
            Self::Bits32 => MH_MAGIC,
            Self::Bits64 => MH_MAGIC_64,
        }
    }

    /// Segment command tag for this variant
    pub const fn segment_command(self) -> u32 {
        match self {
            Self::Bits32 => LC_SEGMENT,
            Self::Bits64 => LC_SEGMENT_64,
        }
    }

    /// Header size; the 64-bit header carries an extra reserved word
    pub const fn header_size(self) -> usize {
        match self {
            Self::Bits32 => 28,
            Self::Bits64 => 32,
        }
    }

    /// Width in bytes of address and length fields
    pub const fn word_size(self) -> usize {
        match self {
            Self::Bits32 => 4,
            Self::Bits64 => 8,
        }
    }

    /// Size of a segment command without its section headers
    pub const fn segment_command_size(self) -> usize {
        // header + name + 4 words + maxprot, initprot, nsects, flags
        LOAD_COMMAND_HEADER_SIZE + SEGMENT_NAME_LEN + 4 * self.word_size() + 16
    }

    /// Read one address-width field, widened to `u64`
    pub(crate) fn read_word(self, data: &[u8], offset: usize) -> Result<u64> {
        match self {
            Self::Bits32 => read_u32(data, offset).map(u64::from),
            Self::Bits64 => read_u64(data, offset),
        }
    }
}

/// Register block layout inside a unix-thread command.
///
/// Only the saved program counter is consumed; the layout decides where it
/// lives inside the architecture's thread state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadLayout {
    /// `arm_thread_state64`: x0-x28, fp, lr, sp, pc, cpsr, flags
    Arm64,
    /// Architectures that only list the program counter
    Generic,
}

impl ThreadLayout {
    /// Layout of the architecture this crate is compiled for
    #[cfg(target_arch = "aarch64")]
    pub const NATIVE: Self = Self::Arm64;

    /// Layout of the architecture this crate is compiled for
    #[cfg(not(target_arch = "aarch64"))]
    pub const NATIVE: Self = Self::Generic;

    /// Offset of the program counter within the register block
    pub const fn pc_offset(self) -> usize {
        match self {
            Self::Arm64 => 32 * 8,
            Self::Generic => 0,
        }
    }

    /// Size of the register block
    pub const fn state_size(self) -> usize {
        match self {
            Self::Arm64 => 33 * 8 + 8,
            Self::Generic => 8,
        }
    }
}
