//! Mach-O file header

use crate::error::{MachOError, Result};
use crate::types::{Variant, MH_EXECUTE};
use crate::utils::{bytes_at, read_u32};

/// Mach-O file header (`mach_header` / `mach_header_64`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachHeader {
    /// `MH_MAGIC` or `MH_MAGIC_64`
    pub magic: u32,
    /// CPU the image was built for
    pub cpu_type: u32,
    /// CPU variant
    pub cpu_subtype: u32,
    /// Always `MH_EXECUTE` once parsed
    pub file_type: u32,
    /// Number of load commands following the header
    pub commands_nb: u32,
    /// Total size of the load commands
    pub commands_len: u32,
    /// Header flags, not interpreted
    pub flags: u32,
}

impl MachHeader {
    /// Parse and validate the header at the start of `data`.
    ///
    /// Only magic and file type are checked. On mismatch nothing past the
    /// file type field is read.
    pub fn parse(data: &[u8], variant: Variant) -> Result<Self> {
        let magic = read_u32(data, 0)?;
        let file_type = read_u32(data, 12)?;

        if magic != variant.magic() || file_type != MH_EXECUTE {
            return Err(MachOError::FormatMismatch { magic, file_type });
        }

        // The reserved word of the 64-bit header has to be there too
        bytes_at(data, 0, variant.header_size())?;

        Ok(MachHeader {
            magic,
            cpu_type: read_u32(data, 4)?,
            cpu_subtype: read_u32(data, 8)?,
            file_type,
            commands_nb: read_u32(data, 16)?,
            commands_len: read_u32(data, 20)?,
            flags: read_u32(data, 24)?,
        })
    }
}
