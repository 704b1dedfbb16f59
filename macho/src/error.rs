//! Error types for Mach-O parsing

use core::fmt;

/// Result type for Mach-O operations
pub type Result<T> = core::result::Result<T, MachOError>;

/// Errors that can occur while parsing a Mach-O image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachOError {
    /// Header magic or file type is not a recognized executable
    FormatMismatch {
        /// Magic number found at offset 0
        magic: u32,
        /// File type found in the header
        file_type: u32,
    },

    /// A fixed-size record extends past the end of the image
    Truncated {
        /// Offset of the record within the image
        offset: usize,
        /// Number of bytes the record needs
        needed: usize,
    },

    /// A load command declares a size smaller than its own header
    MalformedCommand {
        /// Offset of the command within the image
        offset: usize,
        /// Declared command size
        size: u32,
    },
}

impl fmt::Display for MachOError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FormatMismatch { magic, file_type } => write!(
                f,
                "Not a Mach-O executable (magic {:#010x}, file type {:#x})",
                magic, file_type
            ),
            Self::Truncated { offset, needed } => write!(
                f,
                "Record at offset {:#x} needs {} bytes past the end of the image",
                offset, needed
            ),
            Self::MalformedCommand { offset, size } => write!(
                f,
                "Load command at offset {:#x} declares invalid size {}",
                offset, size
            ),
        }
    }
}
