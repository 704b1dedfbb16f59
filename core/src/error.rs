//! Error types for the XNU boot path

use core::fmt;

use macho::MachOError;

/// Result type for boot operations
pub type Result<T> = core::result::Result<T, BootError>;

/// Errors that can occur while loading a kernel or assembling its boot arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootError {
    /// No recognized executable with a loadable segment at the address
    NoImageFound,

    /// Load-command list could not be decoded
    Image(MachOError),

    /// Address range falls outside the physical memory region
    OutOfBounds {
        /// Physical start address
        addr: u64,
        /// Length of the access
        len: u64,
    },

    /// A node or property of the device tree runs past the end of memory
    TruncatedTree {
        /// Offset within the tree blob
        offset: usize,
    },
}

impl BootError {
    /// `true` when there is no usable image at the address
    pub const fn is_no_image(&self) -> bool {
        matches!(self, Self::NoImageFound)
    }
}

impl From<MachOError> for BootError {
    fn from(err: MachOError) -> Self {
        BootError::Image(err)
    }
}

impl fmt::Display for BootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoImageFound => write!(f, "No loadable Mach-O image"),
            Self::Image(e) => write!(f, "Mach-O error: {}", e),
            Self::OutOfBounds { addr, len } => write!(
                f,
                "Range {:#x}+{:#x} outside physical memory",
                addr, len
            ),
            Self::TruncatedTree { offset } => {
                write!(f, "Device tree truncated at offset {:#x}", offset)
            }
        }
    }
}
