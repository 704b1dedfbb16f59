//! Board configuration
//!
//! Everything the boot path needs to know about the machine is fixed here:
//! where the loaded kernel goes, how much RAM to report, and which header
//! variant and register layout the kernel is built for.

use macho::{ThreadLayout, Variant};

/// Default system load address (start of DRAM on the reference board)
pub const DEFAULT_SYS_LOAD_ADDR: u64 = 0x8000_0000;

/// Default RAM size reported to the kernel
pub const DEFAULT_SDRAM_SIZE: u64 = 0x4000_0000;

/// Distance between the system load address and the translated kernel base
pub const XNU_LOAD_OFFSET: u64 = 0x4000;

/// Environment variable holding the kernel command line
pub const BOOTARGS_ENV: &str = "bootargs";

/// Header variant selected at build time
#[cfg(feature = "phys-32bit")]
pub const NATIVE_VARIANT: Variant = Variant::Bits32;

/// Header variant selected at build time
#[cfg(not(feature = "phys-32bit"))]
pub const NATIVE_VARIANT: Variant = Variant::Bits64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Base of the load region (`CONFIG_SYS_LOAD_ADDR`)
    pub sys_load_addr: u64,
    /// RAM size written to `mem_size`
    pub sdram_size: u64,
    /// Mach-O header word size
    pub variant: Variant,
    /// Register block layout for unix-thread commands
    pub thread_layout: ThreadLayout,
}

impl PlatformConfig {
    /// Physical address segment and entry addresses are translated to
    pub const fn load_addr(&self) -> u64 {
        self.sys_load_addr + XNU_LOAD_OFFSET
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            sys_load_addr: DEFAULT_SYS_LOAD_ADDR,
            sdram_size: DEFAULT_SDRAM_SIZE,
            variant: NATIVE_VARIANT,
            thread_layout: ThreadLayout::NATIVE,
        }
    }
}
