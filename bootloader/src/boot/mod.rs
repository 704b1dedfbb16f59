// Boot module - kernel loading, boot arguments and entry

pub mod handoff;

// Architecture-specific entry code
#[cfg(target_arch = "aarch64")]
pub mod arch;

use core::ops::Range;

use xnuboot_core::boot_args::{self, BootBlock};
use xnuboot_core::{BootError, ImageLoader, LoadResult, PhysMemory, PlatformConfig, Result};

/// Everything needed to jump into a loaded kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootPlan {
    /// Physical entry address
    pub entry: u64,
    /// Physical address of the boot arguments, passed in the first register
    pub boot_args: u64,
    /// End of the memory claimed for the kernel, 64 KiB aligned
    pub phys_end: u64,
    /// Image footprint and load address
    pub load: LoadResult,
    /// Boot arguments and device tree placement
    pub block: BootBlock,
}

impl BootPlan {
    /// Physical range written while preparing the boot
    pub fn used(&self) -> Range<u64> {
        self.load.load_addr..self.phys_end
    }
}

/// Load the kernel at `kernel_addr` and build its boot arguments.
///
/// On success the kernel is in place at the platform load address, followed
/// by the boot arguments and a copy of the device tree found at `fdt_addr`.
/// `NoImageFound` means the loader returned an invalid result: there is no
/// usable Mach-O at `kernel_addr` and memory has not been written.
pub fn prepare(
    mem: &mut PhysMemory<'_>,
    platform: &PlatformConfig,
    kernel_addr: u64,
    fdt_addr: u64,
    cmdline: Option<&str>,
) -> Result<BootPlan> {
    let load = ImageLoader::new(platform).load(mem, kernel_addr)?;
    if !load.is_valid() {
        return Err(BootError::NoImageFound);
    }

    let block = boot_args::assemble(mem, &load, platform, fdt_addr, cmdline)?;

    Ok(BootPlan {
        entry: load.entry,
        boot_args: block.addr,
        phys_end: block.phys_end,
        load,
        block,
    })
}
