//! XNU boot arguments
//!
//! The kernel receives a pointer to this block in its first argument
//! register. The block sits right after the loaded image and is itself
//! followed by a copy of the device tree; `phys_end` tells the kernel where
//! the memory claimed by the loader stops.
//!
//! Field layout is C layout with natural alignment. The only difference
//! between the two header variants is the width of the `afdt` pointer.

use macho::Variant;

use crate::afdt;
use crate::error::{BootError, Result};
use crate::loader::LoadResult;
use crate::memory::{align_up, PhysMemory};
use crate::platform::PlatformConfig;

/// `revision` written into every block
pub const BOOT_ARGS_REVISION: u16 = 2;

/// `version` written into every block
pub const BOOT_ARGS_VERSION: u16 = 2;

/// Size of the command line field, terminator included
pub const CMDLINE_LEN: usize = 608;

/// Boundary `phys_end` is rounded up to
pub const PHYS_END_ALIGN: u64 = 0x10000;

/// Byte offsets of every boot argument field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootArgsLayout {
    pub revision: usize,
    pub version: usize,
    pub virt_base: usize,
    pub phys_base: usize,
    pub mem_size: usize,
    pub phys_end: usize,
    /// Six `u64` words of video information, left zero
    pub video: usize,
    pub machine_type: usize,
    pub afdt: usize,
    pub afdt_length: usize,
    pub cmdline: usize,
    pub boot_flags: usize,
    pub mem_size_actual: usize,
    /// Total size including tail padding
    pub size: usize,
}

impl BootArgsLayout {
    /// 64-bit kernels: `afdt` is a `u64`
    pub const BITS64: Self = Self {
        revision: 0x000,
        version: 0x002,
        virt_base: 0x008,
        phys_base: 0x010,
        mem_size: 0x018,
        phys_end: 0x020,
        video: 0x028,
        machine_type: 0x058,
        afdt: 0x060,
        afdt_length: 0x068,
        cmdline: 0x06c,
        boot_flags: 0x2d0,
        mem_size_actual: 0x2d8,
        size: 0x2e0,
    };

    /// 32-bit kernels: `afdt` is a `u32`, no padding after `machine_type`
    pub const BITS32: Self = Self {
        revision: 0x000,
        version: 0x002,
        virt_base: 0x008,
        phys_base: 0x010,
        mem_size: 0x018,
        phys_end: 0x020,
        video: 0x028,
        machine_type: 0x058,
        afdt: 0x05c,
        afdt_length: 0x060,
        cmdline: 0x064,
        boot_flags: 0x2c8,
        mem_size_actual: 0x2d0,
        size: 0x2d8,
    };

    pub const fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Bits32 => Self::BITS32,
            Variant::Bits64 => Self::BITS64,
        }
    }
}

/// Addresses produced by [`assemble`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootBlock {
    /// Physical address of the boot arguments
    pub addr: u64,
    /// Physical address of the device tree copy
    pub afdt: u64,
    /// Device tree length
    pub afdt_length: u32,
    /// Final, 64 KiB aligned `phys_end`
    pub phys_end: u64,
}

/// Build the boot arguments after the loaded image.
///
/// The block goes at the translated image end. Its own fields are written
/// first, then the device tree read from `fdt_addr` is appended right after
/// it and `phys_end` is advanced past the copy and rounded up. A command
/// line longer than the field is cut to `CMDLINE_LEN - 1` bytes.
pub fn assemble(
    mem: &mut PhysMemory<'_>,
    load: &LoadResult,
    platform: &PlatformConfig,
    fdt_addr: u64,
    cmdline: Option<&str>,
) -> Result<BootBlock> {
    let layout = BootArgsLayout::for_variant(platform.variant);
    let addr = load.phys_end();
    let at = |offset: usize| addr + offset as u64;

    mem.fill(addr, layout.size as u64, 0)?;
    mem.write_u16(at(layout.revision), BOOT_ARGS_REVISION)?;
    mem.write_u16(at(layout.version), BOOT_ARGS_VERSION)?;
    mem.write_u64(at(layout.virt_base), load.base)?;
    mem.write_u64(at(layout.phys_base), load.load_addr)?;
    mem.write_u64(at(layout.mem_size), platform.sdram_size)?;

    let mut phys_end = addr + layout.size as u64;
    mem.write_u64(at(layout.phys_end), phys_end)?;

    if let Some(cmdline) = cmdline {
        let bytes = cmdline.as_bytes();
        let len = bytes.len().min(CMDLINE_LEN - 1);
        if len < bytes.len() {
            log::warn!("bootargs truncated to {} bytes", len);
        }
        mem.write(at(layout.cmdline), &bytes[..len])?;
        mem.write(at(layout.cmdline) + len as u64, &[0])?;
    }

    let afdt = phys_end;
    let afdt_length = afdt::length(mem.tail(fdt_addr)?)?;
    match platform.variant {
        Variant::Bits32 => mem.write_u32(at(layout.afdt), afdt as u32)?,
        Variant::Bits64 => mem.write_u64(at(layout.afdt), afdt)?,
    }
    mem.write_u32(at(layout.afdt_length), afdt_length)?;
    mem.copy(fdt_addr, afdt, u64::from(afdt_length))?;

    phys_end += u64::from(afdt_length);
    phys_end = align_up(phys_end, PHYS_END_ALIGN).ok_or(BootError::OutOfBounds {
        addr: phys_end,
        len: PHYS_END_ALIGN,
    })?;
    mem.write_u64(at(layout.phys_end), phys_end)?;

    log::info!(
        "boot args at {:#x}, afdt {:#x}+{:#x}, phys_end {:#x}",
        addr,
        afdt,
        afdt_length,
        phys_end
    );

    Ok(BootBlock {
        addr,
        afdt,
        afdt_length,
        phys_end,
    })
}

/// Decoded boot arguments, as the kernel will see them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootArgs {
    pub revision: u16,
    pub version: u16,
    pub virt_base: u64,
    pub phys_base: u64,
    pub mem_size: u64,
    pub phys_end: u64,
    pub video: [u64; 6],
    pub machine_type: u32,
    pub afdt: u64,
    pub afdt_length: u32,
    pub cmdline: [u8; CMDLINE_LEN],
    pub boot_flags: u64,
    pub mem_size_actual: u64,
}

fn le_u16(block: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([block[offset], block[offset + 1]])
}

fn le_u32(block: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&block[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}

fn le_u64(block: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&block[offset..offset + 8]);
    u64::from_le_bytes(bytes)
}

impl BootArgs {
    /// Decode the block at `addr`
    pub fn read(mem: &PhysMemory<'_>, addr: u64, variant: Variant) -> Result<Self> {
        let layout = BootArgsLayout::for_variant(variant);
        let block = mem.read(addr, layout.size as u64)?;

        let mut video = [0u64; 6];
        for (i, word) in video.iter_mut().enumerate() {
            *word = le_u64(block, layout.video + i * 8);
        }

        let mut cmdline = [0u8; CMDLINE_LEN];
        cmdline.copy_from_slice(&block[layout.cmdline..layout.cmdline + CMDLINE_LEN]);

        let afdt = match variant {
            Variant::Bits32 => u64::from(le_u32(block, layout.afdt)),
            Variant::Bits64 => le_u64(block, layout.afdt),
        };

        Ok(BootArgs {
            revision: le_u16(block, layout.revision),
            version: le_u16(block, layout.version),
            virt_base: le_u64(block, layout.virt_base),
            phys_base: le_u64(block, layout.phys_base),
            mem_size: le_u64(block, layout.mem_size),
            phys_end: le_u64(block, layout.phys_end),
            video,
            machine_type: le_u32(block, layout.machine_type),
            afdt,
            afdt_length: le_u32(block, layout.afdt_length),
            cmdline,
            boot_flags: le_u64(block, layout.boot_flags),
            mem_size_actual: le_u64(block, layout.mem_size_actual),
        })
    }

    /// Command line up to its terminator
    pub fn cmdline_bytes(&self) -> &[u8] {
        let len = self.cmdline.iter().position(|&c| c == 0).unwrap_or(CMDLINE_LEN);
        &self.cmdline[..len]
    }
}
