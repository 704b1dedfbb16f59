//! Shared fixtures for the core integration tests

#![allow(dead_code)]

#[path = "../../../macho/tests/common/builder.rs"]
pub mod builder;

#[allow(unused_imports)]
pub use builder::{AfdtBuilder, MachOBuilder};

use macho::{ThreadLayout, Variant};
use xnuboot_core::{PhysMemory, PlatformConfig};

/// Start of the simulated DRAM
pub const RAM_BASE: u64 = 0x8000_0000;

/// Simulated DRAM size
pub const RAM_SIZE: usize = 0x40_0000;

/// Where test kernels are staged
pub const KERNEL_ADDR: u64 = RAM_BASE + 0x20_0000;

/// Where test device trees are staged
pub const FDT_ADDR: u64 = RAM_BASE + 0x30_0000;

/// Translated kernel base for [`platform`]
pub const LOAD_ADDR: u64 = RAM_BASE + 0x4000;

pub fn ram() -> Vec<u8> {
    vec![0u8; RAM_SIZE]
}

pub fn platform(variant: Variant) -> PlatformConfig {
    PlatformConfig {
        sys_load_addr: RAM_BASE,
        sdram_size: 0x4000_0000,
        variant,
        thread_layout: ThreadLayout::Generic,
    }
}

/// Copy `bytes` into simulated RAM at `addr`
pub fn stage(mem: &mut PhysMemory<'_>, addr: u64, bytes: &[u8]) {
    mem.write(addr, bytes).unwrap();
}
