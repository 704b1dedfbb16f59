//! Common test utilities and in-memory firmware collaborators

#![allow(dead_code)]

#[path = "../../../macho/tests/common/builder.rs"]
pub mod builder;

#[allow(unused_imports)]
pub use builder::{AfdtBuilder, MachOBuilder};

use std::collections::HashMap;

use macho::{ThreadLayout, Variant};
use xnuboot::{BootPlan, EntryTransfer, Environment, PhysMemory, PlatformConfig};

pub const RAM_BASE: u64 = 0x8000_0000;
pub const RAM_SIZE: usize = 0x40_0000;
pub const KERNEL_ADDR: u64 = RAM_BASE + 0x20_0000;
pub const FDT_ADDR: u64 = RAM_BASE + 0x30_0000;
pub const LOAD_ADDR: u64 = RAM_BASE + 0x4000;

/// Environment backed by a hash map
#[derive(Debug, Default)]
pub struct MapEnv {
    pub vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn with(name: &str, value: &str) -> Self {
        let mut env = Self::default();
        env.vars.insert(name.to_string(), value.to_string());
        env
    }
}

impl Environment for MapEnv {
    fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

/// Transfer that records each plan and returns, as a kernel that exits would
#[derive(Debug, Default)]
pub struct RecordingTransfer {
    pub plans: Vec<BootPlan>,
}

impl EntryTransfer for RecordingTransfer {
    fn transfer(&mut self, plan: &BootPlan) {
        self.plans.push(*plan);
    }
}

pub fn ram() -> Vec<u8> {
    vec![0u8; RAM_SIZE]
}

pub fn platform() -> PlatformConfig {
    PlatformConfig {
        sys_load_addr: RAM_BASE,
        sdram_size: 0x4000_0000,
        variant: Variant::Bits64,
        thread_layout: ThreadLayout::Generic,
    }
}

/// Kernel with a text segment, a zero-filled data segment and an entry point
pub fn kernel() -> Vec<u8> {
    MachOBuilder::new64()
        .segment("__TEXT", 0xffff_fff0_0700_0000, 0x4000, 0x1000, 0x100)
        .segment("__DATA", 0xffff_fff0_0700_4000, 0x2000, 0x2000, 0x10)
        .unix_thread(0xffff_fff0_0700_0080)
        .payload(0x1000, &[0xd5; 0x100])
        .payload(0x2000, &[0x11; 0x10])
        .build()
}

pub fn device_tree() -> Vec<u8> {
    AfdtBuilder::new()
        .property("name", b"device-tree\0")
        .child(AfdtBuilder::new().property("name", b"chosen\0"))
        .child(AfdtBuilder::new().property("name", b"memory\0"))
        .build()
}

/// Stage a kernel and device tree in RAM
pub fn stage(mem: &mut PhysMemory<'_>, kernel: &[u8], fdt: &[u8]) {
    mem.write(KERNEL_ADDR, kernel).unwrap();
    mem.write(FDT_ADDR, fdt).unwrap();
}
