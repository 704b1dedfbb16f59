//! XnuBoot core library
//!
//! Loads a Mach-O kernel into physical memory, sizes and copies the Apple
//! flattened device tree, and lays out the boot arguments the kernel reads
//! at its entry point. Everything works inside one [`PhysMemory`] region.

#![cfg_attr(not(test), no_std)]

pub mod afdt;
pub mod boot_args;
pub mod error;
pub mod loader;
pub mod logger;
pub mod memory;
pub mod platform;

pub use boot_args::{BootArgs, BootArgsLayout, BootBlock};
pub use error::{BootError, Result};
pub use loader::{ImageLoader, LoadResult};
pub use memory::PhysMemory;
pub use platform::PlatformConfig;
