//! XnuBoot
//!
//! The `bootxnu` command: load an XNU Mach-O kernel and an Apple flattened
//! device tree that are already in memory, build the boot arguments, and
//! jump to the kernel.
//!
//! The firmware supplies its environment store, console and a way to
//! transfer control; everything else runs on a [`PhysMemory`] region.

#![cfg_attr(not(test), no_std)]

pub mod boot;
pub mod command;
pub mod env;

pub use boot::handoff::EntryTransfer;
pub use boot::{prepare, BootPlan};
pub use command::{do_bootxnu, CommandStatus};
pub use env::{EnvTable, Environment};

pub use xnuboot_core::{PhysMemory, PlatformConfig};
