//! `bootxnu` command
//!
//! ```text
//! bootxnu kernel_addr fdt_addr
//!     kernel_addr - load address of the XNU Mach-O image (hex)
//!     fdt_addr    - load address of the Apple flattened device tree (hex)
//! ```
//!
//! The kernel command line is taken from the `bootargs` environment variable.

use core::fmt::Write;

use xnuboot_core::platform::BOOTARGS_ENV;
use xnuboot_core::{PhysMemory, PlatformConfig};

use crate::boot::handoff::EntryTransfer;
use crate::boot::prepare;
use crate::env::Environment;

pub const USAGE: &str = "Usage: bootxnu kernel_addr fdt_addr";

/// Exit status of `bootxnu`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum CommandStatus {
    /// Missing or malformed arguments
    Usage = 1,
    /// Nothing bootable at the kernel address
    NoImageFound = 2,
    /// The kernel handed control back
    KernelReturned = 3,
}

impl CommandStatus {
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// Parse a hexadecimal address, with or without a `0x` prefix
pub fn parse_hex_addr(arg: &str) -> Option<u64> {
    let digits = arg
        .strip_prefix("0x")
        .or_else(|| arg.strip_prefix("0X"))
        .unwrap_or(arg);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    u64::from_str_radix(digits, 16).ok()
}

/// Run `bootxnu`.
///
/// `argv[0]` is the command name. On success `transfer` does not return, so
/// every status this function gives back is a failure.
pub fn do_bootxnu<E, C, T>(
    argv: &[&str],
    mem: &mut PhysMemory<'_>,
    platform: &PlatformConfig,
    env: &E,
    console: &mut C,
    transfer: &mut T,
) -> CommandStatus
where
    E: Environment + ?Sized,
    C: Write + ?Sized,
    T: EntryTransfer + ?Sized,
{
    if argv.len() < 3 {
        let _ = writeln!(console, "{}", USAGE);
        return CommandStatus::Usage;
    }

    let (kernel_addr, fdt_addr) = match (parse_hex_addr(argv[1]), parse_hex_addr(argv[2])) {
        (Some(kernel), Some(fdt)) => (kernel, fdt),
        _ => {
            let _ = writeln!(console, "{}", USAGE);
            return CommandStatus::Usage;
        }
    };

    let cmdline = env.get(BOOTARGS_ENV);
    log::debug!(
        "bootxnu kernel {:#x} fdt {:#x} bootargs {:?}",
        kernel_addr,
        fdt_addr,
        cmdline
    );

    let plan = match prepare(mem, platform, kernel_addr, fdt_addr, cmdline) {
        Ok(plan) => plan,
        Err(e) => {
            if !e.is_no_image() {
                log::error!("bootxnu: {}", e);
                let _ = writeln!(console, "bootxnu: {}", e);
            }
            let _ = writeln!(console, "No Mach-O image at address {:#x}", kernel_addr);
            return CommandStatus::NoImageFound;
        }
    };

    let _ = writeln!(console, "## Starting XNU at {:#x} ...", plan.entry);
    transfer.transfer(&plan);

    let _ = writeln!(console, "## XNU terminated");
    CommandStatus::KernelReturned
}
