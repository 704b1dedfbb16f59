//! AArch64 kernel handoff
//!
//! Two paths:
//! 1. Running at EL2: configure EL1 as AArch64 and `eret` into the kernel
//! 2. Running at EL1: branch straight to the kernel
//!
//! Both turn the MMU and data cache off in the trampoline itself, after
//! the last stack access.

use super::cache::clean_invalidate_range;
use super::current_el;
use crate::boot::handoff::EntryTransfer;
use crate::boot::BootPlan;

/// Drop from EL2 to EL1h and enter the kernel
///
/// x0 = boot arguments, x1 = entry, x2-x3 cleared.
/// Does NOT return.
#[unsafe(naked)]
pub unsafe extern "C" fn enter_el1_from_el2(boot_args: u64, entry: u64) -> ! {
    core::arch::naked_asm!(
        // EL2 translation and data cache off
        "mrs x2, sctlr_el2",
        "bic x2, x2, #0x4",
        "bic x2, x2, #0x1",
        "msr sctlr_el2, x2",
        "isb",

        // EL1 physical timer and counter access, no virtual offset
        "mrs x2, cnthctl_el2",
        "orr x2, x2, #0x3",
        "msr cnthctl_el2, x2",
        "msr cntvoff_el2, xzr",

        // HCR_EL2.RW: EL1 runs AArch64
        "mov x2, #0x80000000",
        "msr hcr_el2, x2",

        // SCTLR_EL1 RES1 bits only: MMU and caches off
        "movz x2, #0x0800",
        "movk x2, #0x30d0, lsl #16",
        "msr sctlr_el1, x2",

        // EL1h with DAIF masked
        "mov x2, #0x3c5",
        "msr spsr_el2, x2",
        "msr elr_el2, x1",

        "mov x1, xzr",
        "mov x2, xzr",
        "mov x3, xzr",
        "isb",
        "eret",
    )
}

/// Enter the kernel from EL1
///
/// x0 = boot arguments, x1 = entry, x1-x3 cleared before the branch.
/// Does NOT return.
#[unsafe(naked)]
pub unsafe extern "C" fn enter_el1(boot_args: u64, entry: u64) -> ! {
    core::arch::naked_asm!(
        "mrs x2, sctlr_el1",
        "bic x2, x2, #0x4",
        "bic x2, x2, #0x1",
        "msr sctlr_el1, x2",
        "isb",

        "mov x16, x1",
        "mov x1, xzr",
        "mov x2, xzr",
        "mov x3, xzr",
        "br x16",
    )
}

/// Real entry transfer on AArch64 boards
pub struct Aarch64Handoff {
    _private: (),
}

impl Aarch64Handoff {
    /// # Safety
    /// Memory must be identity-mapped, and the entry of every plan passed
    /// to `transfer` must be a kernel that follows the XNU entry protocol.
    pub unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl EntryTransfer for Aarch64Handoff {
    fn transfer(&mut self, plan: &BootPlan) {
        let el = current_el();
        let used = plan.used();

        log::info!(
            "handoff at EL{}: entry {:#x}, x0 {:#x}, flushing {:#x}..{:#x}",
            el,
            plan.entry,
            plan.boot_args,
            used.start,
            used.end
        );

        clean_invalidate_range(used.start, used.end);

        match el {
            // SAFETY: guaranteed by the contract of `Aarch64Handoff::new`
            2 => unsafe { enter_el1_from_el2(plan.boot_args, plan.entry) },
            1 => unsafe { enter_el1(plan.boot_args, plan.entry) },
            _ => log::error!("cannot enter kernel from EL{}", el),
        }
    }
}
