//! AArch64 kernel entry
//!
//! XNU expects to start at EL1 with the MMU and data cache off and the
//! boot arguments pointer in `x0`. Firmware usually runs at EL2, so the
//! handoff drops one exception level on the way in.

pub mod cache;
pub mod handoff;

pub use handoff::Aarch64Handoff;

/// Exception level the CPU is currently running at
#[inline]
pub fn current_el() -> u8 {
    let el: u64;
    // SAFETY: CurrentEL is readable at every exception level
    unsafe {
        core::arch::asm!("mrs {}, CurrentEL", out(reg) el, options(nomem, nostack, preserves_flags));
    }
    ((el >> 2) & 0x3) as u8
}
