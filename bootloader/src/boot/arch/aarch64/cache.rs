//! Data cache maintenance
//!
//! The kernel starts with caches off and reads memory directly, so every
//! line the loader wrote must reach DRAM first.

use core::arch::asm;

/// Smallest data cache line size in bytes, from CTR_EL0.DminLine
pub fn dcache_line_size() -> u64 {
    let ctr: u64;
    // SAFETY: CTR_EL0 is readable at EL1 and above
    unsafe {
        asm!("mrs {}, ctr_el0", out(reg) ctr, options(nomem, nostack, preserves_flags));
    }
    4 << ((ctr >> 16) & 0xf)
}

/// Clean and invalidate `[start, end)` to the point of coherency
pub fn clean_invalidate_range(start: u64, end: u64) {
    let line = dcache_line_size();
    let mut addr = start & !(line - 1);

    while addr < end {
        // SAFETY: cache maintenance by VA has no effect on program state
        unsafe {
            asm!("dc civac, {}", in(reg) addr, options(nostack, preserves_flags));
        }
        addr += line;
    }

    // SAFETY: barrier only
    unsafe {
        asm!("dsb sy", "isb", options(nostack, preserves_flags));
    }
}
