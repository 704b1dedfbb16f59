// Kernel entry transfer

use super::BootPlan;

/// Final step of the boot: hand the CPU to the loaded kernel.
///
/// Implementations make the loaded bytes visible to a cache-off CPU and
/// jump to `plan.entry` with `plan.boot_args` as the only argument. On
/// success they never return; returning means the kernel came back.
pub trait EntryTransfer {
    fn transfer(&mut self, plan: &BootPlan);
}

/// Plain function call into the kernel, for targets without a privilege
/// level switch. No cache maintenance is done.
pub struct DirectCall {
    _private: (),
}

impl DirectCall {
    /// # Safety
    /// The entry address of every plan passed to `transfer` must point at
    /// code taking one pointer-sized argument in the C calling convention.
    pub unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl EntryTransfer for DirectCall {
    fn transfer(&mut self, plan: &BootPlan) {
        // SAFETY: guaranteed by the contract of `DirectCall::new`
        unsafe {
            let entry: extern "C" fn(usize) =
                core::mem::transmute::<usize, extern "C" fn(usize)>(plan.entry as usize);
            entry(plan.boot_args as usize);
        }
    }
}
