//! Boot preparation tests

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};

use common::*;
use macho::Variant;
use xnuboot::boot::handoff::DirectCall;
use xnuboot::{prepare, BootPlan, EntryTransfer, PhysMemory};
use xnuboot_core::{logger, BootArgs, BootError};

#[test]
fn test_prepare_plan() {
    let mut backing = ram();
    let mut mem = PhysMemory::new(RAM_BASE, &mut backing);
    let fdt = device_tree();
    stage(&mut mem, &kernel(), &fdt);

    let plan = prepare(&mut mem, &platform(), KERNEL_ADDR, FDT_ADDR, Some("-v")).unwrap();

    assert_eq!(plan.load.base, 0xffff_fff0_0700_0000);
    assert_eq!(plan.load.end, 0xffff_fff0_0700_6000);
    assert_eq!(plan.entry, LOAD_ADDR + 0x80);
    assert_eq!(plan.boot_args, LOAD_ADDR + 0x6000);
    assert_eq!(plan.block.afdt, plan.boot_args + 736);
    assert_eq!(plan.block.afdt_length as usize, fdt.len());
    assert_eq!(plan.used(), LOAD_ADDR..RAM_BASE + 0x10000);

    // Text copied, data tail zeroed
    assert_eq!(mem.read(LOAD_ADDR, 0x100).unwrap(), &[0xd5; 0x100][..]);
    assert!(mem.read(LOAD_ADDR + 0x100, 0x3f00).unwrap().iter().all(|&b| b == 0));
    assert_eq!(mem.read(LOAD_ADDR + 0x4000, 0x10).unwrap(), &[0x11; 0x10][..]);

    let args = BootArgs::read(&mem, plan.boot_args, Variant::Bits64).unwrap();
    assert_eq!(args.virt_base, plan.load.base);
    assert_eq!(args.phys_base, LOAD_ADDR);
    assert_eq!(args.phys_end, plan.phys_end);
}

#[test]
fn test_prepare_rejects_bad_magic() {
    let mut backing = ram();
    let mut mem = PhysMemory::new(RAM_BASE, &mut backing);
    let image = MachOBuilder::new64()
        .magic(0xfeed_fac0)
        .segment("__TEXT", 0x1000, 0x10, 0, 0)
        .build();
    stage(&mut mem, &image, &device_tree());
    let before = mem.as_slice().to_vec();

    let err = prepare(&mut mem, &platform(), KERNEL_ADDR, FDT_ADDR, None).unwrap_err();
    assert_eq!(err, BootError::NoImageFound);
    assert!(err.is_no_image());
    assert_eq!(mem.as_slice(), before.as_slice());
}

#[test]
fn test_prepare_rejects_image_without_segments() {
    let mut backing = ram();
    let mut mem = PhysMemory::new(RAM_BASE, &mut backing);
    let image = MachOBuilder::new64().unix_thread(0x1000).build();
    stage(&mut mem, &image, &device_tree());

    let err = prepare(&mut mem, &platform(), KERNEL_ADDR, FDT_ADDR, None).unwrap_err();
    assert_eq!(err, BootError::NoImageFound);
}

#[test]
fn test_prepare_truncated_tree() {
    let mut backing = ram();
    let mut mem = PhysMemory::new(RAM_BASE, &mut backing);
    mem.write(KERNEL_ADDR, &kernel()).unwrap();

    // Tree header at the last bytes of RAM claims a child that cannot fit
    let fdt_addr = RAM_BASE + RAM_SIZE as u64 - 8;
    mem.write(fdt_addr, &[0, 0, 0, 0, 1, 0, 0, 0]).unwrap();

    let err = prepare(&mut mem, &platform(), KERNEL_ADDR, fdt_addr, None).unwrap_err();
    assert_eq!(err, BootError::TruncatedTree { offset: 8 });
    assert!(!err.is_no_image());
}

#[test]
fn test_prepare_is_repeatable() {
    let mut backing = ram();
    let mut mem = PhysMemory::new(RAM_BASE, &mut backing);
    stage(&mut mem, &kernel(), &device_tree());

    let first = prepare(&mut mem, &platform(), KERNEL_ADDR, FDT_ADDR, Some("-v")).unwrap();
    let snapshot = mem.as_slice().to_vec();
    let second = prepare(&mut mem, &platform(), KERNEL_ADDR, FDT_ADDR, Some("-v")).unwrap();

    assert_eq!(first, second);
    assert_eq!(mem.as_slice(), snapshot.as_slice());
}

#[test]
fn test_prepare_logs_progress() {
    logger::init(log::LevelFilter::Debug);

    let mut backing = ram();
    let mut mem = PhysMemory::new(RAM_BASE, &mut backing);
    stage(&mut mem, &kernel(), &device_tree());
    prepare(&mut mem, &platform(), KERNEL_ADDR, FDT_ADDR, None).unwrap();

    let entries = logger::entries();
    assert!(entries.iter().any(|line| line.starts_with("[INFO] loading mach-o")));
    assert!(entries.iter().any(|line| line.starts_with("[INFO] boot args at")));
    assert!(logger::log_count() > 0);
}

static ENTERED_WITH: AtomicUsize = AtomicUsize::new(0);

extern "C" fn stand_in_kernel(boot_args: usize) {
    ENTERED_WITH.store(boot_args, Ordering::SeqCst);
}

#[test]
fn test_direct_call_passes_boot_args() {
    let mut backing = ram();
    let mut mem = PhysMemory::new(RAM_BASE, &mut backing);
    stage(&mut mem, &kernel(), &device_tree());

    let plan = prepare(&mut mem, &platform(), KERNEL_ADDR, FDT_ADDR, None).unwrap();
    let entry = stand_in_kernel as extern "C" fn(usize) as usize as u64;
    let plan = BootPlan { entry, ..plan };

    // SAFETY: entry is a C function taking one pointer-sized argument
    let mut transfer = unsafe { DirectCall::new() };
    transfer.transfer(&plan);

    assert_eq!(ENTERED_WITH.load(Ordering::SeqCst), plan.boot_args as usize);
}
