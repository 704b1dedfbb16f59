//! Mach-O kernel loader
//!
//! Loading runs two passes over the load-command list. The first folds every
//! segment's destination range into the image footprint; the second copies
//! each segment to `dst - base + load_addr` and zero-fills the tail the file
//! does not cover. Segment order in the list does not matter, but overlapping
//! segments are applied in list order.

use macho::{CommandCursor, LoadCommand, MachOError, MachOImage, ThreadLayout, Variant};

use crate::error::Result;
use crate::memory::PhysMemory;
use crate::platform::PlatformConfig;

/// Address range and entry point of a loaded image.
///
/// `base` and `end` are the image's own virtual addresses; `load_addr` is
/// the physical address `base` was placed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadResult {
    /// Lowest segment destination address
    pub base: u64,
    /// Highest segment `dst + dst_len`
    pub end: u64,
    /// Entry point, already translated to its physical address
    pub entry: u64,
    /// Physical address of `base`
    pub load_addr: u64,
}

impl LoadResult {
    /// Result of an unrecognized header or an image with no segment
    pub const INVALID: Self = Self {
        base: u64::MAX,
        end: 0,
        entry: 0,
        load_addr: 0,
    };

    /// `false` means no image was recognized
    pub const fn is_valid(&self) -> bool {
        self.base <= self.end
    }

    /// Translate an image virtual address to its physical address
    pub const fn translate(&self, vaddr: u64) -> u64 {
        vaddr.wrapping_sub(self.base).wrapping_add(self.load_addr)
    }

    /// Physical address just past the last loaded byte
    pub const fn phys_end(&self) -> u64 {
        self.translate(self.end)
    }
}

/// Copies Mach-O segments into physical memory
pub struct ImageLoader {
    variant: Variant,
    layout: ThreadLayout,
    load_addr: u64,
}

impl ImageLoader {
    pub fn new(platform: &PlatformConfig) -> Self {
        Self {
            variant: platform.variant,
            layout: platform.thread_layout,
            load_addr: platform.load_addr(),
        }
    }

    /// Load the image found at physical address `image_addr`.
    ///
    /// A header mismatch or an image without segments returns
    /// `LoadResult::INVALID` before any byte of `mem` is written. Errors are
    /// left for ranges outside `mem` and command lists that cannot be walked.
    pub fn load(&self, mem: &mut PhysMemory<'_>, image_addr: u64) -> Result<LoadResult> {
        let (macho, footprint) = {
            let image = mem.tail(image_addr)?;
            let macho = match MachOImage::parse(image, self.variant, self.layout) {
                Ok(macho) => macho,
                Err(MachOError::FormatMismatch { magic, file_type }) => {
                    log::debug!(
                        "no mach-o at {:#x} (magic {:#x}, type {:#x})",
                        image_addr,
                        magic,
                        file_type
                    );
                    return Ok(LoadResult::INVALID);
                }
                Err(e) => return Err(e.into()),
            };
            let footprint = macho.footprint(image)?;
            (macho, footprint)
        };

        if footprint.is_empty() {
            log::warn!("mach-o at {:#x} has no segments", image_addr);
            return Ok(LoadResult::INVALID);
        }

        let mut result = LoadResult {
            base: footprint.base,
            end: footprint.end,
            entry: self.load_addr,
            load_addr: self.load_addr,
        };

        log::info!(
            "loading mach-o {:#x}..{:#x} at {:#x}",
            result.base,
            result.end,
            result.load_addr
        );

        let mut entry = None;
        let mut cursor: CommandCursor = macho.cursor();

        loop {
            let command = match cursor.next_command(mem.tail(image_addr)?) {
                Some(command) => command?,
                None => break,
            };

            match command {
                LoadCommand::Segment(segment) => {
                    let dst = result.translate(segment.dst);

                    log::debug!(
                        "segment {:<16} {:#x} -> {:#x} ({:#x} file, {:#x} mem)",
                        segment.name_str(),
                        segment.dst,
                        dst,
                        segment.src_len,
                        segment.dst_len
                    );

                    if segment.src_len != 0 && segment.dst_len != 0 {
                        let src = image_addr.wrapping_add(segment.src_offset);
                        mem.copy(src, dst, segment.src_len)?;
                    }

                    let zero_len = segment.zero_fill_len();
                    if zero_len != 0 {
                        mem.fill(dst.wrapping_add(segment.src_len), zero_len, 0)?;
                    }
                }
                LoadCommand::UnixThread(thread) => entry = Some(thread.pc),
                LoadCommand::Other { .. } => {}
            }
        }

        match entry {
            Some(pc) => result.entry = result.translate(pc),
            None => log::warn!("no unix thread, entering at load address"),
        }

        Ok(result)
    }
}
