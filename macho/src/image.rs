//! Parsed Mach-O image

use crate::command::{CommandCursor, Commands, LoadCommand};
use crate::error::Result;
use crate::header::MachHeader;
use crate::types::{ThreadLayout, Variant};

/// Virtual-address range covered by all segments of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    /// Lowest segment destination address
    pub base: u64,
    /// Highest `dst + dst_len` over all segments
    pub end: u64,
}

impl Footprint {
    /// Start value of the fold; stays in place when there is no segment
    pub const EMPTY: Self = Self {
        base: u64::MAX,
        end: 0,
    };

    /// `true` until at least one segment has been folded in
    pub const fn is_empty(&self) -> bool {
        self.base > self.end
    }

    /// Extend the range to cover `[dst, dst_end)`
    pub fn include(&mut self, dst: u64, dst_end: u64) {
        self.base = self.base.min(dst);
        self.end = self.end.max(dst_end);
    }
}

/// A validated Mach-O header plus the layout choices used to decode it.
///
/// Holds no borrow of the image bytes; methods that need them take the
/// byte view explicitly.
#[derive(Debug, Clone, Copy)]
pub struct MachOImage {
    header: MachHeader,
    variant: Variant,
    layout: ThreadLayout,
}

impl MachOImage {
    /// Validate the header at the start of `data`
    pub fn parse(data: &[u8], variant: Variant, layout: ThreadLayout) -> Result<Self> {
        let header = MachHeader::parse(data, variant)?;

        log::debug!(
            "mach-o: cpu {:#x}/{:#x}, {} load commands",
            header.cpu_type,
            header.cpu_subtype,
            header.commands_nb
        );

        Ok(MachOImage {
            header,
            variant,
            layout,
        })
    }

    /// Parsed file header
    pub fn header(&self) -> &MachHeader {
        &self.header
    }

    /// Header variant the image was parsed as
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Fresh cursor positioned on the first load command
    pub fn cursor(&self) -> CommandCursor {
        CommandCursor::new(
            self.variant.header_size(),
            self.header.commands_nb,
            self.variant,
            self.layout,
        )
    }

    /// Iterate the load commands of `data`
    pub fn commands<'a>(&self, data: &'a [u8]) -> Commands<'a> {
        Commands::new(data, self.cursor())
    }

    /// Fold every segment's destination range into one footprint
    pub fn footprint(&self, data: &[u8]) -> Result<Footprint> {
        let mut footprint = Footprint::EMPTY;

        for command in self.commands(data) {
            if let LoadCommand::Segment(segment) = command? {
                footprint.include(segment.dst, segment.dst_end());
            }
        }

        Ok(footprint)
    }

    /// Program counter of the last unix-thread command, if any
    pub fn entry_point(&self, data: &[u8]) -> Result<Option<u64>> {
        let mut entry = None;

        for command in self.commands(data) {
            if let LoadCommand::UnixThread(thread) = command? {
                entry = Some(thread.pc);
            }
        }

        Ok(entry)
    }
}
