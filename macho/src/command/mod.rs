//! Load command list
//!
//! Load commands follow the header back-to-back. Each starts with a tag and
//! its own total size, so the list is walked by adding that size to the
//! current offset. Unrecognized tags are skipped the same way.

mod segment;
mod thread;

pub use segment::Segment;
pub use thread::ThreadState;

use crate::error::{MachOError, Result};
use crate::types::{ThreadLayout, Variant, LC_UNIXTHREAD, LOAD_COMMAND_HEADER_SIZE};
use crate::utils::read_u32;

/// A decoded load command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadCommand {
    /// `LC_SEGMENT` / `LC_SEGMENT_64`
    Segment(Segment),
    /// `LC_UNIXTHREAD`
    UnixThread(ThreadState),
    /// Any other command, skipped by the loader
    Other {
        /// Command tag
        cmd: u32,
        /// Declared command size
        size: u32,
    },
}

/// Position in the load-command list.
///
/// The cursor owns no borrow of the image: each step takes the byte view
/// explicitly and returns an owned command, so callers can mutate memory
/// between steps.
#[derive(Debug, Clone)]
pub struct CommandCursor {
    offset: usize,
    remaining: u32,
    variant: Variant,
    layout: ThreadLayout,
}

impl CommandCursor {
    /// Cursor over `count` commands starting at `offset`
    pub const fn new(offset: usize, count: u32, variant: Variant, layout: ThreadLayout) -> Self {
        Self {
            offset,
            remaining: count,
            variant,
            layout,
        }
    }

    /// Offset of the next command within the image
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Decode the next command from `image` and advance past it.
    ///
    /// A truncated or malformed record ends the walk: the error is returned
    /// once and every later call yields `None`.
    pub fn next_command(&mut self, image: &[u8]) -> Option<Result<LoadCommand>> {
        if self.remaining == 0 {
            return None;
        }

        match self.decode(image) {
            Ok((command, size)) => {
                self.remaining -= 1;
                // Overflow here means the following read is out of bounds anyway
                self.offset = self.offset.saturating_add(size as usize);
                Some(Ok(command))
            }
            Err(e) => {
                self.remaining = 0;
                Some(Err(e))
            }
        }
    }

    fn decode(&self, image: &[u8]) -> Result<(LoadCommand, u32)> {
        let offset = self.offset;
        let cmd = read_u32(image, offset)?;
        let size = read_u32(image, offset + 4)?;

        if (size as usize) < LOAD_COMMAND_HEADER_SIZE {
            return Err(MachOError::MalformedCommand { offset, size });
        }

        let command = if cmd == self.variant.segment_command() {
            LoadCommand::Segment(Segment::parse(image, offset, self.variant)?)
        } else if cmd == LC_UNIXTHREAD {
            LoadCommand::UnixThread(ThreadState::parse(image, offset, self.layout)?)
        } else {
            LoadCommand::Other { cmd, size }
        };

        Ok((command, size))
    }
}

/// Iterator over the load commands of an image
pub struct Commands<'a> {
    image: &'a [u8],
    cursor: CommandCursor,
}

impl<'a> Commands<'a> {
    pub(crate) fn new(image: &'a [u8], cursor: CommandCursor) -> Self {
        Self { image, cursor }
    }
}

impl Iterator for Commands<'_> {
    type Item = Result<LoadCommand>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next_command(self.image)
    }
}
