//! Mach-O Executable Parsing
//!
//! A `no_std` parser for the subset of the Mach-O container format a kernel
//! loader needs: the file header, the load-command list, segment commands and
//! the unix-thread command carrying the initial program counter.
//!
//! # Overview
//!
//! Two header variants exist and are chosen once, at configuration time:
//! - **32-bit**: magic `0xfeedface`, segment command `0x1`, 28-byte header
//! - **64-bit**: magic `0xfeedfacf`, segment command `0x19`, 32-byte header
//!
//! Nothing here writes memory. Parsing works on an immutable byte view and
//! every read is bounds-checked; the load-command list is walked by adding each
//! command's own declared size, never by indexing.
//!
//! # Usage
//!
//! ```ignore
//! use macho::{MachOImage, ThreadLayout, Variant};
//!
//! let image = MachOImage::parse(bytes, Variant::Bits64, ThreadLayout::Arm64)?;
//! let footprint = image.footprint(bytes)?;
//!
//! for command in image.commands(bytes) {
//!     match command? {
//!         LoadCommand::Segment(segment) => { /* copy it */ }
//!         LoadCommand::UnixThread(thread) => { /* thread.pc */ }
//!         LoadCommand::Other { .. } => {}
//!     }
//! }
//! ```

#![no_std]
#![warn(missing_docs)]

pub mod command;
pub mod error;
pub mod header;
pub mod image;
pub mod types;
mod utils;

pub use command::{CommandCursor, Commands, LoadCommand, Segment, ThreadState};
pub use error::{MachOError, Result};
pub use header::MachHeader;
pub use image::{Footprint, MachOImage};
pub use types::{ThreadLayout, Variant};
