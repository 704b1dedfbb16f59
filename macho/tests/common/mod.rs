//! Common test utilities

pub mod builder;

#[allow(unused_imports)]
pub use builder::{AfdtBuilder, MachOBuilder};
