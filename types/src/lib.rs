//! Fundamental types for Claw governance.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account addresses, 32-byte digests and timestamps.

pub mod address;
pub mod hash;
pub mod time;

pub use address::{Address, AddressParseError};
pub use hash::Hash32;
pub use time::Timestamp;
