//! Nullable infrastructure for deterministic testing.
//!
//! Every collaborator the governance service depends on is abstracted behind
//! a trait in `claw_governance::sources`. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically, including forced failures
//! - Never touch the filesystem, network or wall clock
//!
//! All of them are `Send + Sync`, so one instance can be shared through an
//! `Arc` between the service and the test driving it.

pub mod clock;
pub mod executor;
pub mod multipliers;
pub mod registry;
pub mod token;

pub use clock::NullClock;
pub use executor::NullExecutor;
pub use multipliers::{NullLockup, NullReputation};
pub use registry::NullParamRegistry;
pub use token::NullToken;
