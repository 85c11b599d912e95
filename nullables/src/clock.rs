//! Nullable clock: deterministic time and block height for testing.

use claw_governance::Clock;
use claw_types::Timestamp;
use std::sync::atomic::{AtomicU64, Ordering};

/// A deterministic clock for testing.
///
/// Time only advances when you tell it to. Each [`NullClock::advance`] also
/// produces one new block.
pub struct NullClock {
    current: AtomicU64,
    height: AtomicU64,
}

impl NullClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: AtomicU64::new(initial_secs),
            height: AtomicU64::new(1),
        }
    }

    /// Advance time by a number of seconds and mine one block.
    pub fn advance(&self, secs: u64) {
        self.current.fetch_add(secs, Ordering::SeqCst);
        self.height.fetch_add(1, Ordering::SeqCst);
    }

    /// Set the time to a specific value.
    pub fn set(&self, secs: u64) {
        self.current.store(secs, Ordering::SeqCst);
    }

    pub fn set_height(&self, height: u64) {
        self.height.store(height, Ordering::SeqCst);
    }
}

impl Clock for NullClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.current.load(Ordering::SeqCst))
    }

    fn height(&self) -> u64 {
        self.height.load(Ordering::SeqCst)
    }
}
