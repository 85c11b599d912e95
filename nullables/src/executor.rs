//! Nullable proposal executor: records target calls instead of making them.

use claw_governance::{ProposalExecutor, SourceError};
use claw_types::Address;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// An executor that records every call it receives.
pub struct NullExecutor {
    calls: Mutex<Vec<(Address, Vec<u8>)>>,
    failing: AtomicBool,
}

impl NullExecutor {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every call revert until switched back. Failed calls are not recorded.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Successful calls so far, in order.
    pub fn calls(&self) -> Vec<(Address, Vec<u8>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for NullExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ProposalExecutor for NullExecutor {
    fn execute(&self, target: &Address, call_data: &[u8]) -> Result<(), SourceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SourceError::CallFailed("target reverted".into()));
        }
        self.calls
            .lock()
            .unwrap()
            .push((*target, call_data.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_successful_calls_only() {
        let executor = NullExecutor::new();
        executor.execute(&Address::repeat(9), &[1, 2]).unwrap();
        executor.set_failing(true);
        assert!(executor.execute(&Address::repeat(9), &[3]).is_err());
        assert_eq!(executor.calls(), vec![(Address::repeat(9), vec![1, 2])]);
        assert_eq!(executor.call_count(), 1);
    }
}
