//! Nullable reputation and lockup services.
//!
//! Unknown accounts get the neutral value. Values are returned raw; range
//! clamping is the power calculator's job.

use claw_governance::{LockupSource, ReputationSource, SourceError};
use claw_governance::power::{NEUTRAL_LOCKUP_MULTIPLIER, NEUTRAL_TRUST_SCORE};
use claw_types::Address;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A controllable reputation service.
pub struct NullReputation {
    scores: Mutex<HashMap<Address, u64>>,
    failing: AtomicBool,
}

impl NullReputation {
    pub fn new() -> Self {
        Self {
            scores: Mutex::new(HashMap::new()),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_score(&self, account: Address, score: u64) {
        self.scores.lock().unwrap().insert(account, score);
    }

    /// Make every lookup fail until switched back.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl Default for NullReputation {
    fn default() -> Self {
        Self::new()
    }
}

impl ReputationSource for NullReputation {
    fn trust_score(&self, account: &Address) -> Result<u64, SourceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SourceError::CallFailed("reputation reverted".into()));
        }
        Ok(self
            .scores
            .lock()
            .unwrap()
            .get(account)
            .copied()
            .unwrap_or(NEUTRAL_TRUST_SCORE))
    }
}

/// A controllable staking/lockup service.
pub struct NullLockup {
    multipliers: Mutex<HashMap<Address, u64>>,
    failing: AtomicBool,
}

impl NullLockup {
    pub fn new() -> Self {
        Self {
            multipliers: Mutex::new(HashMap::new()),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_multiplier(&self, account: Address, multiplier: u64) {
        self.multipliers.lock().unwrap().insert(account, multiplier);
    }

    /// Make every lookup fail until switched back.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl Default for NullLockup {
    fn default() -> Self {
        Self::new()
    }
}

impl LockupSource for NullLockup {
    fn lockup_multiplier(&self, account: &Address) -> Result<u64, SourceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable("staking"));
        }
        Ok(self
            .multipliers
            .lock()
            .unwrap()
            .get(account)
            .copied()
            .unwrap_or(NEUTRAL_LOCKUP_MULTIPLIER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_accounts_are_neutral() {
        let reputation = NullReputation::new();
        let lockup = NullLockup::new();
        let a = Address::repeat(1);
        assert_eq!(reputation.trust_score(&a).unwrap(), 0);
        assert_eq!(lockup.lockup_multiplier(&a).unwrap(), 1_000);

        reputation.set_score(a, 500);
        lockup.set_multiplier(a, 2_000);
        assert_eq!(reputation.trust_score(&a).unwrap(), 500);
        assert_eq!(lockup.lockup_multiplier(&a).unwrap(), 2_000);
    }

    #[test]
    fn failure_toggle() {
        let reputation = NullReputation::new();
        reputation.set_failing(true);
        assert!(reputation.trust_score(&Address::repeat(1)).is_err());
        reputation.set_failing(false);
        assert!(reputation.trust_score(&Address::repeat(1)).is_ok());
    }
}
