//! Voting power: `isqrt(balance) * (1000 + trust) * lockup / 1_000_000`.
//!
//! All arithmetic is integer with floor rounding so every node computes the
//! same weight. Trust score and lockup multiplier are best-effort lookups that
//! fall back to neutral values when their service is absent or failing.

use crate::sources::{LockupSource, NeutralLockup, NeutralReputation, ReputationSource};
use claw_types::Address;
use std::sync::Arc;

pub const NEUTRAL_TRUST_SCORE: u64 = 0;
pub const MAX_TRUST_SCORE: u64 = 1000;
pub const NEUTRAL_LOCKUP_MULTIPLIER: u64 = 1000;
pub const MAX_LOCKUP_MULTIPLIER: u64 = 3000;

/// Undoes the two ×1000 fixed-point scalings in one division.
const POWER_SCALE: u128 = 1_000_000;

/// Integer square root, `floor(sqrt(n))`, by Newton's method.
///
/// Starts from a power of two at or above the root so the iteration
/// decreases monotonically and never overflows.
pub fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    let bits = 128 - n.leading_zeros();
    let mut x: u128 = 1 << bits.div_ceil(2);
    loop {
        let y = (x + n / x) / 2;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// Voting power of a balance under the given (clamped) multipliers.
pub fn voting_power(balance: u128, trust_score: u64, lockup_multiplier: u64) -> u128 {
    if balance == 0 {
        return 0;
    }
    let trust = trust_score.min(MAX_TRUST_SCORE) as u128;
    let lockup = lockup_multiplier.clamp(NEUTRAL_LOCKUP_MULTIPLIER, MAX_LOCKUP_MULTIPLIER) as u128;
    // isqrt(u128::MAX) * 2000 * 3000 < 2^87, no overflow.
    isqrt(balance) * (1000 + trust) * lockup / POWER_SCALE
}

/// Computes voting power for accounts, consulting reputation and lockup.
pub struct VotingPowerCalculator {
    reputation: Arc<dyn ReputationSource>,
    lockup: Arc<dyn LockupSource>,
}

impl VotingPowerCalculator {
    pub fn new(reputation: Arc<dyn ReputationSource>, lockup: Arc<dyn LockupSource>) -> Self {
        Self { reputation, lockup }
    }

    /// Calculator with neither reputation nor lockup deployed.
    pub fn neutral() -> Self {
        Self::new(Arc::new(NeutralReputation), Arc::new(NeutralLockup))
    }

    /// Trust score of `account`, clamped to `0..=1000`; 0 if the lookup fails.
    pub fn trust_score(&self, account: &Address) -> u64 {
        match self.reputation.trust_score(account) {
            Ok(score) => score.min(MAX_TRUST_SCORE),
            Err(e) => {
                tracing::warn!(%account, error = %e, "trust score lookup failed, using neutral score");
                NEUTRAL_TRUST_SCORE
            }
        }
    }

    /// Lockup multiplier of `account`, clamped to `1000..=3000`; 1000 if the lookup fails.
    pub fn lockup_multiplier(&self, account: &Address) -> u64 {
        match self.lockup.lockup_multiplier(account) {
            Ok(m) => m.clamp(NEUTRAL_LOCKUP_MULTIPLIER, MAX_LOCKUP_MULTIPLIER),
            Err(e) => {
                tracing::warn!(%account, error = %e, "lockup lookup failed, using neutral multiplier");
                NEUTRAL_LOCKUP_MULTIPLIER
            }
        }
    }

    /// Voting power of `account` holding `balance`.
    pub fn power_of(&self, account: &Address, balance: u128) -> u128 {
        if balance == 0 {
            return 0;
        }
        let trust = self.trust_score(account);
        let lockup = self.lockup_multiplier(account);
        voting_power(balance, trust, lockup)
    }
}
