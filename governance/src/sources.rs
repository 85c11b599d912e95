//! Seams to the collaborators governance depends on.
//!
//! All external reads and the execution side effect go through these traits.
//! Production wires real token/registry/reputation/staking services here;
//! tests use `claw-nullables`.

use claw_types::{Address, Timestamp};
use thiserror::Error;

/// Failure reported by a collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("{0} is unavailable")]
    Unavailable(&'static str),

    #[error("call failed: {0}")]
    CallFailed(String),
}

/// The single authoritative time source.
///
/// Every window check (`discussion_end_at`, `voting_end_at`,
/// `timelock_end_at`, the execution window) reads this clock; all nodes
/// evaluating the same proposal must share it.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;

    /// Current block height, recorded as a proposal's snapshot point.
    fn height(&self) -> u64;
}

/// Wall-clock time source. Height advances once per second.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }

    fn height(&self) -> u64 {
        Timestamp::now().as_secs()
    }
}

/// Fungible balance ledger.
pub trait TokenLedger: Send + Sync {
    fn balance_of(&self, account: &Address) -> Result<u128, SourceError>;

    /// Balance as of `height`. Ledgers without history report the live balance.
    fn balance_of_at(&self, account: &Address, _height: u64) -> Result<u128, SourceError> {
        self.balance_of(account)
    }

    fn total_supply(&self) -> Result<u128, SourceError>;
}

/// Key/value store of governable parameters.
pub trait ParamRegistry: Send + Sync {
    /// Stored value for `key`, or `default` when unset.
    fn get_param_with_default(&self, key: &str, default: u128) -> u128;
}

/// Reputation service. Scores are expected in `0..=1000`.
pub trait ReputationSource: Send + Sync {
    fn trust_score(&self, account: &Address) -> Result<u64, SourceError>;
}

/// Staking/lockup service. Multipliers are fixed-point ×1000 in `1000..=3000`.
pub trait LockupSource: Send + Sync {
    fn lockup_multiplier(&self, account: &Address) -> Result<u64, SourceError>;
}

/// Performs the effect of an executed proposal.
///
/// Called while the proposal is locked; implementations must not call back
/// into governance for the same proposal.
pub trait ProposalExecutor: Send + Sync {
    fn execute(&self, target: &Address, call_data: &[u8]) -> Result<(), SourceError>;
}

/// Reputation source used when no reputation service is deployed.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeutralReputation;

impl ReputationSource for NeutralReputation {
    fn trust_score(&self, _account: &Address) -> Result<u64, SourceError> {
        Ok(crate::power::NEUTRAL_TRUST_SCORE)
    }
}

/// Lockup source used when no staking service is deployed.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeutralLockup;

impl LockupSource for NeutralLockup {
    fn lockup_multiplier(&self, _account: &Address) -> Result<u64, SourceError> {
        Ok(crate::power::NEUTRAL_LOCKUP_MULTIPLIER)
    }
}
