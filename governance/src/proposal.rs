//! Governance proposals and their lifecycle states.

use crate::error::GovernanceError;
use claw_types::{Address, Hash32, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Proposal identifier. Allocated from 1 upward; 0 never names a proposal.
pub type ProposalId = u64;

/// What kind of change a proposal makes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalType {
    ParameterChange,
    TreasurySpend,
    ProtocolUpgrade,
    Emergency,
    /// Informational only; can never be queued or executed.
    Signal,
}

impl ProposalType {
    pub fn is_executable(&self) -> bool {
        !matches!(self, Self::Signal)
    }
}

/// Lifecycle state of a proposal.
///
/// `Discussion → Voting → {Passed, Rejected}`, `Passed → Timelocked →
/// {Executed, Expired}`, and `Cancelled` from any non-terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalStatus {
    Discussion,
    Voting,
    Passed,
    Rejected,
    Timelocked,
    Executed,
    Cancelled,
    Expired,
}

impl ProposalStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Executed | Self::Cancelled | Self::Expired | Self::Rejected
        )
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Ballot choice. Encoded on the wire as 0, 1, 2.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Support {
    #[default]
    Against = 0,
    For = 1,
    Abstain = 2,
}

impl TryFrom<u8> for Support {
    type Error = GovernanceError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Against),
            1 => Ok(Self::For),
            2 => Ok(Self::Abstain),
            other => Err(GovernanceError::InvalidSupport(other)),
        }
    }
}

/// A voter's ballot on one proposal. Immutable once `has_voted` is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub has_voted: bool,
    pub support: Support,
    pub weight: u128,
}

/// A governance proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub proposer: Address,
    pub proposal_type: ProposalType,
    pub status: ProposalStatus,
    pub description_hash: Hash32,
    /// Zero target means executing is a no-op.
    pub target: Address,
    pub call_data: Vec<u8>,
    /// Height at creation. In snapshot power mode ballots are weighed by the
    /// balance at the block before this one, so same-block purchases do not count.
    pub snapshot_block: u64,
    pub created_at: Timestamp,
    pub discussion_end_at: Timestamp,
    pub voting_end_at: Timestamp,
    /// Epoch until the proposal is queued.
    pub timelock_end_at: Timestamp,
    pub for_votes: u128,
    pub against_votes: u128,
    pub abstain_votes: u128,
}

/// Inputs for a new proposal.
#[derive(Clone, Debug)]
pub struct ProposalDraft {
    pub proposer: Address,
    pub proposal_type: ProposalType,
    pub description_hash: Hash32,
    pub target: Address,
    pub call_data: Vec<u8>,
}

impl Proposal {
    /// Build a fresh proposal in `Discussion` with zero tallies.
    pub fn open(
        id: ProposalId,
        draft: ProposalDraft,
        snapshot_block: u64,
        created_at: Timestamp,
        discussion_period_secs: u64,
        voting_period_secs: u64,
    ) -> Self {
        let discussion_end_at = created_at.plus(discussion_period_secs);
        Self {
            id,
            proposer: draft.proposer,
            proposal_type: draft.proposal_type,
            status: ProposalStatus::Discussion,
            description_hash: draft.description_hash,
            target: draft.target,
            call_data: draft.call_data,
            snapshot_block,
            created_at,
            discussion_end_at,
            voting_end_at: discussion_end_at.plus(voting_period_secs),
            timelock_end_at: Timestamp::EPOCH,
            for_votes: 0,
            against_votes: 0,
            abstain_votes: 0,
        }
    }

    /// Sum of all three tallies (saturating).
    pub fn total_votes(&self) -> u128 {
        self.for_votes
            .saturating_add(self.against_votes)
            .saturating_add(self.abstain_votes)
    }

    /// Add `weight` to the tally for `support`.
    pub(crate) fn tally(&mut self, support: Support, weight: u128) -> Result<(), GovernanceError> {
        let slot = match support {
            Support::For => &mut self.for_votes,
            Support::Against => &mut self.against_votes,
            Support::Abstain => &mut self.abstain_votes,
        };
        *slot = slot
            .checked_add(weight)
            .ok_or(GovernanceError::TallyOverflow(self.id))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ProposalDraft {
        ProposalDraft {
            proposer: Address::repeat(1),
            proposal_type: ProposalType::ParameterChange,
            description_hash: Hash32::new([5; 32]),
            target: Address::ZERO,
            call_data: Vec::new(),
        }
    }

    #[test]
    fn open_sets_timeline() {
        let p = Proposal::open(1, draft(), 42, Timestamp::new(1_000), 100, 50);
        assert_eq!(p.status, ProposalStatus::Discussion);
        assert_eq!(p.discussion_end_at, Timestamp::new(1_100));
        assert_eq!(p.voting_end_at, Timestamp::new(1_150));
        assert!(p.timelock_end_at.is_epoch());
        assert_eq!(p.snapshot_block, 42);
        assert_eq!(p.total_votes(), 0);
    }

    #[test]
    fn support_decoding() {
        assert_eq!(Support::try_from(0).unwrap(), Support::Against);
        assert_eq!(Support::try_from(1).unwrap(), Support::For);
        assert_eq!(Support::try_from(2).unwrap(), Support::Abstain);
        assert!(matches!(
            Support::try_from(3),
            Err(GovernanceError::InvalidSupport(3))
        ));
    }

    #[test]
    fn terminal_states() {
        use ProposalStatus::*;
        for s in [Executed, Cancelled, Expired, Rejected] {
            assert!(s.is_terminal(), "{s}");
        }
        for s in [Discussion, Voting, Passed, Timelocked] {
            assert!(!s.is_terminal(), "{s}");
        }
    }

    #[test]
    fn tally_overflow_is_an_error() {
        let mut p = Proposal::open(9, draft(), 0, Timestamp::new(1), 1, 1);
        p.tally(Support::For, u128::MAX).unwrap();
        assert!(matches!(
            p.tally(Support::For, 1),
            Err(GovernanceError::TallyOverflow(9))
        ));
        p.tally(Support::Abstain, 3).unwrap();
        assert_eq!(p.total_votes(), u128::MAX);
    }

    #[test]
    fn signal_is_not_executable() {
        assert!(!ProposalType::Signal.is_executable());
        assert!(ProposalType::TreasurySpend.is_executable());
    }
}
