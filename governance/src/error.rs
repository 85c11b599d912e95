use crate::proposal::{ProposalId, ProposalStatus};
use crate::sources::SourceError;
use claw_crypto::CryptoError;
use claw_types::{Address, Timestamp};
use std::fmt;
use thiserror::Error;

/// Coarse classification of a [`GovernanceError`].
///
/// Every failure is local, synchronous and final; callers that want to retry
/// must re-read proposal status first, since state may have advanced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    Unauthorized,
    AlreadyVoted,
    InvalidInput,
    InsufficientPower,
    InsufficientSignatures,
    TimelockNotElapsed,
    Expired,
    ExecutionFailed,
    Paused,
    Collaborator,
    Config,
}

/// The status an operation required.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expected {
    Status(ProposalStatus),
    NonTerminal,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(s) => write!(f, "{s}"),
            Self::NonTerminal => write!(f, "a non-terminal status"),
        }
    }
}

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("proposal {id} is {current}, expected {expected}")]
    InvalidState {
        id: ProposalId,
        current: ProposalStatus,
        expected: Expected,
    },

    #[error("proposal {0} is a signal proposal and cannot be queued or executed")]
    SignalNotExecutable(ProposalId),

    #[error("{caller} may not cancel proposal {id}")]
    NotCanceller { id: ProposalId, caller: Address },

    #[error("{0} is not the governance admin")]
    NotAdmin(Address),

    #[error("{0} is not a registered guardian")]
    NotGuardian(Address),

    #[error("{voter} has already voted on proposal {id}")]
    AlreadyVoted { id: ProposalId, voter: Address },

    #[error("support value {0} is invalid (expected 0=against, 1=for, 2=abstain)")]
    InvalidSupport(u8),

    #[error("{0} must not be the zero address")]
    ZeroAddress(&'static str),

    #[error("{signers} signers but {signatures} signatures")]
    LengthMismatch { signers: usize, signatures: usize },

    #[error("signature {index} is invalid: {source}")]
    InvalidSignature {
        index: usize,
        #[source]
        source: CryptoError,
    },

    #[error("signature {index} was produced by {recovered}, not the claimed {claimed}")]
    SignerMismatch {
        index: usize,
        claimed: Address,
        recovered: Address,
    },

    #[error("guardian {0} signed more than once")]
    DuplicateSigner(Address),

    #[error("guardian set must hold exactly {expected} addresses, got {got}")]
    GuardianCount { expected: usize, got: usize },

    #[error("guardian {0} appears more than once")]
    DuplicateGuardian(Address),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("vote tally overflow on proposal {0}")]
    TallyOverflow(ProposalId),

    #[error("insufficient voting power: have {have}, need {need}")]
    InsufficientPower { have: u128, need: u128 },

    #[error("insufficient guardian signatures: {have} < {need}")]
    InsufficientSignatures { have: usize, need: usize },

    #[error("proposal {id} timelock ends at {eta}, now {now}")]
    TimelockNotElapsed {
        id: ProposalId,
        eta: Timestamp,
        now: Timestamp,
    },

    #[error("proposal {id} expired: execution window closed at {deadline}")]
    Expired { id: ProposalId, deadline: Timestamp },

    #[error("execution of proposal {id} failed: {reason}")]
    ExecutionFailed { id: ProposalId, reason: String },

    #[error("governance is paused")]
    Paused,

    #[error("collaborator error: {0}")]
    Collaborator(#[from] SourceError),

    #[error("config error: {0}")]
    Config(String),
}

impl GovernanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ProposalNotFound(_) => ErrorKind::NotFound,
            Self::InvalidState { .. } | Self::SignalNotExecutable(_) => ErrorKind::InvalidState,
            Self::NotCanceller { .. } | Self::NotAdmin(_) | Self::NotGuardian(_) => {
                ErrorKind::Unauthorized
            }
            Self::AlreadyVoted { .. } => ErrorKind::AlreadyVoted,
            Self::InvalidSupport(_)
            | Self::ZeroAddress(_)
            | Self::LengthMismatch { .. }
            | Self::InvalidSignature { .. }
            | Self::SignerMismatch { .. }
            | Self::DuplicateSigner(_)
            | Self::GuardianCount { .. }
            | Self::DuplicateGuardian(_)
            | Self::InvalidParameter(_)
            | Self::TallyOverflow(_) => ErrorKind::InvalidInput,
            Self::InsufficientPower { .. } => ErrorKind::InsufficientPower,
            Self::InsufficientSignatures { .. } => ErrorKind::InsufficientSignatures,
            Self::TimelockNotElapsed { .. } => ErrorKind::TimelockNotElapsed,
            Self::Expired { .. } => ErrorKind::Expired,
            Self::ExecutionFailed { .. } => ErrorKind::ExecutionFailed,
            Self::Paused => ErrorKind::Paused,
            Self::Collaborator(_) => ErrorKind::Collaborator,
            Self::Config(_) => ErrorKind::Config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_reports_current_and_expected() {
        let err = GovernanceError::InvalidState {
            id: 3,
            current: ProposalStatus::Discussion,
            expected: Expected::Status(ProposalStatus::Voting),
        };
        assert_eq!(err.to_string(), "proposal 3 is Discussion, expected Voting");
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn signature_errors_are_invalid_input() {
        let err = GovernanceError::InvalidSignature {
            index: 2,
            source: CryptoError::HighS,
        };
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("half-order"));
    }
}
