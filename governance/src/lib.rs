//! Decentralized governance for Claw.
//!
//! Proposals move `Discussion → Voting → Passed/Rejected → Timelocked →
//! Executed/Expired`, with `Cancelled` reachable from any non-terminal state.
//! Time-driven transitions are applied lazily at the next interaction.
//!
//! Ballots are weighted by `isqrt(balance) × reputation × lockup`; a proposal
//! passes when participation reaches the quorum and `for > against`. Five of
//! nine guardians can bypass the pipeline and execute immediately.
//!
//! [`GovernanceService`] is the entry point; every external dependency is
//! injected through the traits in [`sources`].

pub mod config;
pub mod emergency;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod params;
pub mod power;
pub mod proposal;
pub mod quorum;
pub mod service;
pub mod sources;
pub mod spans;
pub mod store;

pub use config::{GovernanceConfig, PowerMode, Settings};
pub use emergency::{
    emergency_digest, verify_authorization, GuardianSet, EMERGENCY_THRESHOLD, GUARDIAN_COUNT,
};
pub use error::{ErrorKind, Expected, GovernanceError};
pub use events::{EventBus, GovernanceEvent};
pub use lifecycle::{project_status, EXECUTION_WINDOW_SECS};
pub use params::{GovernableParam, GovernanceParams};
pub use power::{isqrt, voting_power, VotingPowerCalculator};
pub use proposal::{Proposal, ProposalDraft, ProposalId, ProposalStatus, ProposalType, Receipt, Support};
pub use quorum::QuorumEvaluator;
pub use service::{Collaborators, GovernanceService};
pub use sources::{
    Clock, LockupSource, NeutralLockup, NeutralReputation, ParamRegistry, ProposalExecutor,
    ReputationSource, SourceError, SystemClock, TokenLedger,
};
pub use store::{ProposalRecord, ProposalStore};
