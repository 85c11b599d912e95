//! Governable parameters and their effective values.
//!
//! Each local setting can be overridden through the external ParamRegistry;
//! the registry key for a parameter is [`GovernableParam::name`].

use crate::config::PowerMode;
use serde::{Deserialize, Serialize};

/// Parameters the ParamRegistry may override.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GovernableParam {
    ProposalThreshold,
    DiscussionPeriod,
    VotingPeriod,
    TimelockDelay,
    QuorumBps,
}

impl GovernableParam {
    pub const ALL: [GovernableParam; 5] = [
        Self::ProposalThreshold,
        Self::DiscussionPeriod,
        Self::VotingPeriod,
        Self::TimelockDelay,
        Self::QuorumBps,
    ];

    /// Registry key of this parameter.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ProposalThreshold => "proposal_threshold",
            Self::DiscussionPeriod => "discussion_period",
            Self::VotingPeriod => "voting_period",
            Self::TimelockDelay => "timelock_delay",
            Self::QuorumBps => "quorum_bps",
        }
    }
}

/// Effective governance parameters after registry overrides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GovernanceParams {
    pub proposal_threshold: u128,
    pub discussion_period_secs: u64,
    pub voting_period_secs: u64,
    pub timelock_delay_secs: u64,
    pub quorum_bps: u32,
    pub execution_window_secs: u64,
    pub emergency_threshold: usize,
    pub guardian_count: usize,
    pub power_mode: PowerMode,
    pub paused: bool,
}

/// Narrow a registry value to a duration.
pub(crate) fn saturating_secs(value: u128) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Narrow a registry value to a basis-point quorum, clamped to 100%.
pub(crate) fn clamp_bps(value: u128) -> u32 {
    value.min(crate::quorum::BPS_DENOMINATOR as u128) as u32
}
