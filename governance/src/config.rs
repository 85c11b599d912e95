//! Governance configuration with TOML file support.

use crate::emergency::GuardianSet;
use crate::error::GovernanceError;
use crate::quorum::BPS_DENOMINATOR;
use claw_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How ballots are weighted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerMode {
    /// Live balance at the moment the ballot is cast.
    #[default]
    Live,
    /// Balance at the block before the proposal's `snapshot_block`.
    Snapshot,
}

/// Static configuration for a governance instance.
///
/// Can be loaded from a TOML file via [`GovernanceConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Seconds between creation and the opening of the vote.
    #[serde(default = "default_discussion_period")]
    pub discussion_period_secs: u64,

    #[serde(default = "default_voting_period")]
    pub voting_period_secs: u64,

    /// Delay between queueing and earliest execution.
    #[serde(default = "default_timelock_delay")]
    pub timelock_delay_secs: u64,

    /// Minimum voting power needed to propose.
    #[serde(default = "default_proposal_threshold")]
    pub proposal_threshold: u64,

    #[serde(default = "default_quorum_bps")]
    pub quorum_bps: u32,

    /// Chain id mixed into emergency digests.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Address of this governance instance, mixed into emergency digests.
    #[serde(default)]
    pub instance_address: Address,

    /// Holder of the administrative role.
    #[serde(default)]
    pub admin: Address,

    /// Accounts allowed to cancel any proposal.
    #[serde(default)]
    pub cancellers: Vec<Address>,

    /// The nine emergency guardians.
    #[serde(default)]
    pub guardians: Vec<Address>,

    #[serde(default)]
    pub power_mode: PowerMode,

    /// Start with mutating operations blocked.
    #[serde(default)]
    pub paused: bool,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_discussion_period() -> u64 {
    2 * 24 * 3600
}

fn default_voting_period() -> u64 {
    3 * 24 * 3600
}

fn default_timelock_delay() -> u64 {
    24 * 3600
}

fn default_proposal_threshold() -> u64 {
    100
}

fn default_quorum_bps() -> u32 {
    400
}

fn default_chain_id() -> u64 {
    1
}

// ── Impl ───────────────────────────────────────────────────────────────

impl GovernanceConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, GovernanceError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| GovernanceError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, GovernanceError> {
        toml::from_str(s).map_err(|e| GovernanceError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, GovernanceError> {
        toml::to_string_pretty(self).map_err(|e| GovernanceError::Config(e.to_string()))
    }

    /// Check ranges and build the runtime settings.
    pub fn validate(&self) -> Result<Settings, GovernanceError> {
        let zero = if self.admin.is_zero() {
            Some(GovernanceError::ZeroAddress("admin"))
        } else if self.instance_address.is_zero() {
            Some(GovernanceError::ZeroAddress("instance"))
        } else if self.cancellers.iter().any(Address::is_zero) {
            Some(GovernanceError::ZeroAddress("canceller"))
        } else {
            None
        };
        if let Some(err) = zero {
            return Err(GovernanceError::Config(err.to_string()));
        }
        let settings = Settings {
            discussion_period_secs: self.discussion_period_secs,
            voting_period_secs: self.voting_period_secs,
            timelock_delay_secs: self.timelock_delay_secs,
            proposal_threshold: self.proposal_threshold as u128,
            quorum_bps: self.quorum_bps,
            admin: self.admin,
            cancellers: self.cancellers.iter().copied().collect(),
            guardians: GuardianSet::new(&self.guardians)
                .map_err(|e| GovernanceError::Config(e.to_string()))?,
            power_mode: self.power_mode,
            paused: self.paused,
        };
        settings
            .check()
            .map_err(|e| GovernanceError::Config(e.to_string()))?;
        Ok(settings)
    }
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            discussion_period_secs: default_discussion_period(),
            voting_period_secs: default_voting_period(),
            timelock_delay_secs: default_timelock_delay(),
            proposal_threshold: default_proposal_threshold(),
            quorum_bps: default_quorum_bps(),
            chain_id: default_chain_id(),
            instance_address: Address::ZERO,
            admin: Address::ZERO,
            cancellers: Vec::new(),
            guardians: Vec::new(),
            power_mode: PowerMode::default(),
            paused: false,
        }
    }
}

/// Runtime-governable settings.
///
/// Held as an immutable snapshot: admin updates build a modified copy and
/// swap it in whole, so readers never observe a half-applied update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub discussion_period_secs: u64,
    pub voting_period_secs: u64,
    pub timelock_delay_secs: u64,
    pub proposal_threshold: u128,
    pub quorum_bps: u32,
    pub admin: Address,
    pub cancellers: BTreeSet<Address>,
    pub guardians: GuardianSet,
    pub power_mode: PowerMode,
    pub paused: bool,
}

impl Settings {
    /// Range checks shared by config loading and admin setters.
    pub fn check(&self) -> Result<(), GovernanceError> {
        if self.voting_period_secs == 0 {
            return Err(GovernanceError::InvalidParameter(
                "voting period must be non-zero".into(),
            ));
        }
        if self.quorum_bps > BPS_DENOMINATOR {
            return Err(GovernanceError::InvalidParameter(format!(
                "quorum {} bps exceeds {}",
                self.quorum_bps, BPS_DENOMINATOR
            )));
        }
        Ok(())
    }
}
