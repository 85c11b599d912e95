//! Events emitted by the governance service.

use crate::proposal::{ProposalId, ProposalStatus, ProposalType, Support};
use claw_types::{Address, Hash32, Timestamp};
use serde::Serialize;
use std::sync::{Mutex, PoisonError, RwLock};

/// Governance-level events that observers can subscribe to via the [`EventBus`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GovernanceEvent {
    ProposalCreated {
        id: ProposalId,
        proposer: Address,
        proposal_type: ProposalType,
        description_hash: Hash32,
        target: Address,
        discussion_end_at: Timestamp,
        voting_end_at: Timestamp,
    },
    /// A lifecycle transition, lazy or explicit.
    StatusChanged {
        id: ProposalId,
        from: ProposalStatus,
        to: ProposalStatus,
    },
    VoteCast {
        id: ProposalId,
        voter: Address,
        support: Support,
        weight: u128,
    },
    ProposalQueued {
        id: ProposalId,
        eta: Timestamp,
    },
    ProposalExecuted {
        id: ProposalId,
    },
    ProposalCancelled {
        id: ProposalId,
        by: Address,
    },
    EmergencyExecuted {
        id: ProposalId,
        guardians: Vec<Address>,
    },
    GuardiansUpdated {
        guardians: Vec<Address>,
    },
    SettingsUpdated {
        setting: &'static str,
    },
    PausedChanged {
        paused: bool,
    },
}

type Listener = Box<dyn Fn(&GovernanceEvent) + Send + Sync>;

/// Synchronous fan-out event bus for governance events.
///
/// Listeners are invoked inline on the emitting thread, while the affected
/// proposal is still locked; keep handlers fast and never call back into
/// the service from one. Every event is also appended to a drainable log.
pub struct EventBus {
    listeners: RwLock<Vec<Listener>>,
    log: Mutex<Vec<GovernanceEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self, listener: Listener) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    pub fn emit(&self, event: GovernanceEvent) {
        for listener in self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
        {
            listener(&event);
        }
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    /// Remove and return every event logged so far.
    pub fn take(&self) -> Vec<GovernanceEvent> {
        std::mem::take(&mut *self.log.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
