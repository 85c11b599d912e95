//! In-memory proposal store with per-proposal serialization.
//!
//! Each proposal record sits behind its own mutex: every mutating operation
//! on a proposal runs as one critical section, so concurrent ballots on the
//! same proposal serialize without lost tally updates, while operations on
//! different proposals proceed in parallel. Reads clone a consistent
//! snapshot of the record.

use crate::error::GovernanceError;
use crate::proposal::{Proposal, ProposalId, Receipt, Support};
use claw_types::Address;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// A proposal plus its ballots.
#[derive(Clone, Debug)]
pub struct ProposalRecord {
    pub proposal: Proposal,
    receipts: HashMap<Address, Receipt>,
    /// Voters in casting order.
    voters: Vec<Address>,
}

impl ProposalRecord {
    fn new(proposal: Proposal) -> Self {
        Self {
            proposal,
            receipts: HashMap::new(),
            voters: Vec::new(),
        }
    }

    /// Receipt of `voter`; the default (not voted) receipt if none.
    pub fn receipt(&self, voter: &Address) -> Receipt {
        self.receipts.get(voter).copied().unwrap_or_default()
    }

    pub fn has_voted(&self, voter: &Address) -> bool {
        self.receipts.contains_key(voter)
    }

    /// Every ballot in casting order.
    pub fn ballots(&self) -> Vec<(Address, Receipt)> {
        self.voters
            .iter()
            .map(|v| (*v, self.receipt(v)))
            .collect()
    }

    /// Record a ballot and add its weight to the tally.
    ///
    /// A voter gets exactly one receipt per proposal; nothing is modified if
    /// the voter already has one or the tally would overflow.
    pub fn record_vote(
        &mut self,
        voter: Address,
        support: Support,
        weight: u128,
    ) -> Result<Receipt, GovernanceError> {
        if self.has_voted(&voter) {
            return Err(GovernanceError::AlreadyVoted {
                id: self.proposal.id,
                voter,
            });
        }
        self.proposal.tally(support, weight)?;
        let receipt = Receipt {
            has_voted: true,
            support,
            weight,
        };
        self.receipts.insert(voter, receipt);
        self.voters.push(voter);
        Ok(receipt)
    }
}

/// Storage for all proposals, keyed by id. Proposals are never removed.
pub struct ProposalStore {
    records: RwLock<BTreeMap<ProposalId, Arc<Mutex<ProposalRecord>>>>,
    next_id: RwLock<ProposalId>,
}

impl ProposalStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            next_id: RwLock::new(1),
        }
    }

    /// Allocate the next id and insert the proposal built for it.
    pub fn create(&self, build: impl FnOnce(ProposalId) -> Proposal) -> ProposalId {
        let mut next = self.next_id.write().unwrap_or_else(PoisonError::into_inner);
        let id = *next;
        let record = ProposalRecord::new(build(id));
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(Mutex::new(record)));
        *next += 1;
        id
    }

    fn entry(&self, id: ProposalId) -> Result<Arc<Mutex<ProposalRecord>>, GovernanceError> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    /// Run `f` with exclusive access to proposal `id`.
    ///
    /// Changes `f` makes before returning an error are kept; callers rely on
    /// this to commit a lazy status transition and still fail the operation.
    pub fn update<R>(
        &self,
        id: ProposalId,
        f: impl FnOnce(&mut ProposalRecord) -> Result<R, GovernanceError>,
    ) -> Result<R, GovernanceError> {
        let entry = self.entry(id)?;
        let mut record = entry.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut record)
    }

    /// A consistent copy of proposal `id` and its ballots.
    pub fn snapshot(&self, id: ProposalId) -> Result<ProposalRecord, GovernanceError> {
        let entry = self.entry(id)?;
        let record = entry.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(record.clone())
    }

    /// All proposal ids in ascending order.
    pub fn ids(&self) -> Vec<ProposalId> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ProposalStore {
    fn default() -> Self {
        Self::new()
    }
}
