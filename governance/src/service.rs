//! The governance service: the public surface composing power calculation,
//! proposal storage, the lazy lifecycle, quorum evaluation and the guardian
//! multisig.
//!
//! Every mutating call on an existing proposal runs as one critical section
//! on that proposal's record: it first applies any due time-driven
//! transition, then validates and applies the operation. A transition
//! applied this way is kept even when the operation itself then fails.

use crate::config::{GovernanceConfig, PowerMode, Settings};
use crate::emergency::{self, GuardianSet, EMERGENCY_THRESHOLD, GUARDIAN_COUNT};
use crate::error::{Expected, GovernanceError};
use crate::events::{EventBus, GovernanceEvent};
use crate::lifecycle::{self, EXECUTION_WINDOW_SECS};
use crate::params::{clamp_bps, saturating_secs, GovernableParam, GovernanceParams};
use crate::power::VotingPowerCalculator;
use crate::proposal::{
    Proposal, ProposalDraft, ProposalId, ProposalStatus, ProposalType, Receipt, Support,
};
use crate::quorum::QuorumEvaluator;
use crate::sources::{
    Clock, LockupSource, NeutralLockup, NeutralReputation, ParamRegistry, ProposalExecutor,
    ReputationSource, TokenLedger,
};
use crate::spans;
use crate::store::{ProposalRecord, ProposalStore};
use claw_types::{Address, Hash32, Timestamp};
use claw_utils::format_duration;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

/// External services the governance service reads from and acts through.
///
/// Clock, token and executor are mandatory. Without a param registry the
/// local settings apply unmodified; without reputation or lockup services
/// every account gets the neutral multipliers.
pub struct Collaborators {
    pub clock: Arc<dyn Clock>,
    pub token: Arc<dyn TokenLedger>,
    pub executor: Arc<dyn ProposalExecutor>,
    pub params: Option<Arc<dyn ParamRegistry>>,
    pub reputation: Arc<dyn ReputationSource>,
    pub lockup: Arc<dyn LockupSource>,
}

impl Collaborators {
    pub fn new(
        clock: Arc<dyn Clock>,
        token: Arc<dyn TokenLedger>,
        executor: Arc<dyn ProposalExecutor>,
    ) -> Self {
        Self {
            clock,
            token,
            executor,
            params: None,
            reputation: Arc::new(NeutralReputation),
            lockup: Arc::new(NeutralLockup),
        }
    }

    pub fn with_params(mut self, params: Arc<dyn ParamRegistry>) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_reputation(mut self, reputation: Arc<dyn ReputationSource>) -> Self {
        self.reputation = reputation;
        self
    }

    pub fn with_lockup(mut self, lockup: Arc<dyn LockupSource>) -> Self {
        self.lockup = lockup;
        self
    }
}

pub struct GovernanceService {
    chain_id: u64,
    instance: Address,
    settings: RwLock<Arc<Settings>>,
    store: ProposalStore,
    power: VotingPowerCalculator,
    clock: Arc<dyn Clock>,
    token: Arc<dyn TokenLedger>,
    executor: Arc<dyn ProposalExecutor>,
    params: Option<Arc<dyn ParamRegistry>>,
    events: EventBus,
}

impl GovernanceService {
    pub fn new(
        config: &GovernanceConfig,
        collaborators: Collaborators,
    ) -> Result<Self, GovernanceError> {
        let settings = config.validate()?;
        info!(
            chain_id = config.chain_id,
            instance = %config.instance_address,
            power_mode = ?settings.power_mode,
            paused = settings.paused,
            "governance service started"
        );
        Ok(Self {
            chain_id: config.chain_id,
            instance: config.instance_address,
            settings: RwLock::new(Arc::new(settings)),
            store: ProposalStore::new(),
            power: VotingPowerCalculator::new(collaborators.reputation, collaborators.lockup),
            clock: collaborators.clock,
            token: collaborators.token,
            executor: collaborators.executor,
            params: collaborators.params,
            events: EventBus::new(),
        })
    }

    // ── Proposal operations ─────────────────────────────────────────────

    /// Create a proposal in `Discussion`.
    ///
    /// The caller's voting power (from its live balance) must reach the
    /// effective proposal threshold.
    pub fn propose(
        &self,
        caller: Address,
        proposal_type: ProposalType,
        description_hash: Hash32,
        target: Address,
        call_data: Vec<u8>,
    ) -> Result<ProposalId, GovernanceError> {
        let _span = spans::propose_span(&caller.to_string()).entered();
        let settings = self.settings();
        self.ensure_active(&settings)?;
        if caller.is_zero() {
            return Err(GovernanceError::ZeroAddress("proposer"));
        }
        let params = self.effective_params(&settings);

        let balance = self.token.balance_of(&caller)?;
        let power = self.power.power_of(&caller, balance);
        if power < params.proposal_threshold {
            debug!(%caller, power, threshold = params.proposal_threshold, "proposal rejected");
            return Err(GovernanceError::InsufficientPower {
                have: power,
                need: params.proposal_threshold,
            });
        }

        let now = self.clock.now();
        let height = self.clock.height();
        let draft = ProposalDraft {
            proposer: caller,
            proposal_type,
            description_hash,
            target,
            call_data,
        };
        let id = self.store.create(|id| {
            Proposal::open(
                id,
                draft,
                height,
                now,
                params.discussion_period_secs,
                params.voting_period_secs,
            )
        });

        let record = self.store.snapshot(id)?;
        let proposal = &record.proposal;
        info!(
            id,
            %caller,
            ?proposal_type,
            power,
            voting_opens = %proposal.discussion_end_at,
            voting_closes = %proposal.voting_end_at,
            "proposal created"
        );
        self.events.emit(GovernanceEvent::ProposalCreated {
            id,
            proposer: caller,
            proposal_type,
            description_hash,
            target,
            discussion_end_at: proposal.discussion_end_at,
            voting_end_at: proposal.voting_end_at,
        });
        Ok(id)
    }

    /// Cast a ballot. `support` is 0 (against), 1 (for) or 2 (abstain).
    ///
    /// A vote after the window closes finalizes the proposal to `Passed` or
    /// `Rejected` and then fails with an invalid-state error.
    pub fn vote(
        &self,
        caller: Address,
        id: ProposalId,
        support: u8,
    ) -> Result<Receipt, GovernanceError> {
        let _span = spans::proposal_span("vote", id).entered();
        let settings = self.settings();
        self.ensure_active(&settings)?;
        let support = Support::try_from(support)?;
        if caller.is_zero() {
            return Err(GovernanceError::ZeroAddress("voter"));
        }
        let quorum = self.quorum(&self.effective_params(&settings))?;
        let now = self.clock.now();

        self.store
            .update(id, |record| {
                let status = self.advance(record, now, &quorum);
                if status != ProposalStatus::Voting {
                    return Err(GovernanceError::InvalidState {
                        id,
                        current: status,
                        expected: Expected::Status(ProposalStatus::Voting),
                    });
                }
                if record.has_voted(&caller) {
                    return Err(GovernanceError::AlreadyVoted { id, voter: caller });
                }

                let balance = match settings.power_mode {
                    PowerMode::Live => self.token.balance_of(&caller)?,
                    PowerMode::Snapshot => self.token.balance_of_at(
                        &caller,
                        record.proposal.snapshot_block.saturating_sub(1),
                    )?,
                };
                let weight = self.power.power_of(&caller, balance);
                if weight == 0 {
                    return Err(GovernanceError::InsufficientPower { have: 0, need: 1 });
                }

                let receipt = record.record_vote(caller, support, weight)?;
                info!(id, voter = %caller, ?support, weight, "vote cast");
                self.events.emit(GovernanceEvent::VoteCast {
                    id,
                    voter: caller,
                    support,
                    weight,
                });
                Ok(receipt)
            })
            .inspect_err(|e| debug!(id, voter = %caller, error = %e, "vote rejected"))
    }

    /// Queue a passed proposal behind the timelock. Returns the earliest
    /// execution time.
    pub fn queue(&self, id: ProposalId) -> Result<Timestamp, GovernanceError> {
        let _span = spans::proposal_span("queue", id).entered();
        let settings = self.settings();
        self.ensure_active(&settings)?;
        let params = self.effective_params(&settings);
        let quorum = self.quorum(&params)?;
        let now = self.clock.now();

        self.store
            .update(id, |record| {
                let status = self.advance(record, now, &quorum);
                if !record.proposal.proposal_type.is_executable() {
                    return Err(GovernanceError::SignalNotExecutable(id));
                }
                if status != ProposalStatus::Passed {
                    return Err(GovernanceError::InvalidState {
                        id,
                        current: status,
                        expected: Expected::Status(ProposalStatus::Passed),
                    });
                }

                let eta = now.plus(params.timelock_delay_secs);
                record.proposal.timelock_end_at = eta;
                self.transition(&mut record.proposal, ProposalStatus::Timelocked);
                info!(
                    id,
                    %eta,
                    delay = %format_duration(params.timelock_delay_secs),
                    "proposal queued"
                );
                self.events.emit(GovernanceEvent::ProposalQueued { id, eta });
                Ok(eta)
            })
            .inspect_err(|e| debug!(id, error = %e, "queue rejected"))
    }

    /// Execute a queued proposal once its timelock has elapsed.
    ///
    /// Past the execution window the proposal is marked `Expired` and the
    /// call fails. The status becomes `Executed` only if the target call
    /// succeeds; on failure the proposal stays `Timelocked`.
    pub fn execute(&self, id: ProposalId) -> Result<(), GovernanceError> {
        let _span = spans::proposal_span("execute", id).entered();
        let settings = self.settings();
        self.ensure_active(&settings)?;
        let quorum = self.quorum(&self.effective_params(&settings))?;
        let now = self.clock.now();

        self.store
            .update(id, |record| {
                match self.advance(record, now, &quorum) {
                    ProposalStatus::Timelocked => {}
                    ProposalStatus::Expired => {
                        return Err(GovernanceError::Expired {
                            id,
                            deadline: lifecycle::execution_deadline(&record.proposal),
                        });
                    }
                    current => {
                        return Err(GovernanceError::InvalidState {
                            id,
                            current,
                            expected: Expected::Status(ProposalStatus::Timelocked),
                        });
                    }
                }
                let eta = record.proposal.timelock_end_at;
                if now < eta {
                    return Err(GovernanceError::TimelockNotElapsed { id, eta, now });
                }

                self.call_target(&record.proposal)?;
                self.transition(&mut record.proposal, ProposalStatus::Executed);
                info!(id, "proposal executed");
                self.events.emit(GovernanceEvent::ProposalExecuted { id });
                Ok(())
            })
            .inspect_err(|e| debug!(id, error = %e, "execute rejected"))
    }

    /// Cancel a non-terminal proposal. Allowed for its proposer and for
    /// registered cancellers.
    pub fn cancel(&self, caller: Address, id: ProposalId) -> Result<(), GovernanceError> {
        let _span = spans::proposal_span("cancel", id).entered();
        let settings = self.settings();
        self.ensure_active(&settings)?;
        let quorum = self.quorum(&self.effective_params(&settings))?;
        let now = self.clock.now();

        self.store
            .update(id, |record| {
                let status = self.advance(record, now, &quorum);
                if status.is_terminal() {
                    return Err(GovernanceError::InvalidState {
                        id,
                        current: status,
                        expected: Expected::NonTerminal,
                    });
                }
                if caller != record.proposal.proposer && !settings.cancellers.contains(&caller) {
                    return Err(GovernanceError::NotCanceller { id, caller });
                }

                self.transition(&mut record.proposal, ProposalStatus::Cancelled);
                info!(id, by = %caller, "proposal cancelled");
                self.events
                    .emit(GovernanceEvent::ProposalCancelled { id, by: caller });
                Ok(())
            })
            .inspect_err(|e| debug!(id, %caller, error = %e, "cancel rejected"))
    }

    /// Execute a non-terminal proposal immediately on the authority of five
    /// guardians, bypassing discussion, voting and the timelock.
    ///
    /// `signatures[i]` is the 65-byte recoverable signature of `signers[i]`
    /// over [`GovernanceService::emergency_digest`] for `id`.
    pub fn emergency_execute(
        &self,
        id: ProposalId,
        signers: &[Address],
        signatures: &[Vec<u8>],
    ) -> Result<(), GovernanceError> {
        let _span = spans::proposal_span("emergency_execute", id).entered();
        let settings = self.settings();
        self.ensure_active(&settings)?;
        let quorum = self.quorum(&self.effective_params(&settings))?;
        let digest = self.emergency_digest(id);
        let now = self.clock.now();

        self.store
            .update(id, |record| {
                let status = self.advance(record, now, &quorum);
                if status.is_terminal() {
                    return Err(GovernanceError::InvalidState {
                        id,
                        current: status,
                        expected: Expected::NonTerminal,
                    });
                }
                let approvers =
                    emergency::verify_authorization(&settings.guardians, &digest, signers, signatures)?;

                self.call_target(&record.proposal)?;
                self.transition(&mut record.proposal, ProposalStatus::Executed);
                info!(id, from = %status, guardians = approvers.len(), "emergency execution");
                self.events.emit(GovernanceEvent::EmergencyExecuted {
                    id,
                    guardians: approvers,
                });
                Ok(())
            })
            .inspect_err(|e| debug!(id, error = %e, "emergency execution rejected"))
    }

    // ── Administration ──────────────────────────────────────────────────

    pub fn set_discussion_period(&self, caller: Address, secs: u64) -> Result<(), GovernanceError> {
        self.update_settings(caller, "discussion_period", |s| {
            s.discussion_period_secs = secs;
            Ok(())
        })
    }

    pub fn set_voting_period(&self, caller: Address, secs: u64) -> Result<(), GovernanceError> {
        self.update_settings(caller, "voting_period", |s| {
            s.voting_period_secs = secs;
            Ok(())
        })
    }

    pub fn set_timelock_delay(&self, caller: Address, secs: u64) -> Result<(), GovernanceError> {
        self.update_settings(caller, "timelock_delay", |s| {
            s.timelock_delay_secs = secs;
            Ok(())
        })
    }

    pub fn set_proposal_threshold(
        &self,
        caller: Address,
        threshold: u128,
    ) -> Result<(), GovernanceError> {
        self.update_settings(caller, "proposal_threshold", |s| {
            s.proposal_threshold = threshold;
            Ok(())
        })
    }

    pub fn set_quorum_bps(&self, caller: Address, quorum_bps: u32) -> Result<(), GovernanceError> {
        self.update_settings(caller, "quorum_bps", |s| {
            s.quorum_bps = quorum_bps;
            Ok(())
        })
    }

    pub fn set_power_mode(&self, caller: Address, mode: PowerMode) -> Result<(), GovernanceError> {
        self.update_settings(caller, "power_mode", |s| {
            s.power_mode = mode;
            Ok(())
        })
    }

    /// Replace the whole guardian set.
    pub fn set_guardians(
        &self,
        caller: Address,
        guardians: &[Address],
    ) -> Result<(), GovernanceError> {
        self.update_settings(caller, "guardians", |s| {
            s.guardians = GuardianSet::new(guardians)?;
            Ok(())
        })?;
        self.events.emit(GovernanceEvent::GuardiansUpdated {
            guardians: guardians.to_vec(),
        });
        Ok(())
    }

    /// Grant (`enabled`) or revoke the canceller role.
    pub fn set_canceller(
        &self,
        caller: Address,
        account: Address,
        enabled: bool,
    ) -> Result<(), GovernanceError> {
        if account.is_zero() {
            return Err(GovernanceError::ZeroAddress("canceller"));
        }
        self.update_settings(caller, "cancellers", |s| {
            if enabled {
                s.cancellers.insert(account);
            } else {
                s.cancellers.remove(&account);
            }
            Ok(())
        })
    }

    /// Hand the administrative role to `new_admin`.
    pub fn set_admin(&self, caller: Address, new_admin: Address) -> Result<(), GovernanceError> {
        if new_admin.is_zero() {
            return Err(GovernanceError::ZeroAddress("admin"));
        }
        self.update_settings(caller, "admin", |s| {
            s.admin = new_admin;
            Ok(())
        })
    }

    /// Block (or unblock) every mutating proposal operation.
    pub fn set_paused(&self, caller: Address, paused: bool) -> Result<(), GovernanceError> {
        self.update_settings(caller, "paused", |s| {
            s.paused = paused;
            Ok(())
        })?;
        self.events.emit(GovernanceEvent::PausedChanged { paused });
        Ok(())
    }

    // ── Reads ───────────────────────────────────────────────────────────

    /// The stored proposal. Its `status` is the last persisted one; use
    /// [`GovernanceService::get_status`] for the status at the current time.
    pub fn get_proposal(&self, id: ProposalId) -> Result<Proposal, GovernanceError> {
        Ok(self.store.snapshot(id)?.proposal)
    }

    pub fn get_receipt(&self, id: ProposalId, voter: &Address) -> Result<Receipt, GovernanceError> {
        Ok(self.store.snapshot(id)?.receipt(voter))
    }

    /// The status proposal `id` has now, with every due transition applied
    /// to a copy. Storage is not modified.
    pub fn get_status(&self, id: ProposalId) -> Result<ProposalStatus, GovernanceError> {
        let record = self.store.snapshot(id)?;
        let quorum = self.current_quorum()?;
        Ok(lifecycle::project_status(
            &record.proposal,
            self.clock.now(),
            &quorum,
        ))
    }

    /// Voting power `account` would vote with right now, from its live balance.
    pub fn get_voting_power(&self, account: &Address) -> Result<u128, GovernanceError> {
        let balance = self.token.balance_of(account)?;
        Ok(self.power.power_of(account, balance))
    }

    pub fn has_quorum(&self, id: ProposalId) -> Result<bool, GovernanceError> {
        let record = self.store.snapshot(id)?;
        Ok(self.current_quorum()?.has_quorum(&record.proposal))
    }

    pub fn has_passed(&self, id: ProposalId) -> Result<bool, GovernanceError> {
        let record = self.store.snapshot(id)?;
        Ok(self.current_quorum()?.has_passed(&record.proposal))
    }

    /// Every proposal in id order, each carrying its projected status,
    /// optionally filtered to one status.
    pub fn list_proposals(
        &self,
        status: Option<ProposalStatus>,
    ) -> Result<Vec<Proposal>, GovernanceError> {
        let quorum = self.current_quorum()?;
        let now = self.clock.now();
        let mut proposals = Vec::new();
        for id in self.store.ids() {
            let mut proposal = self.store.snapshot(id)?.proposal;
            proposal.status = lifecycle::project_status(&proposal, now, &quorum);
            if status.map_or(true, |s| s == proposal.status) {
                proposals.push(proposal);
            }
        }
        Ok(proposals)
    }

    /// Every ballot on proposal `id`, in casting order.
    pub fn get_votes(&self, id: ProposalId) -> Result<Vec<(Address, Receipt)>, GovernanceError> {
        Ok(self.store.snapshot(id)?.ballots())
    }

    /// Proposals currently waiting in the timelock, with their earliest
    /// execution time.
    pub fn list_timelocked(&self) -> Result<Vec<(ProposalId, Timestamp)>, GovernanceError> {
        Ok(self
            .list_proposals(Some(ProposalStatus::Timelocked))?
            .into_iter()
            .map(|p| (p.id, p.timelock_end_at))
            .collect())
    }

    /// Effective parameters after registry overrides.
    pub fn get_params(&self) -> GovernanceParams {
        self.effective_params(&self.settings())
    }

    pub fn proposal_count(&self) -> usize {
        self.store.len()
    }

    pub fn guardians(&self) -> Vec<Address> {
        self.settings().guardians.members().to_vec()
    }

    pub fn is_guardian(&self, account: &Address) -> bool {
        self.settings().guardians.contains(account)
    }

    pub fn is_canceller(&self, account: &Address) -> bool {
        self.settings().cancellers.contains(account)
    }

    pub fn admin(&self) -> Address {
        self.settings().admin
    }

    /// The digest guardians sign to authorize emergency execution of `id`
    /// on this instance.
    pub fn emergency_digest(&self, id: ProposalId) -> Hash32 {
        emergency::emergency_digest(self.chain_id, &self.instance, id)
    }

    // ── Events ──────────────────────────────────────────────────────────

    /// Register a listener called synchronously for every event.
    pub fn subscribe(&self, listener: Box<dyn Fn(&GovernanceEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    /// Drain the events emitted so far.
    pub fn take_events(&self) -> Vec<GovernanceEvent> {
        self.events.take()
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn settings(&self) -> Arc<Settings> {
        Arc::clone(&self.settings.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn ensure_active(&self, settings: &Settings) -> Result<(), GovernanceError> {
        if settings.paused {
            debug!("operation rejected while paused");
            return Err(GovernanceError::Paused);
        }
        Ok(())
    }

    /// Apply an admin change to a copy of the settings and swap it in.
    fn update_settings(
        &self,
        caller: Address,
        setting: &'static str,
        change: impl FnOnce(&mut Settings) -> Result<(), GovernanceError>,
    ) -> Result<(), GovernanceError> {
        let _span = spans::admin_span(setting).entered();
        let mut guard = self.settings.write().unwrap_or_else(PoisonError::into_inner);
        if caller != guard.admin {
            debug!(%caller, "admin update rejected");
            return Err(GovernanceError::NotAdmin(caller));
        }
        let mut next = Settings::clone(&guard);
        change(&mut next)?;
        next.check()?;
        *guard = Arc::new(next);
        drop(guard);

        info!(setting, by = %caller, "governance setting updated");
        self.events.emit(GovernanceEvent::SettingsUpdated { setting });
        Ok(())
    }

    fn registry_value(&self, param: GovernableParam, local: u128) -> u128 {
        match &self.params {
            Some(registry) => registry.get_param_with_default(param.name(), local),
            None => local,
        }
    }

    fn effective_params(&self, settings: &Settings) -> GovernanceParams {
        GovernanceParams {
            proposal_threshold: self
                .registry_value(GovernableParam::ProposalThreshold, settings.proposal_threshold),
            discussion_period_secs: saturating_secs(self.registry_value(
                GovernableParam::DiscussionPeriod,
                settings.discussion_period_secs.into(),
            )),
            voting_period_secs: saturating_secs(self.registry_value(
                GovernableParam::VotingPeriod,
                settings.voting_period_secs.into(),
            )),
            timelock_delay_secs: saturating_secs(self.registry_value(
                GovernableParam::TimelockDelay,
                settings.timelock_delay_secs.into(),
            )),
            quorum_bps: clamp_bps(
                self.registry_value(GovernableParam::QuorumBps, settings.quorum_bps.into()),
            ),
            execution_window_secs: EXECUTION_WINDOW_SECS,
            emergency_threshold: EMERGENCY_THRESHOLD,
            guardian_count: GUARDIAN_COUNT,
            power_mode: settings.power_mode,
            paused: settings.paused,
        }
    }

    fn quorum(&self, params: &GovernanceParams) -> Result<QuorumEvaluator, GovernanceError> {
        Ok(QuorumEvaluator::new(
            params.quorum_bps,
            self.token.total_supply()?,
        ))
    }

    fn current_quorum(&self) -> Result<QuorumEvaluator, GovernanceError> {
        self.quorum(&self.get_params())
    }

    /// Persist every due time-driven transition and return the new status.
    fn advance(
        &self,
        record: &mut ProposalRecord,
        now: Timestamp,
        quorum: &QuorumEvaluator,
    ) -> ProposalStatus {
        let status = lifecycle::project_status(&record.proposal, now, quorum);
        if status != record.proposal.status {
            self.transition(&mut record.proposal, status);
        }
        status
    }

    fn transition(&self, proposal: &mut Proposal, to: ProposalStatus) {
        let from = proposal.status;
        proposal.status = to;
        info!(id = proposal.id, %from, %to, "proposal status changed");
        self.events.emit(GovernanceEvent::StatusChanged {
            id: proposal.id,
            from,
            to,
        });
    }

    /// Invoke the proposal's target. A zero target is a no-op.
    fn call_target(&self, proposal: &Proposal) -> Result<(), GovernanceError> {
        if proposal.target.is_zero() {
            return Ok(());
        }
        self.executor
            .execute(&proposal.target, &proposal.call_data)
            .map_err(|e| GovernanceError::ExecutionFailed {
                id: proposal.id,
                reason: e.to_string(),
            })
    }
}
