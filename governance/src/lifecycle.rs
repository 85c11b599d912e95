//! Lazy lifecycle advancement.
//!
//! Time-driven transitions (`Discussion → Voting`, `Voting → Passed/Rejected`,
//! `Timelocked → Expired`) are never scheduled. They are computed on demand by
//! [`project_status`], which both the read path (`get_status`) and every
//! mutating path use, so the two can never disagree.

use crate::proposal::{Proposal, ProposalStatus};
use crate::quorum::QuorumEvaluator;
use claw_types::Timestamp;

/// How long after `timelock_end_at` a queued proposal remains executable.
pub const EXECUTION_WINDOW_SECS: u64 = 14 * 24 * 3600;

/// Deadline after which a timelocked proposal expires.
pub fn execution_deadline(proposal: &Proposal) -> Timestamp {
    proposal.timelock_end_at.plus(EXECUTION_WINDOW_SECS)
}

/// The status `proposal` has at `now`, applying every due time-driven
/// transition. Pure: the proposal is not modified.
pub fn project_status(proposal: &Proposal, now: Timestamp, quorum: &QuorumEvaluator) -> ProposalStatus {
    let mut status = proposal.status;
    loop {
        let next = step(proposal, status, now, quorum);
        if next == status {
            return status;
        }
        status = next;
    }
}

fn step(
    proposal: &Proposal,
    status: ProposalStatus,
    now: Timestamp,
    quorum: &QuorumEvaluator,
) -> ProposalStatus {
    match status {
        ProposalStatus::Discussion if now >= proposal.discussion_end_at => ProposalStatus::Voting,
        ProposalStatus::Voting if now > proposal.voting_end_at => {
            if quorum.has_passed(proposal) {
                ProposalStatus::Passed
            } else {
                ProposalStatus::Rejected
            }
        }
        ProposalStatus::Timelocked if now > execution_deadline(proposal) => ProposalStatus::Expired,
        other => other,
    }
}
