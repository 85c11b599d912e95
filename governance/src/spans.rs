//! Span constructors for governance operations.
//!
//! Consistent span names and fields make it easy to correlate every log
//! line of one operation on one proposal.

use crate::proposal::ProposalId;
use tracing::{info_span, Span};

/// Span covering one operation on an existing proposal.
pub fn proposal_span(op: &'static str, id: ProposalId) -> Span {
    info_span!("governance", op, proposal = id)
}

/// Span covering proposal creation.
pub fn propose_span(proposer: &str) -> Span {
    info_span!("governance", op = "propose", proposer = %proposer)
}

/// Span covering an administrative settings change.
pub fn admin_span(setting: &'static str) -> Span {
    info_span!("governance_admin", setting)
}
