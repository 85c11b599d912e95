//! Quorum and passage rules.
//!
//! Quorum: `(for + against + abstain) * 10000 >= total_supply * quorum_bps`.
//! Passage: quorum and `for > against`; abstentions count toward quorum only.

use crate::proposal::Proposal;

pub const BPS_DENOMINATOR: u32 = 10_000;

/// Evaluates quorum and passage against a total supply and quorum threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuorumEvaluator {
    pub quorum_bps: u32,
    pub total_supply: u128,
}

impl QuorumEvaluator {
    pub fn new(quorum_bps: u32, total_supply: u128) -> Self {
        Self {
            quorum_bps,
            total_supply,
        }
    }

    /// Whether participation reached quorum. Always false with zero supply.
    pub fn has_quorum(&self, proposal: &Proposal) -> bool {
        if self.total_supply == 0 {
            return false;
        }
        let participation = mul_wide(proposal.total_votes(), BPS_DENOMINATOR);
        let required = mul_wide(self.total_supply, self.quorum_bps);
        participation >= required
    }

    pub fn has_passed(&self, proposal: &Proposal) -> bool {
        self.has_quorum(proposal) && proposal.for_votes > proposal.against_votes
    }
}

/// Exact 256-bit product of `a * b` as `(high, low)`, compared lexicographically.
fn mul_wide(a: u128, b: u32) -> (u128, u128) {
    let b = b as u128;
    let lo = (a & u64::MAX as u128) * b;
    let hi = (a >> 64) * b;
    let (low, carry) = (hi << 64).overflowing_add(lo);
    let high = (hi >> 64) + carry as u128;
    (high, low)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::{ProposalDraft, ProposalType};
    use claw_types::{Address, Hash32, Timestamp};

    fn with_votes(for_votes: u128, against: u128, abstain: u128) -> Proposal {
        let mut p = Proposal::open(
            1,
            ProposalDraft {
                proposer: Address::repeat(1),
                proposal_type: ProposalType::ParameterChange,
                description_hash: Hash32::ZERO,
                target: Address::ZERO,
                call_data: Vec::new(),
            },
            0,
            Timestamp::new(1),
            10,
            10,
        );
        p.for_votes = for_votes;
        p.against_votes = against;
        p.abstain_votes = abstain;
        p
    }

    #[test]
    fn exact_quorum_boundary() {
        let q = QuorumEvaluator::new(400, 1_000_000);
        let p = with_votes(30_001, 9_999, 0);
        assert!(q.has_quorum(&p));
        assert!(q.has_passed(&p));

        let p = with_votes(30_000, 9_999, 0);
        assert!(!q.has_quorum(&p));
        assert!(!q.has_passed(&p));
    }

    #[test]
    fn zero_supply_never_has_quorum() {
        let q = QuorumEvaluator::new(0, 0);
        assert!(!q.has_quorum(&with_votes(1_000, 0, 0)));
    }

    #[test]
    fn abstain_counts_for_quorum_not_passage() {
        let q = QuorumEvaluator::new(1_000, 1_000);
        let p = with_votes(10, 10, 80);
        assert!(q.has_quorum(&p));
        assert!(!q.has_passed(&p), "tie between for and against fails");

        let p = with_votes(11, 10, 79);
        assert!(q.has_passed(&p));
    }

    #[test]
    fn zero_quorum_needs_only_majority() {
        let q = QuorumEvaluator::new(0, 1_000);
        assert!(q.has_quorum(&with_votes(0, 0, 0)));
        assert!(!q.has_passed(&with_votes(0, 0, 0)));
        assert!(q.has_passed(&with_votes(1, 0, 0)));
    }

    #[test]
    fn huge_values_compare_exactly() {
        let q = QuorumEvaluator::new(10_000, u128::MAX);
        assert!(!q.has_quorum(&with_votes(u128::MAX - 1, 0, 0)));
        assert!(q.has_quorum(&with_votes(u128::MAX, 0, 0)));
    }

    #[test]
    fn mul_wide_matches_small_products() {
        assert_eq!(mul_wide(12_345, 10_000), (0, 123_450_000));
        assert_eq!(mul_wide(u128::MAX, 2), (1, u128::MAX - 1));
    }
}
