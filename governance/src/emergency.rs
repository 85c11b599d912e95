//! Guardian multisig override.
//!
//! Five of the nine registered guardians can execute any non-terminal
//! proposal immediately, bypassing discussion, voting and the timelock.
//! Guardians sign a digest bound to the chain, the governance instance and
//! the proposal id, wrapped in the signed-message envelope, so a signature
//! cannot be replayed on another chain, deployment or proposal.

use crate::error::GovernanceError;
use crate::proposal::ProposalId;
use claw_crypto::{blake2b_256_multi, recover_signer, RecoverableSignature};
use claw_types::{Address, Hash32};
use serde::Serialize;
use std::collections::HashSet;

pub const GUARDIAN_COUNT: usize = 9;
pub const EMERGENCY_THRESHOLD: usize = 5;

/// Domain tag mixed into every emergency digest.
pub const EMERGENCY_DOMAIN_TAG: &[u8] = b"claw-governance/emergency-execute/v1";

/// Exactly nine distinct, non-zero guardian addresses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GuardianSet([Address; GUARDIAN_COUNT]);

impl GuardianSet {
    pub fn new(members: &[Address]) -> Result<Self, GovernanceError> {
        let arr: [Address; GUARDIAN_COUNT] =
            members
                .try_into()
                .map_err(|_| GovernanceError::GuardianCount {
                    expected: GUARDIAN_COUNT,
                    got: members.len(),
                })?;
        let mut seen = HashSet::with_capacity(GUARDIAN_COUNT);
        for member in &arr {
            if member.is_zero() {
                return Err(GovernanceError::ZeroAddress("guardian"));
            }
            if !seen.insert(*member) {
                return Err(GovernanceError::DuplicateGuardian(*member));
            }
        }
        Ok(Self(arr))
    }

    pub fn contains(&self, account: &Address) -> bool {
        self.0.contains(account)
    }

    pub fn members(&self) -> &[Address] {
        &self.0
    }
}

/// The digest guardians sign to authorize emergency execution of `id`.
pub fn emergency_digest(chain_id: u64, instance: &Address, id: ProposalId) -> Hash32 {
    Hash32::new(blake2b_256_multi(&[
        EMERGENCY_DOMAIN_TAG,
        &chain_id.to_be_bytes(),
        instance.as_bytes(),
        &id.to_be_bytes(),
    ]))
}

/// Verify a k-of-n guardian authorization over `digest`.
///
/// Signatures are checked in order until [`EMERGENCY_THRESHOLD`] valid ones
/// are found. Every checked signature must be well formed, recover to the
/// claimed signer, belong to a registered guardian and not repeat an earlier
/// signer; any violation fails the whole authorization. Returns the
/// approving guardians.
pub fn verify_authorization(
    guardians: &GuardianSet,
    digest: &Hash32,
    signers: &[Address],
    signatures: &[Vec<u8>],
) -> Result<Vec<Address>, GovernanceError> {
    if signers.len() != signatures.len() {
        return Err(GovernanceError::LengthMismatch {
            signers: signers.len(),
            signatures: signatures.len(),
        });
    }
    if signers.len() < EMERGENCY_THRESHOLD {
        return Err(GovernanceError::InsufficientSignatures {
            have: signers.len(),
            need: EMERGENCY_THRESHOLD,
        });
    }

    let mut approved = Vec::with_capacity(EMERGENCY_THRESHOLD);
    for (index, (claimed, raw)) in signers.iter().zip(signatures).enumerate() {
        let signature = RecoverableSignature::from_slice(raw)
            .map_err(|source| GovernanceError::InvalidSignature { index, source })?;
        let recovered = recover_signer(digest, &signature)
            .map_err(|source| GovernanceError::InvalidSignature { index, source })?;
        if recovered != *claimed {
            return Err(GovernanceError::SignerMismatch {
                index,
                claimed: *claimed,
                recovered,
            });
        }
        if !guardians.contains(&recovered) {
            return Err(GovernanceError::NotGuardian(recovered));
        }
        if approved.contains(&recovered) {
            return Err(GovernanceError::DuplicateSigner(recovered));
        }
        approved.push(recovered);
        if approved.len() == EMERGENCY_THRESHOLD {
            return Ok(approved);
        }
    }

    Err(GovernanceError::InsufficientSignatures {
        have: approved.len(),
        need: EMERGENCY_THRESHOLD,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use claw_crypto::{keypair_from_seed, sign_digest, CryptoError, Keypair};

    fn keys(n: u8) -> Vec<Keypair> {
        (1..=n).map(|i| keypair_from_seed(&[i; 32]).unwrap()).collect()
    }

    fn guardian_set(keys: &[Keypair]) -> GuardianSet {
        let addrs: Vec<_> = keys.iter().take(GUARDIAN_COUNT).map(|k| k.address()).collect();
        GuardianSet::new(&addrs).unwrap()
    }

    fn sign_all(keys: &[&Keypair], digest: &Hash32) -> (Vec<Address>, Vec<Vec<u8>>) {
        keys.iter()
            .map(|k| (k.address(), sign_digest(digest, k).unwrap().as_bytes().to_vec()))
            .unzip()
    }

    #[test]
    fn guardian_set_invariants() {
        let good: Vec<_> = (1..=9).map(Address::repeat).collect();
        assert!(GuardianSet::new(&good).is_ok());

        assert!(matches!(
            GuardianSet::new(&good[..8]),
            Err(GovernanceError::GuardianCount { got: 8, .. })
        ));

        let mut dup = good.clone();
        dup[8] = dup[0];
        assert!(matches!(
            GuardianSet::new(&dup),
            Err(GovernanceError::DuplicateGuardian(_))
        ));

        let mut zero = good;
        zero[4] = Address::ZERO;
        assert!(matches!(
            GuardianSet::new(&zero),
            Err(GovernanceError::ZeroAddress("guardian"))
        ));
    }

    #[test]
    fn digest_is_domain_separated() {
        let inst = Address::repeat(0xAA);
        let base = emergency_digest(1, &inst, 7);
        assert_ne!(base, emergency_digest(2, &inst, 7));
        assert_ne!(base, emergency_digest(1, &Address::repeat(0xAB), 7));
        assert_ne!(base, emergency_digest(1, &inst, 8));
        assert_eq!(base, emergency_digest(1, &inst, 7));
    }

    #[test]
    fn five_of_nine_authorizes() {
        let k = keys(9);
        let set = guardian_set(&k);
        let digest = emergency_digest(1, &Address::repeat(0xAA), 7);
        let chosen: Vec<&Keypair> = k.iter().skip(2).take(5).collect();
        let (signers, sigs) = sign_all(&chosen, &digest);
        let approved = verify_authorization(&set, &digest, &signers, &sigs).unwrap();
        assert_eq!(approved, signers);
    }

    #[test]
    fn four_signatures_are_not_enough() {
        let k = keys(9);
        let set = guardian_set(&k);
        let digest = emergency_digest(1, &Address::repeat(0xAA), 7);
        let chosen: Vec<&Keypair> = k.iter().take(4).collect();
        let (signers, sigs) = sign_all(&chosen, &digest);
        assert!(matches!(
            verify_authorization(&set, &digest, &signers, &sigs),
            Err(GovernanceError::InsufficientSignatures { have: 4, need: 5 })
        ));
    }

    #[test]
    fn duplicate_signer_fails_everything() {
        let k = keys(9);
        let set = guardian_set(&k);
        let digest = emergency_digest(1, &Address::repeat(0xAA), 7);
        let chosen: Vec<&Keypair> = vec![&k[0], &k[1], &k[2], &k[3], &k[0], &k[5]];
        let (signers, sigs) = sign_all(&chosen, &digest);
        assert!(matches!(
            verify_authorization(&set, &digest, &signers, &sigs),
            Err(GovernanceError::DuplicateSigner(a)) if a == k[0].address()
        ));
    }

    #[test]
    fn non_guardian_fails() {
        let k = keys(10);
        let set = guardian_set(&k);
        let digest = emergency_digest(1, &Address::repeat(0xAA), 7);
        let chosen: Vec<&Keypair> = vec![&k[9], &k[0], &k[1], &k[2], &k[3]];
        let (signers, sigs) = sign_all(&chosen, &digest);
        assert!(matches!(
            verify_authorization(&set, &digest, &signers, &sigs),
            Err(GovernanceError::NotGuardian(a)) if a == k[9].address()
        ));
    }

    #[test]
    fn signature_for_other_proposal_is_a_mismatch() {
        let k = keys(9);
        let set = guardian_set(&k);
        let digest = emergency_digest(1, &Address::repeat(0xAA), 7);
        let other = emergency_digest(1, &Address::repeat(0xAA), 8);
        let chosen: Vec<&Keypair> = k.iter().take(5).collect();
        let (signers, mut sigs) = sign_all(&chosen, &digest);
        sigs[3] = sign_digest(&other, &k[3]).unwrap().as_bytes().to_vec();
        match verify_authorization(&set, &digest, &signers, &sigs) {
            Err(GovernanceError::SignerMismatch { index: 3, .. })
            | Err(GovernanceError::InvalidSignature { index: 3, .. }) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn malformed_and_mismatched_inputs() {
        let k = keys(9);
        let set = guardian_set(&k);
        let digest = emergency_digest(1, &Address::repeat(0xAA), 7);
        let chosen: Vec<&Keypair> = k.iter().take(5).collect();
        let (signers, mut sigs) = sign_all(&chosen, &digest);

        assert!(matches!(
            verify_authorization(&set, &digest, &signers[..4], &sigs),
            Err(GovernanceError::LengthMismatch { signers: 4, signatures: 5 })
        ));

        sigs[1].truncate(64);
        assert!(matches!(
            verify_authorization(&set, &digest, &signers, &sigs),
            Err(GovernanceError::InvalidSignature {
                index: 1,
                source: CryptoError::MalformedSignature(64)
            })
        ));
    }

    #[test]
    fn stops_after_threshold() {
        let k = keys(9);
        let set = guardian_set(&k);
        let digest = emergency_digest(1, &Address::repeat(0xAA), 7);
        let chosen: Vec<&Keypair> = k.iter().take(5).collect();
        let (mut signers, mut sigs) = sign_all(&chosen, &digest);
        // a sixth, garbage entry is never inspected
        signers.push(Address::repeat(0xEE));
        sigs.push(vec![0u8; 3]);
        assert_eq!(verify_authorization(&set, &digest, &signers, &sigs).unwrap().len(), 5);
    }
}
