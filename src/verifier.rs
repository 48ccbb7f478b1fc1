//! ZK Verifier (C5): the staged, short-circuiting pipeline that turns a wire
//! proof into a trust decision.
//!
//! Stage order mirrors the source crate's `api::verify::verify`: structural
//! checks first (cheap, no cryptography), then temporal and trust checks
//! (cheap, no cryptography), and only last the Groth16 pairing check (the
//! expensive step). A proof that fails an early stage never reaches the
//! pairing check, and the caller only ever learns the normative error kind
//! for whichever stage rejected it — never which stage, beyond that kind.

use ark_bn254::{Bn254, Fr};
use ark_groth16::Groth16;
use ark_snark::SNARK;
use chrono::{DateTime, Utc};
use tracing::{debug, info_span, instrument};
use uuid::Uuid;

use crate::artifacts::CircuitManager;
use crate::error::{CredentialError, Result};
use crate::proof::Proof;
use crate::registry::TrustedRootRegistry;

/// Outcome of a verification attempt. `valid` is the caller-facing verdict;
/// `errors` carries the machine-readable kind(s) that caused rejection (at
/// most one in this pipeline's short-circuiting design, but a `Vec` matches
/// the wire shape's allowance for more than one and avoids a breaking change
/// if a future stage needs to report jointly).
#[derive(Debug, Clone)]
pub struct VerificationOutcome {
    pub valid: bool,
    pub verified_at: DateTime<Utc>,
    pub credential_set_id: Option<Uuid>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl VerificationOutcome {
    fn reject(kind: &str, credential_set_id: Option<Uuid>) -> Self {
        Self {
            valid: false,
            verified_at: Utc::now(),
            credential_set_id,
            errors: vec![kind.to_string()],
            warnings: Vec::new(),
        }
    }

    fn accept(credential_set_id: Uuid) -> Self {
        Self {
            valid: true,
            verified_at: Utc::now(),
            credential_set_id: Some(credential_set_id),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Runs the membership-proof verification pipeline against a
/// [`TrustedRootRegistry`] and the proving circuit's verifying key, held by
/// a [`CircuitManager`].
pub struct Verifier<'a> {
    registry: &'a TrustedRootRegistry,
    circuit: &'a CircuitManager,
}

impl<'a> Verifier<'a> {
    pub fn new(registry: &'a TrustedRootRegistry, circuit: &'a CircuitManager) -> Self {
        Self { registry, circuit }
    }

    /// Runs every stage in order, stopping at the first failure.
    ///
    /// 1. Structural pre-check (required fields present, shapes correct,
    ///    `timestamp` not in the future, `expiresAt >= timestamp`).
    /// 2. Temporal check (`expiresAt > now`).
    /// 3. Trust check (registry lookup for `(credentialSetId, merkleRoot)`).
    /// 4. Cryptographic check (Groth16 verify against the loaded key).
    #[instrument(skip(self, proof))]
    pub fn verify(&self, proof: &Proof) -> Result<VerificationOutcome> {
        let _span = info_span!("verify_proof", proof_id = %proof.metadata.proof_id).entered();

        if let Err(e) = self.structural_check(proof) {
            debug!(stage = "structural", error = %e, "proof rejected");
            return Ok(VerificationOutcome::reject(e.kind(), None));
        }

        let set_id = proof.metadata.credential_set_id;

        let now = Utc::now();
        if proof.is_expired(now) {
            debug!(stage = "temporal", "proof rejected: expired");
            return Ok(VerificationOutcome::reject(
                CredentialError::ProofExpired.kind(),
                Some(set_id),
            ));
        }

        if !self
            .registry
            .is_trusted(set_id, &proof.metadata.merkle_root)?
        {
            debug!(stage = "trust", "proof rejected: untrusted root");
            return Ok(VerificationOutcome::reject(
                CredentialError::UntrustedRoot.kind(),
                Some(set_id),
            ));
        }

        match self.cryptographic_check(proof) {
            Ok(true) => Ok(VerificationOutcome::accept(set_id)),
            Ok(false) => {
                debug!(stage = "cryptographic", "proof rejected: groth16 verify returned false");
                Ok(VerificationOutcome::reject(
                    CredentialError::ProofVerificationFailed.kind(),
                    Some(set_id),
                ))
            }
            Err(e) => {
                debug!(stage = "cryptographic", error = %e, "proof rejected: verification error");
                Ok(VerificationOutcome::reject(e.kind(), Some(set_id)))
            }
        }
    }

    fn structural_check(&self, proof: &Proof) -> Result<()> {
        proof.validate()?;
        let now = Utc::now();
        if proof.metadata.timestamp > now {
            return Err(CredentialError::InvalidProofStructure {
                reason: "metadata.timestamp is in the future".to_string(),
            });
        }
        // Equal is allowed (a zero-hour TTL issues a proof that is already
        // due to expire, not a structurally malformed one); only a window
        // that ends before it opens is rejected here.
        if proof.metadata.expires_at < proof.metadata.timestamp {
            return Err(CredentialError::InvalidProofStructure {
                reason: "metadata.expiresAt must not be before metadata.timestamp".to_string(),
            });
        }
        Ok(())
    }

    fn cryptographic_check(&self, proof: &Proof) -> Result<bool> {
        let pvk = self.circuit.prepared_verifying_key()?;
        let groth16_proof = proof.groth16.to_arkworks()?;
        let root: Fr = proof.root_signal()?;

        Groth16::<Bn254>::verify_with_processed_vk(&pvk, &[root], &groth16_proof).map_err(|e| {
            CredentialError::ValidationError {
                reason: format!("groth16 verification machinery error: {e}"),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::MembershipCircuit;
    use crate::config::CircuitConfig;
    use crate::credential_set::{CredentialSetManager, CredentialSetType};
    use crate::proof::{Groth16ProofJson, ProofMetadata};
    use crate::prover::Prover;
    use ark_groth16::Groth16 as G16;
    use ark_serialize::CanonicalSerialize;
    use ark_std::rand::{rngs::StdRng, SeedableRng};

    fn setup() -> (CredentialSetManager, TrustedRootRegistry, CircuitManager, Uuid, String) {
        let sets = CredentialSetManager::new();
        let set = sets
            .create(
                "universities",
                None,
                CredentialSetType::AllowList,
                vec!["MIT".into(), "Stanford".into(), "Harvard".into(), "Berkeley".into()],
            )
            .unwrap();

        let circuit = CircuitManager::new("membership");
        let empty = MembershipCircuit::new_empty();
        let mut rng = StdRng::seed_from_u64(17);
        let (pk, vk) = G16::<Bn254>::circuit_specific_setup(empty, &mut rng).unwrap();

        let tmp = std::env::temp_dir().join(format!(
            "credential-membership-test-verifier-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&tmp).unwrap();
        let config = CircuitConfig::new("membership", tmp.to_str().unwrap());
        let mut pk_bytes = Vec::new();
        pk.serialize_compressed(&mut pk_bytes).unwrap();
        std::fs::write(config.proving_key_path(), pk_bytes).unwrap();
        let vk_json = crate::artifacts::VerifyingKeyJson::from_arkworks(&vk);
        std::fs::write(config.verifying_key_path(), serde_json::to_vec(&vk_json).unwrap()).unwrap();
        circuit.load(&config).unwrap();
        std::fs::remove_dir_all(&tmp).ok();

        let registry = TrustedRootRegistry::new();
        let root = set.root.clone();
        (sets, registry, circuit, set.id, root)
    }

    #[test]
    fn accepts_a_trusted_fresh_sound_proof() {
        let (sets, registry, circuit, set_id, root) = setup();
        registry.trust(set_id, root, None).unwrap();

        let prover = Prover::new(&sets, &circuit);
        let mut rng = StdRng::seed_from_u64(3);
        let proof = prover.generate(set_id, "Harvard", &mut rng).unwrap();

        let verifier = Verifier::new(&registry, &circuit);
        let outcome = verifier.verify(&proof).unwrap();
        assert!(outcome.valid);
        assert_eq!(outcome.credential_set_id, Some(set_id));
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn rejects_untrusted_root() {
        let (sets, registry, circuit, set_id, _root) = setup();
        // deliberately never trust the set's real root

        let prover = Prover::new(&sets, &circuit);
        let mut rng = StdRng::seed_from_u64(3);
        let proof = prover.generate(set_id, "Harvard", &mut rng).unwrap();

        let verifier = Verifier::new(&registry, &circuit);
        let outcome = verifier.verify(&proof).unwrap();
        assert!(!outcome.valid);
        assert_eq!(outcome.errors, vec!["UNTRUSTED_ROOT"]);
    }

    #[test]
    fn rejects_tampered_root_even_if_a_different_root_is_trusted() {
        let (sets, registry, circuit, set_id, root) = setup();
        registry.trust(set_id, root, None).unwrap();

        let prover = Prover::new(&sets, &circuit);
        let mut rng = StdRng::seed_from_u64(3);
        let mut proof = prover.generate(set_id, "Harvard", &mut rng).unwrap();
        proof.metadata.merkle_root = "0".repeat(64);

        let verifier = Verifier::new(&registry, &circuit);
        let outcome = verifier.verify(&proof).unwrap();
        assert!(!outcome.valid);
        assert_eq!(outcome.errors, vec!["UNTRUSTED_ROOT"]);
    }

    #[test]
    fn rejects_expired_proof() {
        let (sets, registry, circuit, set_id, root) = setup();
        registry.trust(set_id, root, None).unwrap();

        let prover = Prover::new(&sets, &circuit);
        let mut rng = StdRng::seed_from_u64(3);
        let mut proof = prover.generate(set_id, "Harvard", &mut rng).unwrap();
        proof.metadata.timestamp = proof.metadata.timestamp - chrono::Duration::hours(2);
        proof.metadata.expires_at = proof.metadata.timestamp + chrono::Duration::seconds(1);

        let verifier = Verifier::new(&registry, &circuit);
        let outcome = verifier.verify(&proof).unwrap();
        assert!(!outcome.valid);
        assert_eq!(outcome.errors, vec!["PROOF_EXPIRED"]);
    }

    #[test]
    fn cross_set_substitution_is_rejected() {
        let (sets, registry, circuit, set_id, root) = setup();
        registry.trust(set_id, root, None).unwrap();
        let other_set = sets
            .create("companies", None, CredentialSetType::AllowList, vec!["Acme".into()])
            .unwrap();

        let prover = Prover::new(&sets, &circuit);
        let mut rng = StdRng::seed_from_u64(3);
        let mut proof = prover.generate(set_id, "Harvard", &mut rng).unwrap();
        proof.metadata.credential_set_id = other_set.id;

        let verifier = Verifier::new(&registry, &circuit);
        let outcome = verifier.verify(&proof).unwrap();
        assert!(!outcome.valid);
        assert_eq!(outcome.errors, vec!["UNTRUSTED_ROOT"]);
    }

    #[test]
    fn malformed_structure_is_rejected_before_any_crypto_runs() {
        let (_sets, registry, circuit, _set_id, _root) = setup();
        let proof = crate::proof::Proof {
            groth16: Groth16ProofJson {
                protocol: "groth16".into(),
                curve: "bn128".into(),
                a: ["1".into(), "2".into(), "1".into()],
                b: [["1".into(), "2".into()], ["3".into(), "4".into()], ["1".into(), "0".into()]],
                c: ["5".into(), "6".into(), "1".into()],
            },
            public_signals: vec!["1".into(), "2".into()], // two signals: malformed
            metadata: ProofMetadata {
                proof_id: Uuid::new_v4(),
                credential_set_id: Uuid::new_v4(),
                merkle_root: "a".repeat(64),
                timestamp: Utc::now(),
                expires_at: Utc::now() + chrono::Duration::hours(1),
                version: "1.0.0".into(),
                circuit_id: "membership".into(),
            },
        };

        let verifier = Verifier::new(&registry, &circuit);
        let outcome = verifier.verify(&proof).unwrap();
        assert!(!outcome.valid);
        assert_eq!(outcome.errors, vec!["INVALID_PROOF_STRUCTURE"]);
        assert!(outcome.credential_set_id.is_none());
    }
}
