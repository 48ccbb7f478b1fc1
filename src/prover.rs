//! ZK Prover (C4): turns a credential set membership into a Groth16 proof.
//!
//! Ties together the credential set manager (witness lookup), the circuit
//! manager (proving key), and the proof codec (wire shape), performing a
//! self-check against the plaintext Merkle walk before ever handing a proof
//! back to a caller.

use ark_bn254::{Bn254, Fr};
use ark_groth16::Groth16;
use ark_snark::SNARK;
use ark_std::rand::rngs::StdRng;
use ark_std::rand::SeedableRng;
use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::artifacts::CircuitManager;
use crate::circuit::MembershipCircuit;
use crate::config;
use crate::credential_set::CredentialSetManager;
use crate::error::{CredentialError, Result};
use crate::field;
use crate::merkle;
use crate::proof::{public_signals_for_root, Groth16ProofJson, Proof, ProofMetadata};

/// Checks a witness is structurally complete before it reaches circuit
/// synthesis: `siblings` and `path_indices` must be the same length and
/// within the circuit's fixed depth. `MembershipCircuit::generate_constraints`
/// would otherwise zip mismatched-length vectors down to the shorter one and
/// silently prove membership against a truncated path.
fn validate_witness(witness: &merkle::MerkleWitness) -> Result<()> {
    if witness.siblings.len() != witness.path_indices.len() {
        return Err(CredentialError::ProofGenerationFailed {
            reason: "witness siblings and path_indices have different lengths".to_string(),
        });
    }
    if witness.siblings.is_empty() || witness.siblings.len() > config::MERKLE_DEPTH {
        return Err(CredentialError::ProofGenerationFailed {
            reason: format!(
                "witness has {} siblings, expected 1..={}",
                witness.siblings.len(),
                config::MERKLE_DEPTH
            ),
        });
    }
    Ok(())
}

/// Generates membership proofs against a [`CredentialSetManager`] using the
/// proving key held by a [`CircuitManager`].
pub struct Prover<'a> {
    sets: &'a CredentialSetManager,
    circuit: &'a CircuitManager,
    proof_expiry_hours: i64,
}

impl<'a> Prover<'a> {
    /// Uses `config::DEFAULT_PROOF_EXPIRY_HOURS` as the TTL stamped onto
    /// every generated proof. Use [`Prover::with_expiry_hours`] to override
    /// it, e.g. from a deployment's `proof_expiry_hours` configuration key.
    pub fn new(sets: &'a CredentialSetManager, circuit: &'a CircuitManager) -> Self {
        Self::with_expiry_hours(sets, circuit, config::DEFAULT_PROOF_EXPIRY_HOURS)
    }

    pub fn with_expiry_hours(
        sets: &'a CredentialSetManager,
        circuit: &'a CircuitManager,
        proof_expiry_hours: i64,
    ) -> Self {
        Self {
            sets,
            circuit,
            proof_expiry_hours,
        }
    }

    /// Proves that `credential` is a member of credential set `set_id`.
    ///
    /// Looks up the set's current inclusion witness, validates it, synthesizes
    /// the circuit, proves it, and self-checks the resulting public signal
    /// against the plaintext Merkle walk before returning: a mismatch here
    /// means the circuit and the off-chain tree have disagreed, which should
    /// never happen and is reported as `ProofGenerationFailed` rather than
    /// handed to a caller as a proof that would fail verification anyway.
    #[instrument(skip(self, rng))]
    pub fn generate(&self, set_id: Uuid, credential: &str, rng: &mut StdRng) -> Result<Proof> {
        if credential.is_empty() {
            return Err(CredentialError::InvalidCredential);
        }

        let set = self.sets.get(set_id)?;
        let witness = set.witness_for(credential)?;
        validate_witness(&witness)?;
        let expected_root =
            field::hex64_to_field(&set.root).ok_or(CredentialError::Internal)?;

        let reconstructed = merkle::reconstruct_root(&witness);
        if reconstructed != expected_root {
            return Err(CredentialError::ProofGenerationFailed {
                reason: "witness does not reconstruct the set's current root".to_string(),
            });
        }

        let circuit = MembershipCircuit::new(&witness, expected_root);
        let proving_key = self.circuit.proving_key()?;
        let groth16_proof = Groth16::<Bn254>::prove(&proving_key, circuit, rng).map_err(|e| {
            CredentialError::ProofGenerationFailed {
                reason: format!("groth16 proving failed: {e}"),
            }
        })?;

        let public_signals = public_signals_for_root(expected_root);

        let now = Utc::now();
        let proof = Proof {
            groth16: Groth16ProofJson::from_arkworks(&groth16_proof),
            public_signals,
            metadata: ProofMetadata {
                proof_id: Uuid::new_v4(),
                credential_set_id: set_id,
                merkle_root: set.root.clone(),
                timestamp: now,
                expires_at: now + chrono::Duration::hours(self.proof_expiry_hours),
                version: config::PROOF_FORMAT_VERSION.to_string(),
                circuit_id: self.circuit.circuit_id().to_string(),
            },
        };
        info!(
            set_id = %set_id,
            proof_id = %proof.metadata.proof_id,
            "generated membership proof"
        );
        Ok(proof)
    }
}
