//! `MembershipSystem`: a single facade bundling the credential set manager,
//! the trusted root registry, the circuit manager, and the prover/verifier
//! built on top of them.
//!
//! Mirrors the source crate's `PorSystem`: a thin struct that owns the
//! moving parts and exposes one validate-then-delegate method per
//! operation, so a caller (the CLI demo, an embedding service, a test)
//! never has to wire `Prover`/`Verifier` together by hand.

use ark_std::rand::rngs::StdRng;
use tracing::instrument;
use uuid::Uuid;

use crate::api::types::{
    CreateSetRequest, CreateSetResponse, GenerateProofRequest, GenerateProofResponse,
    RegisterTrustedRootRequest, VerifyProofRequest, VerifyProofResponse,
};
use crate::artifacts::CircuitManager;
use crate::config::{CircuitConfig, SystemConfig};
use crate::credential_set::CredentialSetManager;
use crate::error::Result;
use crate::prover::Prover;
use crate::registry::TrustedRootRegistry;
use crate::verifier::Verifier;

/// Owns every moving part of the membership protocol for one process.
pub struct MembershipSystem {
    pub sets: CredentialSetManager,
    pub registry: TrustedRootRegistry,
    pub circuit: CircuitManager,
    pub config: SystemConfig,
}

impl MembershipSystem {
    pub fn new(circuit_id: impl Into<String>) -> Self {
        Self::with_config(circuit_id, SystemConfig::default())
    }

    /// Builds a system whose proof TTL and credential-set limits come from
    /// `config` rather than the library defaults, e.g. a deployment's
    /// `proof_expiry_hours`/`max_credentials_per_set` configuration keys.
    pub fn with_config(circuit_id: impl Into<String>, config: SystemConfig) -> Self {
        Self {
            sets: CredentialSetManager::with_max_credentials(config.max_credentials_per_set),
            registry: TrustedRootRegistry::new(),
            circuit: CircuitManager::new(circuit_id),
            config,
        }
    }

    /// Loads proving/verifying key artifacts from `config`'s paths.
    pub fn load_circuit(&self, config: &CircuitConfig) -> Result<()> {
        self.circuit.load(config)
    }

    /// Runs a trusted setup for the membership circuit and writes the
    /// resulting artifacts to `config`'s paths. Development convenience,
    /// not a substitute for a real ceremony in production.
    pub fn generate_and_store_circuit(&self, config: &CircuitConfig, seed: u64) -> Result<()> {
        self.circuit.generate_and_store(config, seed)
    }

    #[instrument(skip(self, req))]
    pub fn create_set(&self, req: CreateSetRequest) -> Result<CreateSetResponse> {
        let set = self
            .sets
            .create(req.name, req.description, req.set_type, req.credentials)?;
        Ok(CreateSetResponse {
            set_id: set.id,
            root: set.root,
            credential_count: set.credentials.len(),
            created_at: set.created_at,
        })
    }

    pub fn register_trusted_root(&self, req: RegisterTrustedRootRequest) -> Result<()> {
        self.registry.trust(req.set_id, req.root, req.expires_at)
    }

    pub fn revoke_trusted_root(&self, set_id: Uuid, root: &str) -> Result<bool> {
        self.registry.revoke(set_id, root)
    }

    #[instrument(skip(self, req, rng))]
    pub fn generate_proof(
        &self,
        req: GenerateProofRequest,
        rng: &mut StdRng,
    ) -> Result<GenerateProofResponse> {
        let prover =
            Prover::with_expiry_hours(&self.sets, &self.circuit, self.config.proof_expiry_hours);
        let proof = prover.generate(req.set_id, &req.credential, rng)?;
        Ok(GenerateProofResponse { proof })
    }

    #[instrument(skip(self, req))]
    pub fn verify_proof(&self, req: VerifyProofRequest) -> Result<VerifyProofResponse> {
        let verifier = Verifier::new(&self.registry, &self.circuit);
        let outcome = verifier.verify(&req.proof)?;
        Ok(outcome.into())
    }
}
