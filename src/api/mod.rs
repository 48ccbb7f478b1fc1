//! A high-level, unified API for the anonymous credential-set membership
//! protocol.
//!
//! [`MembershipSystem`] bundles a credential set manager, a trusted root
//! registry, and a circuit manager behind one facade, so a caller never
//! wires the prover and verifier together by hand.
//!
//! ## Core workflow
//!
//! 1. **`create_set()`**: registers a named collection of credentials and
//!    builds its Merkle tree.
//! 2. **`register_trusted_root()`**: a verifier opts into trusting a
//!    specific `(setId, root)` pair, optionally with an expiry.
//! 3. **`generate_proof()`**: proves membership of one credential in a set
//!    without revealing which one.
//! 4. **`verify_proof()`**: runs the proof through the staged verification
//!    pipeline (structural, temporal, trust, cryptographic).
//!
//! ```rust,no_run
//! use credential_membership::api::{
//!     MembershipSystem,
//!     types::{CreateSetRequest, GenerateProofRequest, RegisterTrustedRootRequest, VerifyProofRequest},
//! };
//! use credential_membership::config::CircuitConfig;
//! use credential_membership::credential_set::CredentialSetType;
//! use ark_std::rand::{rngs::StdRng, SeedableRng};
//!
//! let system = MembershipSystem::new("membership");
//! let circuit_config = CircuitConfig::new("membership", "./circuits");
//! system.generate_and_store_circuit(&circuit_config, 1)?;
//!
//! let set = system.create_set(CreateSetRequest {
//!     name: "voters".into(),
//!     description: None,
//!     set_type: CredentialSetType::Voters,
//!     credentials: vec!["alice".into(), "bob".into()],
//! })?;
//!
//! system.register_trusted_root(RegisterTrustedRootRequest {
//!     set_id: set.set_id,
//!     root: set.root.clone(),
//!     expires_at: None,
//! })?;
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let proof = system.generate_proof(
//!     GenerateProofRequest { set_id: set.set_id, credential: "bob".into() },
//!     &mut rng,
//! )?;
//!
//! let outcome = system.verify_proof(VerifyProofRequest { proof: proof.proof })?;
//! assert!(outcome.valid);
//! # Ok::<(), credential_membership::error::CredentialError>(())
//! ```

pub mod system;
pub mod types;

pub use system::MembershipSystem;
