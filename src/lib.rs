//! Anonymous credential-set membership proofs.
//!
//! A verifier publishes a Poseidon Merkle root over a set of credentials
//! (an allow-list, a voter roll, a membership directory) without publishing
//! the set itself. A holder of one credential in that set can then prove,
//! with a Groth16 zk-SNARK, that their credential is a member of the set
//! committed to by that root, without revealing which credential it is.
//!
//! ## Components
//!
//! - [`field`]: Poseidon hashing over BN254's scalar field, and the
//!   canonical credential-to-leaf encoding.
//! - [`merkle`]: builds the tree and extracts fixed-depth inclusion
//!   witnesses.
//! - [`credential_set`]: named, versioned collections of credentials, each
//!   backed by a tree.
//! - [`circuit`]: the R1CS membership circuit proved over a witness.
//! - [`prover`] / [`artifacts`]: Groth16 proof generation and the proving/
//!   verifying key artifacts it runs against.
//! - [`proof`]: the wire (JSON) shape of a generated proof.
//! - [`registry`]: the trusted root registry a verifier consults.
//! - [`verifier`]: the staged verification pipeline.
//! - [`api`]: [`api::MembershipSystem`], a facade over all of the above.
//!
//! ## Quick start
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
//! system.generate_and_store_circuit(&CircuitConfig::new("membership", "./circuits"), 1)?;
//!
//! let set = system.create_set(CreateSetRequest {
//!     name: "voters".into(),
//!     description: None,
//!     set_type: CredentialSetType::Voters,
//!     credentials: vec!["alice".into(), "bob".into()],
//! })?;
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
//! let outcome = system.verify_proof(VerifyProofRequest { proof: proof.proof })?;
//! assert!(outcome.valid);
//! # Ok::<(), credential_membership::error::CredentialError>(())
//! ```

pub mod api;
pub mod artifacts;
pub mod circuit;
pub mod config;
pub mod credential_set;
pub mod curve_json;
pub mod error;
pub mod field;
pub mod merkle;
pub mod proof;
pub mod prover;
pub mod registry;
pub mod utils;
pub mod verifier;

pub use api::MembershipSystem;
pub use artifacts::{CircuitManager, VerifyingKeyJson};
pub use circuit::MembershipCircuit;
pub use credential_set::{CredentialSet, CredentialSetManager, CredentialSetType};
pub use error::{CredentialError, Result};
pub use merkle::{MerkleTree, MerkleWitness};
pub use proof::Proof;
pub use prover::Prover;
pub use registry::{TrustedRootEntry, TrustedRootRegistry};
pub use verifier::{VerificationOutcome, Verifier};
