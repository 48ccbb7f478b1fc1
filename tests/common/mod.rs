//! Shared fixtures for integration tests: a `MembershipSystem` with a freshly
//! generated circuit, torn down after the caller is done with it.

use ark_std::rand::rngs::StdRng;
use ark_std::rand::SeedableRng;
use credential_membership::api::types::{
    CreateSetRequest, GenerateProofRequest, RegisterTrustedRootRequest,
};
use credential_membership::api::MembershipSystem;
use credential_membership::config::CircuitConfig;
use credential_membership::credential_set::CredentialSetType;
use credential_membership::proof::Proof;
use uuid::Uuid;

pub struct Fixture {
    pub system: MembershipSystem,
    tmp_dir: std::path::PathBuf,
}

impl Fixture {
    /// Spins up a `MembershipSystem` with a freshly generated circuit under
    /// a process-unique temp directory.
    pub fn new(seed: u64) -> Self {
        let tmp_dir = std::env::temp_dir().join(format!(
            "credential-membership-it-{}-{seed}",
            std::process::id()
        ));
        let system = MembershipSystem::new("membership");
        let config = CircuitConfig::new("membership", tmp_dir.to_str().unwrap());
        system.generate_and_store_circuit(&config, seed).unwrap();
        Self { system, tmp_dir }
    }

    /// Creates a set with `credentials`, registers its root as trusted, and
    /// returns the set id and root.
    pub fn trusted_set(&self, name: &str, credentials: &[&str]) -> (Uuid, String) {
        let created = self
            .system
            .create_set(CreateSetRequest {
                name: name.to_string(),
                description: None,
                set_type: CredentialSetType::AllowList,
                credentials: credentials.iter().map(|c| c.to_string()).collect(),
            })
            .unwrap();
        self.system
            .register_trusted_root(RegisterTrustedRootRequest {
                set_id: created.set_id,
                root: created.root.clone(),
                expires_at: None,
            })
            .unwrap();
        (created.set_id, created.root)
    }

    pub fn prove(&self, set_id: Uuid, credential: &str, seed: u64) -> Proof {
        let mut rng = StdRng::seed_from_u64(seed);
        self.system
            .generate_proof(
                GenerateProofRequest {
                    set_id,
                    credential: credential.to_string(),
                },
                &mut rng,
            )
            .unwrap()
            .proof
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.tmp_dir).ok();
    }
}
