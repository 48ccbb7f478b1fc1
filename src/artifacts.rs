//! Circuit Manager (part of C4/C5): loads and holds the Groth16 proving and
//! verifying keys for the membership circuit.
//!
//! There is exactly one circuit shape in this system (`MembershipCircuit` at
//! the fixed depth `config::MERKLE_DEPTH`), so unlike the source crate's
//! `params.rs` (a `Lazy<Mutex<HashMap<ShapeKey, _>>>` cache for a family of
//! circuit shapes) this manager just holds one proving key and one prepared
//! verifying key behind a read lock.
//!
//! The proving key is stored as an `ark-serialize` compressed blob (native,
//! arkworks-only format). The verifying key is additionally stored in the
//! decimal-string JSON shape snarkjs-compatible on-chain verifiers expect,
//! so a verifying key generated here can be handed to an external verifier
//! without a conversion step.

use std::path::Path;
use std::sync::RwLock;

use ark_bn254::Bn254;
use ark_groth16::{Groth16, PreparedVerifyingKey, ProvingKey, VerifyingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use ark_std::rand::rngs::StdRng;
use ark_std::rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::circuit::MembershipCircuit;
use crate::config::CircuitConfig;
use crate::curve_json::{g1_from_json, g1_to_json, g2_from_json, g2_to_json};
use crate::error::{CredentialError, Result};

/// snarkjs-compatible JSON encoding of a Groth16 verifying key over BN254.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyingKeyJson {
    pub protocol: String,
    pub curve: String,
    #[serde(rename = "nPublic")]
    pub n_public: usize,
    pub vk_alpha_1: [String; 3],
    pub vk_beta_2: [[String; 2]; 3],
    pub vk_gamma_2: [[String; 2]; 3],
    pub vk_delta_2: [[String; 2]; 3],
    #[serde(rename = "IC")]
    pub ic: Vec<[String; 3]>,
}

impl VerifyingKeyJson {
    pub fn from_arkworks(vk: &VerifyingKey<Bn254>) -> Self {
        Self {
            protocol: "groth16".to_string(),
            curve: "bn128".to_string(),
            n_public: vk.gamma_abc_g1.len().saturating_sub(1),
            vk_alpha_1: g1_to_json(&vk.alpha_g1),
            vk_beta_2: g2_to_json(&vk.beta_g2),
            vk_gamma_2: g2_to_json(&vk.gamma_g2),
            vk_delta_2: g2_to_json(&vk.delta_g2),
            ic: vk.gamma_abc_g1.iter().map(g1_to_json).collect(),
        }
    }

    pub fn to_arkworks(&self) -> Result<VerifyingKey<Bn254>> {
        if self.protocol != "groth16" || self.curve != "bn128" {
            return Err(CredentialError::VerificationKeyNotFound {
                reason: format!("unsupported protocol/curve: {}/{}", self.protocol, self.curve),
            });
        }
        let gamma_abc_g1 = self
            .ic
            .iter()
            .map(g1_from_json)
            .collect::<Result<Vec<_>>>()?;
        Ok(VerifyingKey {
            alpha_g1: g1_from_json(&self.vk_alpha_1)?,
            beta_g2: g2_from_json(&self.vk_beta_2)?,
            gamma_g2: g2_from_json(&self.vk_gamma_2)?,
            delta_g2: g2_from_json(&self.vk_delta_2)?,
            gamma_abc_g1,
        })
    }
}

struct Artifacts {
    proving_key: ProvingKey<Bn254>,
    verifying_key: VerifyingKey<Bn254>,
    prepared_verifying_key: PreparedVerifyingKey<Bn254>,
}

/// Owns the proving and (prepared) verifying key for the membership
/// circuit, loaded once and held for the process lifetime. Reads dominate
/// writes (a key is loaded once, then verified against repeatedly), so a
/// plain `RwLock` is used rather than anything fancier.
pub struct CircuitManager {
    circuit_id: String,
    artifacts: RwLock<Option<Artifacts>>,
}

impl CircuitManager {
    pub fn new(circuit_id: impl Into<String>) -> Self {
        Self {
            circuit_id: circuit_id.into(),
            artifacts: RwLock::new(None),
        }
    }

    /// Loads the proving key (compressed `ark-serialize` blob) and the
    /// verifying key (snarkjs-shaped JSON) from `config`'s paths.
    #[instrument(skip(self))]
    pub fn load(&self, config: &CircuitConfig) -> Result<()> {
        let pk_bytes = std::fs::read(config.proving_key_path()).map_err(|e| {
            CredentialError::CircuitInitializationFailed {
                reason: format!("reading proving key: {e}"),
            }
        })?;
        let proving_key = ProvingKey::<Bn254>::deserialize_compressed(&pk_bytes[..]).map_err(|e| {
            CredentialError::CircuitInitializationFailed {
                reason: format!("decoding proving key: {e}"),
            }
        })?;

        let vk_bytes = std::fs::read(config.verifying_key_path()).map_err(|e| {
            CredentialError::VerificationKeyNotFound {
                reason: format!("reading verifying key: {e}"),
            }
        })?;
        let vk_json: VerifyingKeyJson = serde_json::from_slice(&vk_bytes).map_err(|e| {
            CredentialError::VerificationKeyNotFound {
                reason: format!("parsing verifying key json: {e}"),
            }
        })?;
        let verifying_key = vk_json.to_arkworks()?;
        let prepared_verifying_key = Groth16::<Bn254>::process_vk(&verifying_key).map_err(|e| {
            CredentialError::CircuitInitializationFailed {
                reason: format!("preparing verifying key: {e}"),
            }
        })?;

        let mut guard = self.artifacts.write().map_err(|_| CredentialError::Internal)?;
        *guard = Some(Artifacts {
            proving_key,
            verifying_key,
            prepared_verifying_key,
        });
        info!(circuit_id = %self.circuit_id, "loaded circuit artifacts");
        Ok(())
    }

    /// Runs a trusted setup for the fixed membership circuit shape and
    /// writes both artifacts to `config`'s paths. Development/test
    /// convenience only: production deployments should load artifacts from
    /// a ceremony output instead of generating their own.
    #[instrument(skip(self))]
    pub fn generate_and_store(&self, config: &CircuitConfig, seed: u64) -> Result<()> {
        let circuit = MembershipCircuit::new_empty();
        let mut rng = StdRng::seed_from_u64(seed);
        let (pk, vk) = Groth16::<Bn254>::circuit_specific_setup(circuit, &mut rng).map_err(|e| {
            CredentialError::CircuitInitializationFailed {
                reason: format!("circuit setup failed: {e}"),
            }
        })?;

        if let Some(parent) = config.proving_key_path().parent() {
            std::fs::create_dir_all(parent).map_err(|e| CredentialError::CircuitInitializationFailed {
                reason: format!("creating circuits directory: {e}"),
            })?;
        }

        let mut pk_bytes = Vec::new();
        pk.serialize_compressed(&mut pk_bytes).map_err(|e| {
            CredentialError::CircuitInitializationFailed {
                reason: format!("encoding proving key: {e}"),
            }
        })?;
        std::fs::write(config.proving_key_path(), pk_bytes).map_err(|e| {
            CredentialError::CircuitInitializationFailed {
                reason: format!("writing proving key: {e}"),
            }
        })?;

        let vk_json = VerifyingKeyJson::from_arkworks(&vk);
        let vk_bytes = serde_json::to_vec_pretty(&vk_json).map_err(|e| {
            CredentialError::CircuitInitializationFailed {
                reason: format!("encoding verifying key: {e}"),
            }
        })?;
        std::fs::write(config.verifying_key_path(), vk_bytes).map_err(|e| {
            CredentialError::CircuitInitializationFailed {
                reason: format!("writing verifying key: {e}"),
            }
        })?;

        self.load(config)
    }

    pub fn circuit_id(&self) -> &str {
        &self.circuit_id
    }

    pub fn proving_key(&self) -> Result<ProvingKey<Bn254>> {
        let guard = self.artifacts.read().map_err(|_| CredentialError::Internal)?;
        guard
            .as_ref()
            .map(|a| a.proving_key.clone())
            .ok_or_else(|| CredentialError::CircuitNotFound {
                circuit_id: self.circuit_id.clone(),
            })
    }

    pub fn verifying_key(&self) -> Result<VerifyingKey<Bn254>> {
        let guard = self.artifacts.read().map_err(|_| CredentialError::Internal)?;
        guard
            .as_ref()
            .map(|a| a.verifying_key.clone())
            .ok_or_else(|| CredentialError::CircuitNotFound {
                circuit_id: self.circuit_id.clone(),
            })
    }

    pub fn prepared_verifying_key(&self) -> Result<PreparedVerifyingKey<Bn254>> {
        let guard = self.artifacts.read().map_err(|_| CredentialError::Internal)?;
        guard
            .as_ref()
            .map(|a| a.prepared_verifying_key.clone())
            .ok_or_else(|| CredentialError::CircuitNotFound {
                circuit_id: self.circuit_id.clone(),
            })
    }

    pub fn is_loaded(&self) -> bool {
        self.artifacts.read().map(|g| g.is_some()).unwrap_or(false)
    }
}

/// Loads `Bn254` field elements straight from a path for external verifier
/// compatibility checks; not otherwise used in the proving/verifying path.
pub fn read_verifying_key_json(path: &Path) -> Result<VerifyingKeyJson> {
    let bytes = std::fs::read(path).map_err(|e| CredentialError::VerificationKeyNotFound {
        reason: e.to_string(),
    })?;
    serde_json::from_slice(&bytes).map_err(|e| CredentialError::VerificationKeyNotFound {
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_dir(name: &str) -> std::path::PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push(format!("credential-membership-test-{name}-{}", std::process::id()));
        dir
    }

    #[test]
    fn verifying_key_json_round_trips_through_arkworks_types() {
        let circuit = MembershipCircuit::new_empty();
        let mut rng = StdRng::seed_from_u64(42);
        let (_, vk) = Groth16::<Bn254>::circuit_specific_setup(circuit, &mut rng).unwrap();

        let json = VerifyingKeyJson::from_arkworks(&vk);
        assert_eq!(json.protocol, "groth16");
        assert_eq!(json.curve, "bn128");
        assert_eq!(json.n_public, 1);

        let restored = json.to_arkworks().unwrap();
        assert_eq!(restored.alpha_g1, vk.alpha_g1);
        assert_eq!(restored.beta_g2, vk.beta_g2);
        assert_eq!(restored.gamma_g2, vk.gamma_g2);
        assert_eq!(restored.delta_g2, vk.delta_g2);
        assert_eq!(restored.gamma_abc_g1, vk.gamma_abc_g1);
    }

    #[test]
    fn generate_and_load_round_trips_on_disk() {
        let dir = tmp_dir("generate-and-load");
        let config = CircuitConfig::new("membership", dir.to_str().unwrap());
        let manager = CircuitManager::new("membership");
        manager.generate_and_store(&config, 7).unwrap();
        assert!(manager.is_loaded());

        let other = CircuitManager::new("membership");
        other.load(&config).unwrap();
        assert_eq!(
            other.verifying_key().unwrap().alpha_g1,
            manager.verifying_key().unwrap().alpha_g1
        );
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn circuit_not_found_before_load() {
        let manager = CircuitManager::new("membership");
        assert!(matches!(
            manager.proving_key().unwrap_err(),
            CredentialError::CircuitNotFound { .. }
        ));
    }
}
