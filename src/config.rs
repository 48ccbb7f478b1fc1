//! Configuration constants and types for the credential-membership system.
//!
//! Mirrors the source crate's `config.rs`: named constants grouped by concern,
//! plus small structs for the handful of values that are meaningfully
//! configurable per deployment rather than fixed by the protocol.

/// Fixed logical depth of every Merkle tree. Leaves are zero-padded on the
/// right up to `2^MERKLE_DEPTH` so every witness has exactly this many
/// siblings regardless of the set's physical size.
pub const MERKLE_DEPTH: usize = 20;

/// Upper bound on credentials in one set.
pub const MAX_CREDENTIALS_PER_SET: usize = 1024;

/// Upper bound on credential string length, in bytes, before trimming.
pub const MAX_CREDENTIAL_LEN: usize = 256;

/// Default proof time-to-live, in hours, stamped onto freshly generated proofs.
pub const DEFAULT_PROOF_EXPIRY_HOURS: i64 = 24;

/// Current wire-format version stamped into proof metadata.
pub const PROOF_FORMAT_VERSION: &str = "1.0.0";

/// Locates circuit artifacts (proving key, verifying key) on disk.
///
/// The proving/verifying key pair for a given `circuit_name` is expected at
/// `{circuits_path}/{circuit_name}.pk.bin` and `{circuits_path}/{circuit_name}.vk.json`.
#[derive(Debug, Clone)]
pub struct CircuitConfig {
    pub circuit_name: String,
    pub circuits_path: String,
}

impl CircuitConfig {
    pub fn new(circuit_name: impl Into<String>, circuits_path: impl Into<String>) -> Self {
        Self {
            circuit_name: circuit_name.into(),
            circuits_path: circuits_path.into(),
        }
    }

    pub fn proving_key_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.circuits_path).join(format!("{}.pk.bin", self.circuit_name))
    }

    pub fn verifying_key_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.circuits_path).join(format!("{}.vk.json", self.circuit_name))
    }
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self::new("membership", "./circuits")
    }
}

/// Deployment-tunable limits for the credential set manager and prover.
///
/// Separate from [`CircuitConfig`] because these govern application-level
/// policy rather than artifact location.
#[derive(Debug, Clone)]
pub struct SystemConfig {
    pub proof_expiry_hours: i64,
    pub max_credentials_per_set: usize,
    /// Reported for parity with deployment configs that expect this key, but
    /// not an independent knob: the circuit's R1CS is generated once, at a
    /// fixed depth, by the trusted setup, so changing this field alone would
    /// not change how many siblings a witness carries. Changing the tree
    /// depth means generating a new circuit at `MERKLE_DEPTH`'s new value and
    /// running a fresh setup, not adjusting this field at runtime.
    pub max_merkle_depth: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            proof_expiry_hours: DEFAULT_PROOF_EXPIRY_HOURS,
            max_credentials_per_set: MAX_CREDENTIALS_PER_SET,
            max_merkle_depth: MERKLE_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circuit_config_paths_join_correctly() {
        let cfg = CircuitConfig::new("membership", "/var/lib/circuits");
        assert_eq!(
            cfg.proving_key_path(),
            std::path::PathBuf::from("/var/lib/circuits/membership.pk.bin")
        );
        assert_eq!(
            cfg.verifying_key_path(),
            std::path::PathBuf::from("/var/lib/circuits/membership.vk.json")
        );
    }

    #[test]
    fn system_config_defaults_match_protocol() {
        let cfg = SystemConfig::default();
        assert_eq!(cfg.proof_expiry_hours, 24);
        assert_eq!(cfg.max_credentials_per_set, 1024);
        assert_eq!(cfg.max_merkle_depth, 20);
    }
}
