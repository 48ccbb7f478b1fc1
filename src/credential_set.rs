//! Credential Set Manager (C3): stores named collections of credentials, each
//! backed by a Merkle tree, and issues inclusion witnesses against them.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config;
use crate::error::{CredentialError, Result};
use crate::field;
use crate::merkle::{self, MerkleTree, MerkleWitness};

/// How a credential set is meant to be used. Purely descriptive: every
/// variant is stored, hashed, and proven identically, it only changes what a
/// caller is expected to put in `credentials`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSetType {
    AllowList,
    Membership,
    Voters,
    Custom,
}

/// A named collection of credentials and the Merkle tree built over them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialSet {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub set_type: CredentialSetType,
    pub credentials: Vec<String>,
    /// The tree's root, as a 64-hex-nibble string.
    pub root: String,
    pub created_at: DateTime<Utc>,
    /// Bumped every time `credentials` changes and the tree is rebuilt.
    pub version: u64,

    #[serde(skip)]
    tree: MerkleTree,
}

impl CredentialSet {
    fn new(
        name: String,
        description: Option<String>,
        set_type: CredentialSetType,
        credentials: Vec<String>,
        max_credentials: usize,
    ) -> Result<Self> {
        validate_credentials(&credentials, max_credentials)?;
        let tree = merkle::build_tree_from_credentials(&credentials);
        let root = field::field_to_hex64(&tree.root());
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            description,
            set_type,
            credentials,
            root,
            created_at: Utc::now(),
            version: 1,
            tree,
        })
    }

    /// Position of `credential` in this set's leaf order, if present.
    pub fn index_of(&self, credential: &str) -> Option<usize> {
        self.credentials.iter().position(|c| c == credential)
    }

    /// The inclusion witness for `credential`, or `CredentialNotFound` if it
    /// is not a member.
    pub fn witness_for(&self, credential: &str) -> Result<MerkleWitness> {
        let index = self
            .index_of(credential)
            .ok_or(CredentialError::CredentialNotFound)?;
        merkle::get_padded_proof_for_leaf(&self.tree, index)
    }
}

/// Rejects empty sets, oversized sets, duplicate entries, and credentials
/// that are empty or exceed `config::MAX_CREDENTIAL_LEN` bytes. `max_credentials`
/// is a deployment-tunable ceiling (see `config::SystemConfig::max_credentials_per_set`),
/// never above `config::MAX_CREDENTIALS_PER_SET`.
fn validate_credentials(credentials: &[String], max_credentials: usize) -> Result<()> {
    if credentials.is_empty() {
        return Err(CredentialError::ValidationError {
            reason: "credential set must contain at least one credential".into(),
        });
    }
    if credentials.len() > max_credentials {
        return Err(CredentialError::CredentialLimitExceeded {
            got: credentials.len(),
            max: max_credentials,
        });
    }

    let mut seen = std::collections::HashSet::with_capacity(credentials.len());
    for credential in credentials {
        if credential.is_empty() || credential.len() > config::MAX_CREDENTIAL_LEN {
            return Err(CredentialError::InvalidCredential);
        }
        if !seen.insert(credential.as_str()) {
            return Err(CredentialError::DuplicateCredential {
                credential: credential.clone(),
            });
        }
    }
    Ok(())
}

/// Owns every credential set currently known to this process, guarded by a
/// reader/writer lock: reads (proving, listing) far outnumber writes
/// (creating or editing a set) and nothing here ever suspends across a held
/// lock, so a plain `RwLock` is all the concurrency this needs.
pub struct CredentialSetManager {
    sets: RwLock<HashMap<Uuid, CredentialSet>>,
    max_credentials: usize,
}

impl Default for CredentialSetManager {
    fn default() -> Self {
        Self::with_max_credentials(config::MAX_CREDENTIALS_PER_SET)
    }
}

impl CredentialSetManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a manager enforcing a deployment-tunable `max_credentials`
    /// ceiling instead of `config::MAX_CREDENTIALS_PER_SET`, e.g. from a
    /// `max_credentials_per_set` configuration key.
    pub fn with_max_credentials(max_credentials: usize) -> Self {
        Self {
            sets: RwLock::new(HashMap::new()),
            max_credentials,
        }
    }

    #[instrument(skip(self, credentials))]
    pub fn create(
        &self,
        name: impl Into<String>,
        description: Option<String>,
        set_type: CredentialSetType,
        credentials: Vec<String>,
    ) -> Result<CredentialSet> {
        let set = CredentialSet::new(
            name.into(),
            description,
            set_type,
            credentials,
            self.max_credentials,
        )?;
        info!(set_id = %set.id, root = %set.root, "created credential set");
        let mut sets = self.sets.write().map_err(|_| CredentialError::Internal)?;
        sets.insert(set.id, set.clone());
        Ok(set)
    }

    pub fn get(&self, id: Uuid) -> Result<CredentialSet> {
        let sets = self.sets.read().map_err(|_| CredentialError::Internal)?;
        sets.get(&id)
            .cloned()
            .ok_or(CredentialError::CredentialSetNotFound {
                set_id: id.to_string(),
            })
    }

    pub fn list(&self) -> Result<Vec<CredentialSet>> {
        let sets = self.sets.read().map_err(|_| CredentialError::Internal)?;
        Ok(sets.values().cloned().collect())
    }

    pub fn delete(&self, id: Uuid) -> Result<()> {
        let mut sets = self.sets.write().map_err(|_| CredentialError::Internal)?;
        sets.remove(&id)
            .map(|_| ())
            .ok_or(CredentialError::CredentialSetNotFound {
                set_id: id.to_string(),
            })
    }

    pub fn count(&self) -> Result<usize> {
        let sets = self.sets.read().map_err(|_| CredentialError::Internal)?;
        Ok(sets.len())
    }

    /// The inclusion witness for `credential` inside set `id`.
    pub fn generate_witness(&self, id: Uuid, credential: &str) -> Result<MerkleWitness> {
        let sets = self.sets.read().map_err(|_| CredentialError::Internal)?;
        let set = sets
            .get(&id)
            .ok_or(CredentialError::CredentialSetNotFound {
                set_id: id.to_string(),
            })?;
        set.witness_for(credential)
    }

    /// Verifies a witness against set `id`'s current root without
    /// generating a SNARK proof; used by tests and by callers who only want
    /// a plaintext sanity check before proving.
    pub fn verify_witness(&self, id: Uuid, witness: &MerkleWitness) -> Result<bool> {
        let set = self.get(id)?;
        let root = field::hex64_to_field(&set.root).ok_or(CredentialError::Internal)?;
        Ok(merkle::verify_merkle_proof_in_place(root, witness))
    }
}
