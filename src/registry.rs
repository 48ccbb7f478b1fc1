//! Trusted Root Registry (part of C5): the set of `(credentialSetId, root)`
//! pairs a verifier is willing to accept. A proof whose claimed root is not
//! registered against its claimed set fails with `UNTRUSTED_ROOT` regardless
//! of how good the cryptography underneath it is.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{CredentialError, Result};
use crate::field;

/// A trusted root entry: identity is `(set_id, root)`, everything else is
/// descriptive. `expires_at` is optional — an entry with none is trusted
/// indefinitely until explicitly revoked.
#[derive(Debug, Clone)]
pub struct TrustedRootEntry {
    pub set_id: Uuid,
    pub root: String,
    pub added_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl TrustedRootEntry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| exp > now).unwrap_or(true)
    }
}

/// Guarded by a reader/writer lock for the same reason as
/// [`crate::credential_set::CredentialSetManager`]: trust checks on every
/// verification vastly outnumber registry updates.
#[derive(Default)]
pub struct TrustedRootRegistry {
    entries: RwLock<HashMap<(Uuid, String), TrustedRootEntry>>,
}

impl TrustedRootRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `(set_id, root)` as trusted, optionally with an expiry.
    /// Validates `root` is 64 lowercase hex nibbles. A duplicate add
    /// (same identity) is a no-op that leaves the existing entry untouched,
    /// matching the protocol's idempotency requirement.
    pub fn trust(
        &self,
        set_id: Uuid,
        root: impl Into<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let root = root.into();
        if !field::is_valid_hex64(&root) {
            return Err(CredentialError::InvalidRootFormat { root });
        }
        let key = (set_id, root.clone());
        let mut entries = self.entries.write().map_err(|_| CredentialError::Internal)?;
        entries.entry(key).or_insert(TrustedRootEntry {
            set_id,
            root,
            added_at: Utc::now(),
            expires_at,
        });
        Ok(())
    }

    /// Revokes trust in `(set_id, root)`. Returns `true` if an entry had
    /// existed (whether or not it was still live).
    pub fn revoke(&self, set_id: Uuid, root: &str) -> Result<bool> {
        let mut entries = self.entries.write().map_err(|_| CredentialError::Internal)?;
        Ok(entries.remove(&(set_id, root.to_string())).is_some())
    }

    /// True iff `(set_id, root)` is present and not expired.
    pub fn is_trusted(&self, set_id: Uuid, root: &str) -> Result<bool> {
        let entries = self.entries.read().map_err(|_| CredentialError::Internal)?;
        Ok(entries
            .get(&(set_id, root.to_string()))
            .map(|e| e.is_live(Utc::now()))
            .unwrap_or(false))
    }

    /// Convenience wrapper returning `UNTRUSTED_ROOT` directly, for callers
    /// that want to `?` straight through the check.
    pub fn require_trusted(&self, set_id: Uuid, root: &str) -> Result<()> {
        if self.is_trusted(set_id, root)? {
            Ok(())
        } else {
            Err(CredentialError::UntrustedRoot)
        }
    }

    /// Total number of entries, live or expired.
    pub fn count(&self) -> Result<usize> {
        let entries = self.entries.read().map_err(|_| CredentialError::Internal)?;
        Ok(entries.len())
    }

    /// All entries registered for `set_id`, live or expired.
    pub fn list(&self, set_id: Uuid) -> Result<Vec<TrustedRootEntry>> {
        let entries = self.entries.read().map_err(|_| CredentialError::Internal)?;
        Ok(entries
            .values()
            .filter(|e| e.set_id == set_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_root(byte: u8) -> String {
        hex::encode([byte; 32])
    }

    #[test]
    fn untrusted_root_is_rejected() {
        let registry = TrustedRootRegistry::new();
        let set_id = Uuid::new_v4();
        assert!(!registry.is_trusted(set_id, &hex_root(0xaa)).unwrap());
        assert!(matches!(
            registry.require_trusted(set_id, &hex_root(0xaa)).unwrap_err(),
            CredentialError::UntrustedRoot
        ));
    }

    #[test]
    fn trust_then_require_succeeds() {
        let registry = TrustedRootRegistry::new();
        let set_id = Uuid::new_v4();
        let root = hex_root(0xbb);
        registry.trust(set_id, root.clone(), None).unwrap();
        assert!(registry.require_trusted(set_id, &root).is_ok());
    }

    #[test]
    fn trust_is_scoped_to_its_set_id() {
        let registry = TrustedRootRegistry::new();
        let root = hex_root(0xcc);
        registry.trust(Uuid::new_v4(), root.clone(), None).unwrap();
        assert!(!registry.is_trusted(Uuid::new_v4(), &root).unwrap());
    }

    #[test]
    fn revoke_removes_trust() {
        let registry = TrustedRootRegistry::new();
        let set_id = Uuid::new_v4();
        let root = hex_root(0xdd);
        registry.trust(set_id, root.clone(), None).unwrap();
        assert!(registry.revoke(set_id, &root).unwrap());
        assert!(!registry.is_trusted(set_id, &root).unwrap());
    }

    #[test]
    fn revoke_on_absent_entry_returns_false() {
        let registry = TrustedRootRegistry::new();
        assert!(!registry.revoke(Uuid::new_v4(), &hex_root(0xee)).unwrap());
    }

    #[test]
    fn trust_rejects_malformed_root() {
        let registry = TrustedRootRegistry::new();
        let err = registry
            .trust(Uuid::new_v4(), "not-hex", None)
            .unwrap_err();
        assert!(matches!(err, CredentialError::InvalidRootFormat { .. }));
    }

    #[test]
    fn expired_entry_is_not_trusted() {
        let registry = TrustedRootRegistry::new();
        let set_id = Uuid::new_v4();
        let root = hex_root(0xff);
        let past = Utc::now() - chrono::Duration::hours(1);
        registry.trust(set_id, root.clone(), Some(past)).unwrap();
        assert!(!registry.is_trusted(set_id, &root).unwrap());
    }

    #[test]
    fn duplicate_trust_is_idempotent_and_keeps_first_expiry() {
        let registry = TrustedRootRegistry::new();
        let set_id = Uuid::new_v4();
        let root = hex_root(0x11);
        let future = Utc::now() + chrono::Duration::hours(1);
        registry.trust(set_id, root.clone(), None).unwrap();
        registry.trust(set_id, root.clone(), Some(future)).unwrap();
        // first add had no expiry; the no-op second add must not introduce one
        assert!(registry.is_trusted(set_id, &root).unwrap());
        let entries = registry.list(set_id).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].expires_at.is_none());
    }

    #[test]
    fn list_and_count_reflect_contents() {
        let registry = TrustedRootRegistry::new();
        let set_id = Uuid::new_v4();
        registry.trust(set_id, hex_root(0x01), None).unwrap();
        registry.trust(set_id, hex_root(0x02), None).unwrap();
        registry.trust(Uuid::new_v4(), hex_root(0x03), None).unwrap();
        assert_eq!(registry.count().unwrap(), 3);
        assert_eq!(registry.list(set_id).unwrap().len(), 2);
    }
}
