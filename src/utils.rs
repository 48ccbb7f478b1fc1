//! Stateless helper functions for the credential-membership library.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// `nullifier(credential, secret) = SHA-256(credential || secret)`, hex
/// encoded. Not part of the circuit's soundness: an application layer can
/// use it to recognize proof reuse, but nothing here binds it into the
/// Groth16 statement.
pub fn nullifier(credential: &str, secret: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(credential.as_bytes());
    hasher.update(secret);
    hex::encode(hasher.finalize())
}

/// A fresh 32-byte secret for [`nullifier`], when the caller supplies none.
pub fn random_secret() -> [u8; 32] {
    let mut secret = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut secret);
    secret
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullifier_is_deterministic_given_the_same_secret() {
        let secret = [7u8; 32];
        assert_eq!(
            nullifier("alice", &secret),
            nullifier("alice", &secret)
        );
    }

    #[test]
    fn nullifier_differs_across_secrets() {
        assert_ne!(
            nullifier("alice", &[1u8; 32]),
            nullifier("alice", &[2u8; 32])
        );
    }

    #[test]
    fn random_secret_is_not_trivially_constant() {
        assert_ne!(random_secret(), random_secret());
    }
}
