//! Proof Codec (C6): the wire representation of a generated membership
//! proof and its (de)serialization.
//!
//! Mirrors the protocol's JSON shape: a `groth16` object carrying the curve
//! points, a `publicSignals` array of decimal-string field elements, and a
//! `metadata` object. The arkworks `Proof<Bn254>` bridges to this shape the
//! same way [`crate::artifacts::VerifyingKeyJson`] bridges the verifying
//! key: G1/G2 affine coordinates as decimal strings.

use ark_bn254::{Bn254, Fr};
use ark_ff::{BigInteger, PrimeField};
use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::curve_json::{g1_from_json, g1_to_json, g2_from_json, g2_to_json};
use crate::error::{CredentialError, Result};
use crate::field;

fn fr_to_decimal(f: &Fr) -> String {
    BigUint::from_bytes_be(&f.into_bigint().to_bytes_be()).to_string()
}

fn decimal_to_fr(s: &str) -> Result<Fr> {
    let digits = s
        .parse::<BigUint>()
        .map_err(|_| CredentialError::InvalidProofStructure {
            reason: format!("not a decimal field element: {s}"),
        })?;
    Ok(Fr::from_be_bytes_mod_order(&digits.to_bytes_be()))
}

/// The `groth16` object of a wire proof: the three curve points, tagged
/// with the protocol and curve they were produced under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Groth16ProofJson {
    pub protocol: String,
    pub curve: String,
    pub a: [String; 3],
    pub b: [[String; 2]; 3],
    pub c: [String; 3],
}

impl Groth16ProofJson {
    pub fn from_arkworks(proof: &ark_groth16::Proof<Bn254>) -> Self {
        Self {
            protocol: "groth16".to_string(),
            curve: "bn128".to_string(),
            a: g1_to_json(&proof.a),
            b: g2_to_json(&proof.b),
            c: g1_to_json(&proof.c),
        }
    }

    pub fn to_arkworks(&self) -> Result<ark_groth16::Proof<Bn254>> {
        if self.protocol != "groth16" || self.curve != "bn128" {
            return Err(CredentialError::InvalidProofStructure {
                reason: format!("unsupported protocol/curve: {}/{}", self.protocol, self.curve),
            });
        }
        Ok(ark_groth16::Proof {
            a: g1_from_json(&self.a)?,
            b: g2_from_json(&self.b)?,
            c: g1_from_json(&self.c)?,
        })
    }
}

/// Everything about a proof that is not part of the Groth16 statement
/// itself: identity, which set and root it was issued against, and its
/// validity window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofMetadata {
    pub proof_id: Uuid,
    pub credential_set_id: Uuid,
    pub merkle_root: String,
    pub timestamp: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub version: String,
    pub circuit_id: String,
}

/// A complete membership proof, ready to serialize to or parse from the
/// wire JSON shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proof {
    pub groth16: Groth16ProofJson,
    pub public_signals: Vec<String>,
    pub metadata: ProofMetadata,
}

impl Proof {
    /// Serializes to the canonical wire JSON.
    pub fn serialize(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| CredentialError::InvalidProofStructure {
            reason: format!("serializing proof: {e}"),
        })
    }

    /// Parses the wire JSON without validating field shapes beyond what
    /// `serde` enforces; use [`Proof::validate`] afterward for the
    /// protocol-level structural checks.
    pub fn deserialize(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| CredentialError::InvalidProofStructure {
            reason: format!("parsing proof: {e}"),
        })
    }

    /// Structural validation: exactly one public signal, it is a well-formed
    /// decimal field element, and `merkle_root` is 64 lowercase hex nibbles.
    /// Does not touch trust or cryptographic validity.
    pub fn validate(&self) -> Result<()> {
        if self.public_signals.len() != 1 {
            return Err(CredentialError::InvalidProofStructure {
                reason: format!(
                    "expected exactly one public signal, got {}",
                    self.public_signals.len()
                ),
            });
        }
        decimal_to_fr(&self.public_signals[0])?;
        if !field::is_valid_hex64(&self.metadata.merkle_root) {
            return Err(CredentialError::InvalidRootFormat {
                root: self.metadata.merkle_root.clone(),
            });
        }
        Ok(())
    }

    /// `public_signals[0]` parsed back into a field element, i.e. the root
    /// the circuit computed.
    pub fn root_signal(&self) -> Result<Fr> {
        self.validate()?;
        decimal_to_fr(&self.public_signals[0])
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.metadata.expires_at
    }
}

/// Builds the wire `publicSignals` array from the circuit's one public
/// input (the root).
pub fn public_signals_for_root(root: Fr) -> Vec<String> {
    vec![fr_to_decimal(&root)]
}
