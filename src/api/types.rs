//! Request/response shapes for [`crate::api::system::MembershipSystem`].
//!
//! These are the wire-facing analogues of the library's internal types:
//! a `CredentialSet` has a Merkle tree attached, but a `CreateSetResponse`
//! only carries what an external caller needs (id, root, size).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::credential_set::CredentialSetType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSetRequest {
    pub name: String,
    pub description: Option<String>,
    pub set_type: CredentialSetType,
    pub credentials: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSetResponse {
    pub set_id: Uuid,
    pub root: String,
    pub credential_count: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterTrustedRootRequest {
    pub set_id: Uuid,
    pub root: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateProofRequest {
    pub set_id: Uuid,
    pub credential: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateProofResponse {
    pub proof: crate::proof::Proof,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyProofRequest {
    pub proof: crate::proof::Proof,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyProofResponse {
    pub valid: bool,
    pub verified_at: DateTime<Utc>,
    pub credential_set_id: Option<Uuid>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl From<crate::verifier::VerificationOutcome> for VerifyProofResponse {
    fn from(o: crate::verifier::VerificationOutcome) -> Self {
        Self {
            valid: o.valid,
            verified_at: o.verified_at,
            credential_set_id: o.credential_set_id,
            errors: o.errors,
            warnings: o.warnings,
        }
    }
}
