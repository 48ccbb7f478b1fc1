//! Error types for the credential-membership library.

/// The exhaustive error taxonomy surfaced by the credential-membership core.
///
/// Each variant corresponds to exactly one wire error code via [`CredentialError::kind`].
/// Messages are safe to return to callers and to log; none of them leak which
/// verification stage failed beyond the variant itself, and none enumerate set
/// contents.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// A credential failed structural validation (empty, too long, not a member).
    #[error("Invalid credential")]
    InvalidCredential,

    /// Generic "credential not in set" response. Deliberately worded the same
    /// as `InvalidCredential` so a caller cannot distinguish "wrong credential"
    /// from "credential not a member" by message text.
    #[error("Invalid credential")]
    CredentialNotFound,

    /// The referenced credential set does not exist.
    #[error("Credential set not found: {set_id}")]
    CredentialSetNotFound { set_id: String },

    /// A credential appeared more than once in a `create` request.
    #[error("Duplicate credential: {credential}")]
    DuplicateCredential { credential: String },

    /// A `create` request exceeded `max_credentials_per_set`.
    #[error("Credential limit exceeded: {got} exceeds limit of {max}")]
    CredentialLimitExceeded { got: usize, max: usize },

    /// Proof generation failed (circuit synthesis, self-check mismatch, timeout).
    #[error("Proof generation failed: {reason}")]
    ProofGenerationFailed { reason: String },

    /// The Groth16 argument did not verify.
    #[error("Proof verification failed")]
    ProofVerificationFailed,

    /// The proof's `expiresAt` has passed.
    #[error("Proof expired")]
    ProofExpired,

    /// The proof's wire structure is missing fields or has the wrong shape/types.
    #[error("Invalid proof structure: {reason}")]
    InvalidProofStructure { reason: String },

    /// No circuit is registered under the requested circuit id.
    #[error("Circuit not found: {circuit_id}")]
    CircuitNotFound { circuit_id: String },

    /// Proving/verifying key artifacts could not be loaded.
    #[error("Circuit initialization failed: {reason}")]
    CircuitInitializationFailed { reason: String },

    /// The verifying key artifact specifically is missing or malformed.
    #[error("Verification key not found: {reason}")]
    VerificationKeyNotFound { reason: String },

    /// The proof's `(credentialSetId, root)` is not in the trusted-root registry.
    #[error("Untrusted root")]
    UntrustedRoot,

    /// A supplied root string is not 64 lowercase hex characters.
    #[error("Invalid root format: {root}")]
    InvalidRootFormat { root: String },

    /// Generic field-level validation failure, not covered by a more specific variant.
    #[error("Validation error: {reason}")]
    ValidationError { reason: String },

    /// An internal invariant was violated. Never constructed from caller input;
    /// the detail string is for logs only and is not derived from it either.
    #[error("Internal error")]
    Internal,
}

impl CredentialError {
    /// The wire error code, exactly as enumerated in the external interface.
    pub fn kind(&self) -> &'static str {
        match self {
            CredentialError::InvalidCredential => "INVALID_CREDENTIAL",
            CredentialError::CredentialNotFound => "CREDENTIAL_NOT_FOUND",
            CredentialError::CredentialSetNotFound { .. } => "CREDENTIAL_SET_NOT_FOUND",
            CredentialError::DuplicateCredential { .. } => "DUPLICATE_CREDENTIAL",
            CredentialError::CredentialLimitExceeded { .. } => "CREDENTIAL_LIMIT_EXCEEDED",
            CredentialError::ProofGenerationFailed { .. } => "PROOF_GENERATION_FAILED",
            CredentialError::ProofVerificationFailed => "PROOF_VERIFICATION_FAILED",
            CredentialError::ProofExpired => "PROOF_EXPIRED",
            CredentialError::InvalidProofStructure { .. } => "INVALID_PROOF_STRUCTURE",
            CredentialError::CircuitNotFound { .. } => "CIRCUIT_NOT_FOUND",
            CredentialError::CircuitInitializationFailed { .. } => "CIRCUIT_INITIALIZATION_FAILED",
            CredentialError::VerificationKeyNotFound { .. } => "VERIFICATION_KEY_NOT_FOUND",
            CredentialError::UntrustedRoot => "UNTRUSTED_ROOT",
            CredentialError::InvalidRootFormat { .. } => "INVALID_ROOT_FORMAT",
            CredentialError::ValidationError { .. } => "VALIDATION_ERROR",
            CredentialError::Internal => "INTERNAL_ERROR",
        }
    }
}

/// Convenience Result type for credential-membership operations.
pub type Result<T> = std::result::Result<T, CredentialError>;
