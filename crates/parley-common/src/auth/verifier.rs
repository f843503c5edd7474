//! Credential verification seam used by the WebSocket handshake and REST extractor

use parley_core::UserId;

/// Why a presented credential was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    #[error("credential is malformed")]
    Malformed,

    #[error("credential has expired")]
    Expired,

    #[error("credential signature is invalid")]
    SignatureInvalid,
}

impl VerificationError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Malformed => "CREDENTIAL_MALFORMED",
            Self::Expired => "CREDENTIAL_EXPIRED",
            Self::SignatureInvalid => "CREDENTIAL_INVALID",
        }
    }
}

/// Maps an opaque credential to the user it was issued for
///
/// Implementations are pure: no I/O, no shared mutable state.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, credential: &str) -> Result<UserId, VerificationError>;
}

/// Strip an optional `Bearer ` scheme prefix (case-insensitive)
pub(crate) fn strip_bearer(credential: &str) -> &str {
    let trimmed = credential.trim();
    match trimmed.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("bearer ") => trimmed[7..].trim_start(),
        _ => trimmed,
    }
}
