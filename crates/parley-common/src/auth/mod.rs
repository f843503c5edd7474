//! Authentication utilities

mod jwt;
mod password;
mod verifier;

pub use jwt::{Claims, IssuedToken, JwtService};
pub use password::{hash_password, verify_password, PasswordService};
pub use verifier::{CredentialVerifier, VerificationError};
