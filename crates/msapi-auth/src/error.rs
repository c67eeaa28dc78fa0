//! Error types for token issuance and verification.

use jsonwebtoken::Algorithm;

/// Errors that can occur while signing or checking a token.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The claims could not be serialized or signed.
    #[error("failed to sign token: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),

    /// The token was signed with an algorithm outside the HMAC family.
    #[error("unexpected signing method: {0:?}")]
    UnexpectedAlgorithm(Algorithm),

    /// The token is malformed, its signature does not match, or its claims
    /// do not decode into the requested type.
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}
