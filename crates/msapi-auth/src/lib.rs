//! Signed bearer tokens for msapi services.
//!
//! Wraps HMAC-signed JWTs (`jsonwebtoken`) around caller-defined claims.
//! The claim payload is any serde type; this crate never interprets it.
//! Expiry, not-before and audience are left to the caller to check against
//! the decoded claims.

mod error;
mod token;

pub use error::TokenError;
pub use token::{default_secret, TokenService, VerifiedToken, DEFAULT_SECRET, SECRET_ENV_VAR};

#[cfg(test)]
mod tests;
