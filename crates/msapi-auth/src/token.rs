use std::fmt;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::TokenError;

/// Environment variable holding the process-wide signing secret.
pub const SECRET_ENV_VAR: &str = "jwt-secretKey";

/// Secret used when [`SECRET_ENV_VAR`] is unset.
pub const DEFAULT_SECRET: &str = "jwt-secretKey";

/// Algorithm used to sign new tokens.
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Algorithms accepted on verification.
const HMAC_FAMILY: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Reads the signing secret from [`SECRET_ENV_VAR`], falling back to
/// [`DEFAULT_SECRET`].
pub fn default_secret() -> String {
    match std::env::var(SECRET_ENV_VAR) {
        Ok(secret) if !secret.is_empty() => secret,
        _ => DEFAULT_SECRET.to_string(),
    }
}

/// A token whose signature and algorithm have been checked.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub header: Header,
    pub claims: Map<String, Value>,
}

/// Issues and verifies HMAC-signed tokens with one shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"[REDACTED]")
            .field("algorithms", &self.validation.algorithms)
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.algorithms = HMAC_FAMILY.to_vec();
        // Claim semantics belong to the caller.
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Builds a service from [`default_secret`]. The secret is read once.
    pub fn from_env() -> Self {
        Self::new(default_secret())
    }

    /// Signs `claims` into a compact token.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Sign`] if the claims cannot be serialized or
    /// signed.
    pub fn issue<C: Serialize>(&self, claims: &C) -> Result<String, TokenError> {
        let token = jsonwebtoken::encode(&Header::new(SIGNING_ALGORITHM), claims, &self.encoding_key)
            .map_err(TokenError::Sign)?;
        tracing::debug!("issued token");
        Ok(token)
    }

    /// Verifies `token` and decodes its claims into `C`.
    ///
    /// # Errors
    ///
    /// [`TokenError::UnexpectedAlgorithm`] if the token is not HMAC-signed,
    /// otherwise [`TokenError::Invalid`] for malformed tokens, signature
    /// mismatches and claims that do not fit `C`.
    pub fn decode_claims<C: DeserializeOwned>(&self, token: &str) -> Result<C, TokenError> {
        self.decode::<C>(token).map(|data| data.claims)
    }

    /// Verifies the signature and algorithm of `token` without interpreting
    /// its claims.
    ///
    /// # Errors
    ///
    /// Same as [`decode_claims`](Self::decode_claims).
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        let TokenData { header, claims } = self.decode::<Map<String, Value>>(token)?;
        Ok(VerifiedToken { header, claims })
    }

    fn decode<C: DeserializeOwned>(&self, token: &str) -> Result<TokenData<C>, TokenError> {
        jsonwebtoken::decode::<C>(token, &self.decoding_key, &self.validation).map_err(|err| {
            tracing::debug!(error = %err, "token rejected");
            if !matches!(err.kind(), ErrorKind::InvalidAlgorithm) {
                return TokenError::Invalid(err);
            }
            match jsonwebtoken::decode_header(token) {
                Ok(header) => TokenError::UnexpectedAlgorithm(header.alg),
                Err(_) => TokenError::Invalid(err),
            }
        })
    }
}
