//! Unit tests for token issuance and verification.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::TokenError;
use crate::token::{TokenService, DEFAULT_SECRET};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SessionClaims {
    sub: String,
    role: String,
    exp: u64,
}

fn claims() -> SessionClaims {
    SessionClaims {
        sub: "user-42".to_string(),
        role: "admin".to_string(),
        exp: 4_102_444_800,
    }
}

/// Assembles a compact token with an arbitrary header and signature.
fn forge(header: serde_json::Value, claims: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(header.to_string());
    let claims = URL_SAFE_NO_PAD.encode(claims.to_string());
    let signature = URL_SAFE_NO_PAD.encode(b"not-a-real-signature");
    format!("{header}.{claims}.{signature}")
}

// ── issue / decode_claims ────────────────────────────────────────────

#[test]
fn issued_claims_round_trip() {
    let service = TokenService::new("s3cret");
    let token = service.issue(&claims()).expect("issue should succeed");

    let decoded: SessionClaims = service.decode_claims(&token).expect("decode should succeed");
    assert_eq!(decoded, claims());
}

#[test]
fn issued_tokens_use_hs256() {
    let service = TokenService::new("s3cret");
    let token = service.issue(&claims()).expect("issue should succeed");

    let header = jsonwebtoken::decode_header(&token).expect("header should parse");
    assert_eq!(header.alg, Algorithm::HS256);
}

#[test]
fn different_secret_is_rejected() {
    let token = TokenService::new("s3cret")
        .issue(&claims())
        .expect("issue should succeed");

    let err = TokenService::new("other")
        .decode_claims::<SessionClaims>(&token)
        .expect_err("wrong secret should fail");
    assert!(matches!(err, TokenError::Invalid(_)), "got {err:?}");
}

#[test]
fn malformed_token_is_rejected() {
    let service = TokenService::new("s3cret");
    let err = service
        .decode_claims::<SessionClaims>("not.a.token")
        .expect_err("garbage should fail");
    assert!(matches!(err, TokenError::Invalid(_)), "got {err:?}");
}

#[test]
fn claims_of_the_wrong_shape_are_rejected() {
    let service = TokenService::new("s3cret");
    let token = service
        .issue(&json!({ "sub": "user-42" }))
        .expect("issue should succeed");

    let err = service
        .decode_claims::<SessionClaims>(&token)
        .expect_err("missing fields should fail");
    assert!(matches!(err, TokenError::Invalid(_)), "got {err:?}");
}

#[test]
fn expiry_is_left_to_the_caller() {
    let service = TokenService::new("s3cret");
    let expired = SessionClaims {
        exp: 1,
        ..claims()
    };
    let token = service.issue(&expired).expect("issue should succeed");

    let decoded: SessionClaims = service
        .decode_claims(&token)
        .expect("expired token should still decode");
    assert_eq!(decoded.exp, 1);
}

#[test]
fn claims_without_exp_are_accepted() {
    let service = TokenService::new("s3cret");
    let token = service
        .issue(&json!({ "sub": "user-42", "aud": "elsewhere" }))
        .expect("issue should succeed");

    let verified = service.verify(&token).expect("verify should succeed");
    assert_eq!(verified.claims["sub"], "user-42");
}

// ── algorithm guard ──────────────────────────────────────────────────

#[test]
fn other_hmac_algorithms_are_accepted() {
    let secret = "s3cret";
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::new(Algorithm::HS512),
        &claims(),
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("encode should succeed");

    let verified = TokenService::new(secret)
        .verify(&token)
        .expect("HS512 should verify");
    assert_eq!(verified.header.alg, Algorithm::HS512);
}

#[test]
fn non_hmac_algorithm_is_rejected() {
    let token = forge(json!({ "alg": "RS256", "typ": "JWT" }), json!({ "sub": "user-42" }));

    let err = TokenService::new("s3cret")
        .verify(&token)
        .expect_err("RS256 should be rejected");
    assert!(
        matches!(err, TokenError::UnexpectedAlgorithm(Algorithm::RS256)),
        "got {err:?}"
    );

    let err = TokenService::new("s3cret")
        .decode_claims::<serde_json::Value>(&token)
        .expect_err("RS256 should be rejected");
    assert!(matches!(err, TokenError::UnexpectedAlgorithm(_)), "got {err:?}");
}

#[test]
fn unsigned_token_is_rejected() {
    let token = forge(json!({ "alg": "none" }), json!({ "sub": "user-42" }));

    let err = TokenService::new("s3cret")
        .verify(&token)
        .expect_err("alg none should be rejected");
    assert!(matches!(err, TokenError::Invalid(_)), "got {err:?}");
}

// ── verify ───────────────────────────────────────────────────────────

#[test]
fn verify_returns_raw_claims() {
    let service = TokenService::new("s3cret");
    let token = service.issue(&claims()).expect("issue should succeed");

    let verified = service.verify(&token).expect("verify should succeed");
    assert_eq!(verified.header.alg, Algorithm::HS256);
    assert_eq!(verified.claims["sub"], "user-42");
    assert_eq!(verified.claims["role"], "admin");
}

#[test]
fn debug_does_not_leak_secret() {
    let rendered = format!("{:?}", TokenService::new("hunter2"));
    assert!(!rendered.contains("hunter2"), "secret leaked: {rendered}");
}

#[test]
fn default_secret_falls_back_to_literal() {
    if std::env::var(crate::SECRET_ENV_VAR).is_err() {
        assert_eq!(crate::default_secret(), DEFAULT_SECRET);
    }
}
