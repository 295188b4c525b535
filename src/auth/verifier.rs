// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! RS256 token verification against the provider's JWKS.

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};

use super::jwks::{KeyCache, RS256};
use super::{AuthError, ClaimSet};
use crate::config::AuthSettings;

/// Claims every accepted token must carry.
const REQUIRED_CLAIMS: [&str; 4] = ["exp", "iss", "aud", "sub"];

/// The unverified token header, used only to pick a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenHeader {
    pub algorithm: String,
    pub key_id: String,
}

/// Decode the header segment without checking the signature.
pub fn decode_token_header(token: &str) -> Result<TokenHeader, AuthError> {
    let header = decode_header(token)
        .map_err(|_| AuthError::HeaderMalformed("Unable to parse authentication token."))?;

    if header.alg != Algorithm::RS256 {
        return Err(AuthError::UnsupportedAlgorithm(format!("{:?}", header.alg)));
    }

    let key_id = header
        .kid
        .ok_or(AuthError::HeaderMalformed("Authorization malformed."))?;

    Ok(TokenHeader {
        algorithm: RS256.to_string(),
        key_id,
    })
}

/// Verifies bearer tokens and yields their claim set.
///
/// Cheap to clone; clones share one [`KeyCache`].
#[derive(Clone)]
pub struct TokenVerifier {
    keys: Arc<KeyCache>,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(keys: Arc<KeyCache>, settings: &AuthSettings) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&settings.issuer]);
        validation.set_audience(&[&settings.audience]);
        validation.set_required_spec_claims(&REQUIRED_CLAIMS);
        validation.leeway = settings.leeway_secs;
        // `exp` equal to now is already expired
        validation.reject_tokens_expiring_in_less_than = 1;

        Self { keys, validation }
    }

    pub fn key_cache(&self) -> &Arc<KeyCache> {
        &self.keys
    }

    /// Verify `token` and return its claims.
    ///
    /// Header problems, unsupported algorithms and unknown keys are rejected
    /// before any signature work. The signature is checked before any claim,
    /// and expiry is checked before issuer and audience.
    pub async fn verify(&self, token: &str) -> Result<ClaimSet, AuthError> {
        let header = decode_token_header(token)?;

        let signing_key = self
            .keys
            .get(&header.key_id)
            .await?
            .ok_or(AuthError::UnknownSigningKey)?;

        let decoding_key = signing_key.decoding_key().map_err(|e| {
            tracing::warn!(kid = %signing_key.key_id, error = %e, "published key is unusable");
            AuthError::UnknownSigningKey
        })?;

        let data = decode::<ClaimSet>(token, &decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => AuthError::SignatureMismatch,
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::ClaimMismatch,
            }
        })?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        flip_signature_bit, mint_hs256, JwksServer, TestClaims, TestKey, AUDIENCE, ISSUER,
    };

    async fn verifier_for(server: &JwksServer) -> TokenVerifier {
        TokenVerifier::new(Arc::new(server.key_cache()), &server.settings())
    }

    #[tokio::test]
    async fn valid_token_yields_claims() {
        let key = TestKey::shared();
        let server = JwksServer::start(key.jwks("kid-1")).await;
        let verifier = verifier_for(&server).await;

        let token = key.mint("kid-1", &TestClaims::valid(&["get:drinks-detail"]));
        let claims = verifier.verify(&token).await.unwrap();

        assert_eq!(claims.iss, ISSUER);
        assert!(claims.aud.contains(AUDIENCE));
        assert_eq!(claims.sub, "auth0|barista");
        assert_eq!(claims.permissions, Some(vec!["get:drinks-detail".to_string()]));
    }

    #[tokio::test]
    async fn verification_is_idempotent() {
        let key = TestKey::shared();
        let server = JwksServer::start(key.jwks("kid-1")).await;
        let verifier = verifier_for(&server).await;
        let token = key.mint("kid-1", &TestClaims::valid(&["post:drinks"]));

        let first = verifier.verify(&token).await.unwrap();
        let second = verifier.verify(&token).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(server.fetch_count(), 1);
    }

    #[tokio::test]
    async fn malformed_token_is_invalid_header() {
        let key = TestKey::shared();
        let server = JwksServer::start(key.jwks("kid-1")).await;
        let verifier = verifier_for(&server).await;

        for token in ["not-a-jwt", "a.b", "%%%.e30.sig", ""] {
            let err = verifier.verify(token).await.unwrap_err();
            assert!(matches!(err, AuthError::HeaderMalformed(_)), "{token:?} gave {err:?}");
        }
        assert_eq!(server.fetch_count(), 0);
    }

    #[tokio::test]
    async fn symmetric_algorithm_is_rejected_without_fetch() {
        let key = TestKey::shared();
        let server = JwksServer::start(key.jwks("kid-1")).await;
        let verifier = verifier_for(&server).await;

        let token = mint_hs256("kid-1", &TestClaims::valid(&["delete:drinks"]));
        let err = verifier.verify(&token).await.unwrap_err();

        assert_eq!(err, AuthError::UnsupportedAlgorithm("HS256".to_string()));
        assert_eq!(err.error_code(), "invalid_header");
        assert_eq!(server.fetch_count(), 0);
    }

    #[tokio::test]
    async fn missing_kid_is_malformed() {
        let key = TestKey::shared();
        let server = JwksServer::start(key.jwks("kid-1")).await;
        let verifier = verifier_for(&server).await;

        let token = key.mint_without_kid(&TestClaims::valid(&["get:drinks-detail"]));
        let err = verifier.verify(&token).await.unwrap_err();
        assert_eq!(err, AuthError::HeaderMalformed("Authorization malformed."));
    }

    #[tokio::test]
    async fn key_absent_from_jwks_is_unknown_not_mismatch() {
        let published = TestKey::shared();
        let rogue = TestKey::other();
        let server = JwksServer::start(published.jwks("kid-1")).await;
        let verifier = verifier_for(&server).await;

        let token = rogue.mint("kid-rogue", &TestClaims::valid(&["delete:drinks"]));
        let err = verifier.verify(&token).await.unwrap_err();

        assert_eq!(err, AuthError::UnknownSigningKey);
        assert_eq!(server.fetch_count(), 1);
    }

    #[tokio::test]
    async fn tampered_signature_is_mismatch() {
        let key = TestKey::shared();
        let server = JwksServer::start(key.jwks("kid-1")).await;
        let verifier = verifier_for(&server).await;

        let token = key.mint("kid-1", &TestClaims::valid(&["get:drinks-detail"]));
        let tampered = flip_signature_bit(&token);

        let err = verifier.verify(&tampered).await.unwrap_err();
        assert_eq!(err, AuthError::SignatureMismatch);
    }

    #[tokio::test]
    async fn wrong_key_under_published_kid_is_mismatch() {
        let published = TestKey::shared();
        let rogue = TestKey::other();
        let server = JwksServer::start(published.jwks("kid-1")).await;
        let verifier = verifier_for(&server).await;

        let token = rogue.mint("kid-1", &TestClaims::valid(&["get:drinks-detail"]));
        let err = verifier.verify(&token).await.unwrap_err();
        assert_eq!(err, AuthError::SignatureMismatch);
    }

    #[tokio::test]
    async fn expired_token_is_rejected_even_with_bad_claims() {
        let key = TestKey::shared();
        let server = JwksServer::start(key.jwks("kid-1")).await;
        let verifier = verifier_for(&server).await;

        let expired = key.mint("kid-1", &TestClaims::valid(&["get:drinks-detail"]).expired());
        assert_eq!(verifier.verify(&expired).await.unwrap_err(), AuthError::TokenExpired);

        let mut wrong_issuer = TestClaims::valid(&["get:drinks-detail"]).expired();
        wrong_issuer.iss = "https://evil.example.com/".to_string();
        let token = key.mint("kid-1", &wrong_issuer);
        assert_eq!(verifier.verify(&token).await.unwrap_err(), AuthError::TokenExpired);
    }

    #[tokio::test]
    async fn token_expiring_now_is_expired() {
        let key = TestKey::shared();
        let server = JwksServer::start(key.jwks("kid-1")).await;
        let verifier = verifier_for(&server).await;

        let mut claims = TestClaims::valid(&["get:drinks-detail"]);
        claims.exp = chrono::Utc::now().timestamp();
        let token = key.mint("kid-1", &claims);
        assert_eq!(verifier.verify(&token).await.unwrap_err(), AuthError::TokenExpired);

        claims.exp = chrono::Utc::now().timestamp() + 60;
        let token = key.mint("kid-1", &claims);
        assert!(verifier.verify(&token).await.is_ok());
    }

    #[tokio::test]
    async fn issuer_and_audience_must_match() {
        let key = TestKey::shared();
        let server = JwksServer::start(key.jwks("kid-1")).await;
        let verifier = verifier_for(&server).await;

        let mut wrong_issuer = TestClaims::valid(&["get:drinks-detail"]);
        wrong_issuer.iss = "https://evil.example.com/".to_string();
        let token = key.mint("kid-1", &wrong_issuer);
        assert_eq!(verifier.verify(&token).await.unwrap_err(), AuthError::ClaimMismatch);

        let mut wrong_audience = TestClaims::valid(&["get:drinks-detail"]);
        wrong_audience.aud = serde_json::json!("tea");
        let token = key.mint("kid-1", &wrong_audience);
        assert_eq!(verifier.verify(&token).await.unwrap_err(), AuthError::ClaimMismatch);
    }

    #[tokio::test]
    async fn audience_list_containing_expected_passes() {
        let key = TestKey::shared();
        let server = JwksServer::start(key.jwks("kid-1")).await;
        let verifier = verifier_for(&server).await;

        let mut claims = TestClaims::valid(&["get:drinks-detail"]);
        claims.aud = serde_json::json!([AUDIENCE, "https://tenant.example.com/userinfo"]);
        let token = key.mint("kid-1", &claims);
        assert!(verifier.verify(&token).await.is_ok());
    }

    #[tokio::test]
    async fn missing_subject_is_invalid_claims() {
        let key = TestKey::shared();
        let server = JwksServer::start(key.jwks("kid-1")).await;
        let verifier = verifier_for(&server).await;

        let mut payload = serde_json::to_value(TestClaims::valid(&[])).unwrap();
        payload.as_object_mut().unwrap().remove("sub");
        let token = key.mint("kid-1", &payload);
        assert_eq!(verifier.verify(&token).await.unwrap_err(), AuthError::ClaimMismatch);
    }

    #[tokio::test]
    async fn jwks_outage_is_server_fault() {
        let key = TestKey::shared();
        let server = JwksServer::start_failing().await;
        let verifier = verifier_for(&server).await;

        let token = key.mint("kid-1", &TestClaims::valid(&["get:drinks-detail"]));
        let err = verifier.verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::KeyFetchFailed(_)));
        assert!(err.is_server_fault());
    }
}
