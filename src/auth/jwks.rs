// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! ## Refresh Policy
//!
//! - The cache starts empty and is filled on the first lookup miss
//! - A miss (unknown `kid`) triggers exactly one fetch, then one more lookup
//! - Each fetch replaces the whole key set; there is no TTL
//! - Concurrent misses may each fetch; the last write wins
//!
//! Only RSA signing keys usable for RS256 are kept.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet, KeyAlgorithm, PublicKeyUse};
use jsonwebtoken::DecodingKey;
use tokio::sync::RwLock;

use super::error::AuthError;

/// Default timeout for the JWKS HTTP request.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// The only signing algorithm this service accepts.
pub const RS256: &str = "RS256";

/// One RSA public key published by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningKey {
    pub key_id: String,
    pub algorithm: String,
    /// Base64url encoded modulus (`n`)
    pub modulus: String,
    /// Base64url encoded public exponent (`e`)
    pub exponent: String,
}

impl SigningKey {
    /// Build the verification key from the published components.
    pub fn decoding_key(&self) -> Result<DecodingKey, jsonwebtoken::errors::Error> {
        DecodingKey::from_rsa_components(&self.modulus, &self.exponent)
    }
}

/// Key id to key mapping, always replaced as a whole.
pub type KeySet = HashMap<String, SigningKey>;

/// Convert one published JWK into a [`SigningKey`].
///
/// Keys without a `kid`, non-RSA keys, keys marked for anything but signing
/// and keys pinned to another algorithm are skipped.
fn signing_key_from_jwk(jwk: Jwk) -> Option<SigningKey> {
    let AlgorithmParameters::RSA(rsa) = jwk.algorithm else {
        return None;
    };
    if jwk
        .common
        .public_key_use
        .as_ref()
        .is_some_and(|u| *u != PublicKeyUse::Signature)
    {
        return None;
    }
    if jwk
        .common
        .key_algorithm
        .is_some_and(|a| a != KeyAlgorithm::RS256)
    {
        return None;
    }
    Some(SigningKey {
        key_id: jwk.common.key_id?,
        algorithm: RS256.to_string(),
        modulus: rsa.n,
        exponent: rsa.e,
    })
}

/// Parse a JWKS document body into a key set.
pub fn parse_key_set(body: &[u8]) -> Result<KeySet, AuthError> {
    let jwks: JwkSet = serde_json::from_slice(body)
        .map_err(|e| AuthError::KeyFetchFailed(format!("invalid JWKS document: {e}")))?;

    Ok(jwks
        .keys
        .into_iter()
        .filter_map(signing_key_from_jwk)
        .map(|key| (key.key_id.clone(), key))
        .collect())
}

struct CacheEntry {
    keys: Arc<KeySet>,
    fetched_at: DateTime<Utc>,
}

/// Lazily populated cache of the provider's signing keys.
///
/// Readers take a cheap `Arc` snapshot of the current key set, so they never
/// observe a half-written map.
pub struct KeyCache {
    /// JWKS endpoint URL
    jwks_url: String,
    cache: RwLock<Option<CacheEntry>>,
    client: reqwest::Client,
}

impl KeyCache {
    /// Create a cache for `jwks_url` with a bounded request timeout.
    pub fn new(jwks_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(jwks_url, client))
    }

    /// Create a cache that uses an existing HTTP client.
    pub fn with_client(jwks_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            jwks_url: jwks_url.into(),
            cache: RwLock::new(None),
            client,
        }
    }

    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Look up `key_id`, refreshing the key set once on a miss.
    ///
    /// `Ok(None)` means the provider does not publish that key.
    pub async fn get(&self, key_id: &str) -> Result<Option<SigningKey>, AuthError> {
        if let Some(key) = self.snapshot().await.and_then(|keys| keys.get(key_id).cloned()) {
            return Ok(Some(key));
        }

        tracing::debug!(kid = %key_id, "signing key not cached, refreshing JWKS");
        let keys = self.refresh().await?;
        Ok(keys.get(key_id).cloned())
    }

    /// Fetch the JWKS document and swap it in, returning the new key set.
    pub async fn refresh(&self) -> Result<Arc<KeySet>, AuthError> {
        let keys = Arc::new(self.fetch().await?);

        let mut cache = self.cache.write().await;
        *cache = Some(CacheEntry {
            keys: Arc::clone(&keys),
            fetched_at: Utc::now(),
        });

        tracing::info!(url = %self.jwks_url, key_count = keys.len(), "JWKS refreshed");
        Ok(keys)
    }

    /// Whether at least one fetch has succeeded.
    pub async fn is_populated(&self) -> bool {
        self.cache.read().await.is_some()
    }

    /// Time of the last successful fetch.
    pub async fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.cache.read().await.as_ref().map(|entry| entry.fetched_at)
    }

    async fn snapshot(&self) -> Option<Arc<KeySet>> {
        self.cache
            .read()
            .await
            .as_ref()
            .map(|entry| Arc::clone(&entry.keys))
    }

    async fn fetch(&self) -> Result<KeySet, AuthError> {
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| fetch_failed(&self.jwks_url, e.to_string()))?;

        if !response.status().is_success() {
            return Err(fetch_failed(
                &self.jwks_url,
                format!("HTTP {} from JWKS endpoint", response.status()),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| fetch_failed(&self.jwks_url, e.to_string()))?;

        parse_key_set(&body).inspect_err(|e| {
            tracing::warn!(url = %self.jwks_url, error = %e, "JWKS document rejected");
        })
    }
}

fn fetch_failed(url: &str, reason: String) -> AuthError {
    tracing::warn!(url = %url, error = %reason, "JWKS fetch failed");
    AuthError::KeyFetchFailed(reason)
}
