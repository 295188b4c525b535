// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Test fixtures: an RSA identity provider stand-in and token minting.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::RwLock;

use crate::auth::KeyCache;
use crate::config::AuthSettings;

pub const ISSUER: &str = "https://coffee-shop.test.auth0.com/";
pub const AUDIENCE: &str = "coffee";

/// RSA key pair acting as the identity provider's signing key.
pub struct TestKey {
    encoding: EncodingKey,
    modulus: String,
    exponent: String,
}

impl TestKey {
    fn generate() -> Self {
        let private = RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("rsa key");
        let public = RsaPublicKey::from(&private);
        let pem = private.to_pkcs1_pem(Default::default()).expect("pem");
        Self {
            encoding: EncodingKey::from_rsa_pem(pem.as_bytes()).expect("encoding key"),
            modulus: URL_SAFE_NO_PAD.encode(public.n().to_bytes_be()),
            exponent: URL_SAFE_NO_PAD.encode(public.e().to_bytes_be()),
        }
    }

    /// Key published by the test provider. Generated once per test binary.
    pub fn shared() -> &'static TestKey {
        static KEY: OnceLock<TestKey> = OnceLock::new();
        KEY.get_or_init(TestKey::generate)
    }

    /// A second key the provider never publishes.
    pub fn other() -> &'static TestKey {
        static KEY: OnceLock<TestKey> = OnceLock::new();
        KEY.get_or_init(TestKey::generate)
    }

    /// JWKS document publishing this key under `kid`.
    pub fn jwks(&self, kid: &str) -> Value {
        json!({
            "keys": [{
                "kty": "RSA",
                "kid": kid,
                "alg": "RS256",
                "use": "sig",
                "n": self.modulus,
                "e": self.exponent,
                "x5t": "ignored"
            }]
        })
    }

    pub fn mint(&self, kid: &str, claims: &impl Serialize) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(kid.to_string());
        jsonwebtoken::encode(&header, claims, &self.encoding).expect("token")
    }

    pub fn mint_without_kid(&self, claims: &impl Serialize) -> String {
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), claims, &self.encoding)
            .expect("token")
    }
}

/// HS256 token signed with a client-chosen secret.
pub fn mint_hs256(kid: &str, claims: &impl Serialize) -> String {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(kid.to_string());
    jsonwebtoken::encode(&header, claims, &EncodingKey::from_secret(b"attacker-secret"))
        .expect("token")
}

/// Flip the lowest bit of the last signature byte.
pub fn flip_signature_bit(token: &str) -> String {
    let (signed, signature) = token.rsplit_once('.').expect("three segments");
    let mut bytes = URL_SAFE_NO_PAD.decode(signature).expect("signature");
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    format!("{signed}.{}", URL_SAFE_NO_PAD.encode(bytes))
}

#[derive(Debug, Clone, Serialize)]
pub struct TestClaims {
    pub iss: String,
    pub sub: String,
    pub aud: Value,
    pub iat: i64,
    pub exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
}

impl TestClaims {
    pub fn valid(permissions: &[&str]) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            iss: ISSUER.to_string(),
            sub: "auth0|barista".to_string(),
            aud: json!(AUDIENCE),
            iat: now,
            exp: now + 300,
            permissions: Some(permissions.iter().map(|p| p.to_string()).collect()),
        }
    }

    pub fn expired(mut self) -> Self {
        let now = chrono::Utc::now().timestamp();
        self.iat = now - 7200;
        self.exp = now - 3600;
        self
    }

    pub fn without_permissions(mut self) -> Self {
        self.permissions = None;
        self
    }
}

struct ProviderState {
    jwks: RwLock<Value>,
    fetches: AtomicUsize,
    failing: bool,
}

/// Local HTTP server publishing a JWKS document and counting fetches.
pub struct JwksServer {
    addr: SocketAddr,
    state: Arc<ProviderState>,
    _handle: tokio::task::JoinHandle<()>,
}

impl JwksServer {
    pub async fn start(jwks: Value) -> Self {
        Self::spawn(jwks, false).await
    }

    /// Server that answers every request with a 503.
    pub async fn start_failing() -> Self {
        Self::spawn(json!({ "keys": [] }), true).await
    }

    async fn spawn(jwks: Value, failing: bool) -> Self {
        let state = Arc::new(ProviderState {
            jwks: RwLock::new(jwks),
            fetches: AtomicUsize::new(0),
            failing,
        });
        let app = Router::new()
            .route("/.well-known/jwks.json", get(serve_jwks))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app.into_make_service()).await;
        });

        Self {
            addr,
            state,
            _handle: handle,
        }
    }

    pub fn jwks_url(&self) -> String {
        format!("http://{}/.well-known/jwks.json", self.addr)
    }

    /// Replace the published document (key rotation).
    pub async fn publish(&self, jwks: Value) {
        *self.state.jwks.write().await = jwks;
    }

    pub fn fetch_count(&self) -> usize {
        self.state.fetches.load(Ordering::SeqCst)
    }

    pub fn key_cache(&self) -> KeyCache {
        KeyCache::new(self.jwks_url(), Duration::from_secs(5)).expect("http client")
    }

    pub fn settings(&self) -> AuthSettings {
        AuthSettings {
            jwks_url: self.jwks_url(),
            issuer: ISSUER.to_string(),
            audience: AUDIENCE.to_string(),
            leeway_secs: 0,
            fetch_timeout: Duration::from_secs(5),
        }
    }
}

async fn serve_jwks(State(state): State<Arc<ProviderState>>) -> Result<Json<Value>, StatusCode> {
    state.fetches.fetch_add(1, Ordering::SeqCst);
    if state.failing {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    Ok(Json(state.jwks.read().await.clone()))
}
