// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::error::ErrorBody;

/// Failure raised anywhere in the bearer-token pipeline.
///
/// Each variant resolves to a fixed `(status_code, error_code, description)`
/// triple, so the boundary never needs to look at the token again. Several
/// variants share an `error_code` on the wire but stay distinct here so
/// callers and tests can tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No `Authorization` header on the request
    #[error("Authorization header is expected.")]
    HeaderMissing,
    /// Header or token structure is unusable
    #[error("{0}")]
    HeaderMalformed(&'static str),
    /// Token header names an algorithm other than RS256
    #[error("Unsupported token algorithm {0}; only RS256 is accepted.")]
    UnsupportedAlgorithm(String),
    /// `kid` is not in the provider's key set, even after a refresh
    #[error("Unable to find the appropriate key.")]
    UnknownSigningKey,
    /// RS256 signature does not match the resolved key
    #[error("Token signature is invalid.")]
    SignatureMismatch,
    /// `exp` is in the past
    #[error("Token expired.")]
    TokenExpired,
    /// Issuer or audience mismatch, or a claim set that cannot be decoded
    #[error("Incorrect claims. Please, check the audience and issuer.")]
    ClaimMismatch,
    /// Verified token carries no `permissions` claim at all
    #[error("Permissions not included in JWT.")]
    PermissionsAbsent,
    /// `permissions` is present but lacks the route's permission
    #[error("Permission not found.")]
    PermissionDenied,
    /// The JWKS document could not be fetched or parsed
    #[error("Unable to fetch signing keys: {0}")]
    KeyFetchFailed(String),
}

impl AuthError {
    /// Machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::HeaderMissing => "authorization_header_missing",
            AuthError::HeaderMalformed(_)
            | AuthError::UnsupportedAlgorithm(_)
            | AuthError::UnknownSigningKey => "invalid_header",
            AuthError::SignatureMismatch => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::ClaimMismatch | AuthError::PermissionsAbsent => "invalid_claims",
            AuthError::PermissionDenied => "unauthorized",
            AuthError::KeyFetchFailed(_) => "jwks_fetch_failed",
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::HeaderMissing
            | AuthError::HeaderMalformed(_)
            | AuthError::UnsupportedAlgorithm(_)
            | AuthError::UnknownSigningKey
            | AuthError::SignatureMismatch
            | AuthError::TokenExpired
            | AuthError::ClaimMismatch => StatusCode::UNAUTHORIZED,
            AuthError::PermissionsAbsent => StatusCode::BAD_REQUEST,
            AuthError::PermissionDenied => StatusCode::FORBIDDEN,
            AuthError::KeyFetchFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Human readable description sent back to the client.
    ///
    /// Key fetch failures keep their reason out of the response body; it is
    /// logged where the fetch fails.
    pub fn description(&self) -> String {
        match self {
            AuthError::KeyFetchFailed(_) => "Unable to fetch signing keys.".to_string(),
            other => other.to_string(),
        }
    }

    /// Whether the failure is an infrastructure fault rather than the client's.
    pub fn is_server_fault(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorBody::new(status, self.description()));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn missing_header_returns_401() {
        let response = AuthError::HeaderMissing.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], 401);
        assert_eq!(body["message"], "Authorization header is expected.");
    }

    #[tokio::test]
    async fn permission_denied_returns_403() {
        let response = AuthError::PermissionDenied.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn permissions_absent_is_distinct_from_denied() {
        assert_eq!(AuthError::PermissionsAbsent.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::PermissionsAbsent.error_code(), "invalid_claims");
        assert_eq!(AuthError::PermissionDenied.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::PermissionDenied.error_code(), "unauthorized");
    }

    #[test]
    fn key_fetch_reason_stays_out_of_description() {
        let err = AuthError::KeyFetchFailed("connect to 10.0.0.7 refused".into());
        assert_eq!(err.description(), "Unable to fetch signing keys.");
        assert!(err.to_string().contains("10.0.0.7"));
    }

    #[test]
    fn only_key_fetch_failure_is_a_server_fault() {
        assert!(AuthError::KeyFetchFailed("timeout".into()).is_server_fault());
        assert_eq!(
            AuthError::KeyFetchFailed("timeout".into()).error_code(),
            "jwks_fetch_failed"
        );
        for err in [
            AuthError::HeaderMissing,
            AuthError::HeaderMalformed("bad"),
            AuthError::UnsupportedAlgorithm("HS256".into()),
            AuthError::UnknownSigningKey,
            AuthError::SignatureMismatch,
            AuthError::TokenExpired,
            AuthError::ClaimMismatch,
            AuthError::PermissionsAbsent,
            AuthError::PermissionDenied,
        ] {
            assert!(!err.is_server_fault(), "{err:?} should be client attributable");
        }
    }

    #[test]
    fn header_family_shares_invalid_header_code() {
        assert_eq!(AuthError::HeaderMalformed("x").error_code(), "invalid_header");
        assert_eq!(AuthError::UnsupportedAlgorithm("HS256".into()).error_code(), "invalid_header");
        assert_eq!(AuthError::UnknownSigningKey.error_code(), "invalid_header");
        assert_ne!(AuthError::UnknownSigningKey, AuthError::SignatureMismatch);
    }
}
