// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-route authorization guard.
//!
//! A guard is bound to one required permission when the route is registered:
//!
//! ```rust,ignore
//! let guard = AuthGuard::new(verifier, "get:drinks-detail");
//! Router::new().route(
//!     "/drinks-detail",
//!     require_permission(guard, get(get_drinks_detail)),
//! );
//!
//! async fn get_drinks_detail(Extension(claims): Extension<ClaimSet>) { .. }
//! ```
//!
//! Every request is verified from scratch; outcomes are never cached.

use std::future::Future;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::{from_fn_with_state, Next},
    response::{IntoResponse, Response},
    routing::MethodRouter,
};

use super::extractor::extract_bearer_token;
use super::permissions::check_permission;
use super::{AuthError, ClaimSet, TokenVerifier};

/// Bearer token verification plus one required permission.
#[derive(Clone)]
pub struct AuthGuard {
    verifier: TokenVerifier,
    permission: &'static str,
}

impl AuthGuard {
    pub fn new(verifier: TokenVerifier, permission: &'static str) -> Self {
        Self {
            verifier,
            permission,
        }
    }

    pub fn permission(&self) -> &'static str {
        self.permission
    }

    /// Run extraction, verification and the permission check.
    pub async fn authorize(&self, headers: &HeaderMap) -> Result<ClaimSet, AuthError> {
        let result = self.run_pipeline(headers).await;
        match &result {
            Ok(claims) => {
                tracing::debug!(sub = %claims.sub, permission = self.permission, "request authorized");
            }
            Err(e) if e.is_server_fault() => {
                tracing::error!(code = e.error_code(), error = %e, permission = self.permission, "authorization unavailable");
            }
            Err(e) => {
                tracing::warn!(code = e.error_code(), permission = self.permission, "request rejected");
            }
        }
        result
    }

    async fn run_pipeline(&self, headers: &HeaderMap) -> Result<ClaimSet, AuthError> {
        let token = extract_bearer_token(headers)?;
        let claims = self.verifier.verify(token).await?;
        check_permission(&claims, self.permission)?;
        Ok(claims)
    }

    /// Authorize, then hand the claims to `handler` and return its output
    /// unchanged. The handler never runs on failure.
    pub async fn call<F, Fut, T>(&self, headers: &HeaderMap, handler: F) -> Result<T, AuthError>
    where
        F: FnOnce(ClaimSet) -> Fut,
        Fut: Future<Output = T>,
    {
        let claims = self.authorize(headers).await?;
        Ok(handler(claims).await)
    }
}

/// Axum middleware enforcing an [`AuthGuard`], for use with
/// `axum::middleware::from_fn_with_state`.
///
/// On success the [`ClaimSet`] is placed in the request extensions for the
/// handler to take as `Extension<ClaimSet>`.
pub async fn enforce(State(guard): State<AuthGuard>, mut request: Request, next: Next) -> Response {
    let authorized = guard.authorize(request.headers()).await;
    match authorized {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Put `route` behind `guard`.
///
/// Unauthorized requests never reach the handler; authorized ones carry the
/// [`ClaimSet`] as an extension.
pub fn require_permission<S>(guard: AuthGuard, route: MethodRouter<S>) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.route_layer(from_fn_with_state(guard, enforce))
}
