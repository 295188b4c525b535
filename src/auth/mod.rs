// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authorization Module
//!
//! Bearer token verification and RBAC for the drinks API.
//!
//! ## Request Flow
//!
//! 1. The client authenticates with the identity provider (Auth0)
//! 2. The client sends `Authorization: Bearer <JWT>`
//! 3. The route's [`AuthGuard`]:
//!    - extracts the token ([`extractor`])
//!    - verifies the RS256 signature against the provider's JWKS ([`jwks`],
//!      [`verifier`]), then expiry, issuer and audience
//!    - checks the route's required permission ([`permissions`])
//! 4. The handler receives the verified [`ClaimSet`]
//!
//! ## Security
//!
//! - Only RS256 is accepted; symmetric algorithms are rejected up front
//! - JWKS is fetched on a key-id miss only, and replaced wholesale
//! - There is no fail-open path: any error denies the request

pub mod claims;
pub mod error;
pub mod extractor;
pub mod jwks;
pub mod middleware;
pub mod permissions;
pub mod verifier;

pub use claims::{Audience, ClaimSet};
pub use error::AuthError;
pub use extractor::extract_bearer_token;
pub use jwks::{KeyCache, KeySet, SigningKey};
pub use middleware::{enforce, require_permission, AuthGuard};
pub use permissions::check_permission;
pub use verifier::{TokenHeader, TokenVerifier};
