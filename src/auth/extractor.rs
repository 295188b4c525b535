// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token extraction from request headers.

use axum::http::{header::AUTHORIZATION, HeaderMap};

use super::AuthError;

/// Read the raw bearer token out of the `Authorization` header.
///
/// The header must be exactly `<scheme> <token>` with a case-insensitive
/// `bearer` scheme. The token is returned as-is; nothing here decodes it.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::HeaderMissing)?
        .to_str()
        .map_err(|_| AuthError::HeaderMalformed("Authorization header must be bearer token."))?;

    let parts: Vec<&str> = value.split(' ').collect();
    let [scheme, token] = parts.as_slice() else {
        return Err(AuthError::HeaderMalformed(
            "Authorization header must be bearer token.",
        ));
    };

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::HeaderMalformed(
            "Authorization header must start with \"Bearer\".",
        ));
    }
    if token.is_empty() {
        return Err(AuthError::HeaderMalformed("Token not found."));
    }

    Ok(*token)
}
