// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Route permissions and the RBAC membership check.

use super::{AuthError, ClaimSet};

/// `GET /drinks-detail`
pub const GET_DRINKS_DETAIL: &str = "get:drinks-detail";
/// `POST /drinks`
pub const POST_DRINKS: &str = "post:drinks";
/// `PATCH /drinks/{id}`
pub const PATCH_DRINKS: &str = "patch:drinks";
/// `DELETE /drinks/{id}`
pub const DELETE_DRINKS: &str = "delete:drinks";

/// Require `required` in the token's `permissions` claim.
///
/// A missing claim means the token was not issued with RBAC enabled and is
/// reported as malformed (400); a claim without the permission is a 403.
pub fn check_permission(claims: &ClaimSet, required: &str) -> Result<(), AuthError> {
    if claims.permissions.is_none() {
        return Err(AuthError::PermissionsAbsent);
    }
    if !claims.has_permission(required) {
        return Err(AuthError::PermissionDenied);
    }
    Ok(())
}
