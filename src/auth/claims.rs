// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Verified JWT claim set handed to route handlers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// `aud` may be a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Audience::One(value) => value == audience,
            Audience::Many(values) => values.iter().any(|v| v == audience),
        }
    }
}

/// Claims of a token whose signature, expiry, issuer and audience have all
/// been checked.
///
/// Only [`TokenVerifier`](super::TokenVerifier) constructs this from a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimSet {
    /// Issuer
    pub iss: String,
    /// Subject (provider user id)
    pub sub: String,
    /// Audience
    pub aud: Audience,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// RBAC permissions granted to the subject. `None` when the claim is
    /// missing entirely, which is not the same as an empty list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    /// Every other claim, untouched
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl ClaimSet {
    /// Whether `permission` is granted. False when the claim is absent.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .as_deref()
            .is_some_and(|granted| granted.iter().any(|p| p == permission))
    }
}
