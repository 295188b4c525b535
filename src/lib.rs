// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Coffee Shop - Drinks API
//!
//! REST backend for a coffee shop menu. Staff routes are protected by bearer
//! tokens issued by an external identity provider (Auth0) and checked against
//! per-route permissions.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token verification and RBAC guard
//! - `store` - In-memory drinks store

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod observability;
pub mod state;
pub mod store;

#[cfg(test)]
mod test_support;
