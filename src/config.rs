// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup and is
//! immutable afterwards.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AUTH0_DOMAIN` | Identity provider domain (derives issuer and JWKS URL) | Required unless both overrides are set |
//! | `AUTH_ISSUER` | Expected JWT issuer claim | `https://<AUTH0_DOMAIN>/` |
//! | `AUTH_JWKS_URL` | JWKS endpoint | `https://<AUTH0_DOMAIN>/.well-known/jwks.json` |
//! | `API_AUDIENCE` | Expected JWT audience claim | Required |
//! | `AUTH_LEEWAY_SECS` | Clock skew tolerance for `exp` | `0` |
//! | `JWKS_TIMEOUT_SECS` | JWKS request timeout | `10` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files; HTTPS when both are set | unset |
//! | `RESET_DB_ON_START` | Drop and reseed the drinks store at startup | `true` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::auth::jwks::DEFAULT_FETCH_TIMEOUT;

pub const AUTH0_DOMAIN_ENV: &str = "AUTH0_DOMAIN";
pub const AUTH_ISSUER_ENV: &str = "AUTH_ISSUER";
pub const AUTH_JWKS_URL_ENV: &str = "AUTH_JWKS_URL";
pub const API_AUDIENCE_ENV: &str = "API_AUDIENCE";
pub const AUTH_LEEWAY_ENV: &str = "AUTH_LEEWAY_SECS";
pub const JWKS_TIMEOUT_ENV: &str = "JWKS_TIMEOUT_SECS";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const TLS_CERT_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_ENV: &str = "TLS_KEY_PATH";
pub const RESET_DB_ENV: &str = "RESET_DB_ON_START";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Token verification settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSettings {
    pub jwks_url: String,
    pub issuer: String,
    pub audience: String,
    pub leeway_secs: u64,
    pub fetch_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Full service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub auth: AuthSettings,
    pub tls: Option<TlsPaths>,
    pub reset_db_on_start: bool,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = get(HOST_ENV).unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = parse_or(get(PORT_ENV), PORT_ENV, 8080)?;
        let bind_addr: SocketAddr = format!("{host}:{port}").parse().map_err(|e| {
            ConfigError::Invalid {
                name: HOST_ENV,
                reason: format!("{e}"),
            }
        })?;

        let tls = match (get(TLS_CERT_ENV), get(TLS_KEY_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_ENV)),
        };

        let log_format = match get(LOG_FORMAT_ENV).as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    reason: format!("expected `json` or `pretty`, got `{other}`"),
                })
            }
        };

        Ok(Self {
            bind_addr,
            auth: auth_settings(&get)?,
            tls,
            reset_db_on_start: parse_or(get(RESET_DB_ENV), RESET_DB_ENV, true)?,
            log_format,
        })
    }
}

fn auth_settings<F>(get: &F) -> Result<AuthSettings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let domain = get(AUTH0_DOMAIN_ENV).map(|d| d.trim_end_matches('/').to_string());

    let issuer = match (get(AUTH_ISSUER_ENV), &domain) {
        (Some(issuer), _) => issuer,
        (None, Some(domain)) => format!("https://{domain}/"),
        (None, None) => return Err(ConfigError::Missing(AUTH0_DOMAIN_ENV)),
    };
    let jwks_url = match (get(AUTH_JWKS_URL_ENV), &domain) {
        (Some(url), _) => url,
        (None, Some(domain)) => format!("https://{domain}/.well-known/jwks.json"),
        (None, None) => return Err(ConfigError::Missing(AUTH0_DOMAIN_ENV)),
    };
    validate_jwks_url(&jwks_url)?;

    let audience = get(API_AUDIENCE_ENV).ok_or(ConfigError::Missing(API_AUDIENCE_ENV))?;
    let timeout_secs = parse_or(
        get(JWKS_TIMEOUT_ENV),
        JWKS_TIMEOUT_ENV,
        DEFAULT_FETCH_TIMEOUT.as_secs(),
    )?;

    Ok(AuthSettings {
        jwks_url,
        issuer,
        audience,
        leeway_secs: parse_or(get(AUTH_LEEWAY_ENV), AUTH_LEEWAY_ENV, 0)?,
        fetch_timeout: Duration::from_secs(timeout_secs),
    })
}

/// JWKS must come over HTTPS; plain HTTP only for loopback hosts.
fn validate_jwks_url(raw: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name: AUTH_JWKS_URL_ENV,
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "https" => Ok(()),
        "http" if matches!(url.host_str(), Some("localhost" | "127.0.0.1")) => Ok(()),
        scheme => Err(invalid(format!("scheme `{scheme}` is not allowed, use https"))),
    }
}

fn parse_or<T>(value: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
