// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use axum_server::{tls_rustls::RustlsConfig, Handle};
use thiserror::Error;

use coffee_shop_server::{
    api::router,
    auth::{KeyCache, TokenVerifier},
    config::{AppConfig, ConfigError},
    observability::init_tracing,
    state::AppState,
    store::InMemoryStore,
};

/// Grace period for in-flight requests on shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build JWKS HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("failed to install rustls crypto provider")]
    CryptoProvider,
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server exited with error");
            eprintln!("coffee-shop-server: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    let config = AppConfig::from_env()?;
    init_tracing(config.log_format);

    let keys = Arc::new(KeyCache::new(
        config.auth.jwks_url.clone(),
        config.auth.fetch_timeout,
    )?);
    if let Err(e) = keys.refresh().await {
        tracing::warn!(error = %e, "JWKS warm-up failed, keys will be fetched on first request");
    }

    let store = if config.reset_db_on_start {
        tracing::info!("resetting drinks store");
        InMemoryStore::seeded()
    } else {
        InMemoryStore::new()
    };

    let verifier = TokenVerifier::new(keys, &config.auth);
    let app = router(AppState::new(store, verifier));

    let handle = Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            shutdown.graceful_shutdown(Some(SHUTDOWN_GRACE));
        }
    });

    let addr = config.bind_addr;
    match &config.tls {
        Some(tls) => {
            rustls::crypto::ring::default_provider()
                .install_default()
                .map_err(|_| StartupError::CryptoProvider)?;
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;

            tracing::info!(%addr, issuer = %config.auth.issuer, "coffee shop API listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            tracing::info!(%addr, issuer = %config.auth.issuer, "coffee shop API listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    tracing::info!("server stopped");
    Ok(())
}
