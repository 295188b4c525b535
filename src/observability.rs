// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tracing subscriber setup.
//!
//! Initialization is guarded by `OnceLock` so repeated calls are harmless.

use std::sync::OnceLock;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

static TRACING_INIT: OnceLock<()> = OnceLock::new();

pub fn init_tracing(format: LogFormat) {
    TRACING_INIT.get_or_init(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
        let registry = tracing_subscriber::registry().with(filter);
        let _ = match format {
            LogFormat::Json => registry
                .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
                .try_init(),
            LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        };
    });
}
