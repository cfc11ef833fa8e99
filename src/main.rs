// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tracing_subscriber::EnvFilter;

use portfolio_server::{
    api::router,
    config::{LogFormat, ServerConfig, DEFAULT_LOG_FILTER},
    state::AppState,
};

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::Pretty);
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_format);

    let state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, data_dir = %config.data_dir.display(), "Failed to open storage");
            return ExitCode::FAILURE;
        }
    };

    let app = router(state, config.client_origin.as_deref());
    let addr = config.bind_addr();

    let served = match &config.tls {
        Some(tls) => {
            // Must happen before any TLS configuration is built.
            if rustls::crypto::ring::default_provider()
                .install_default()
                .is_err()
            {
                tracing::warn!("rustls crypto provider was already installed");
            }

            let tls_config = match RustlsConfig::from_pem_file(&tls.cert, &tls.key).await {
                Ok(tls_config) => tls_config,
                Err(e) => {
                    tracing::error!(error = %e, cert = %tls.cert.display(), "Failed to load TLS credentials");
                    return ExitCode::FAILURE;
                }
            };

            let handle = Handle::new();
            let shutdown = handle.clone();
            tokio::spawn(async move {
                shutdown_signal().await;
                shutdown.graceful_shutdown(None);
            });

            tracing::info!(%addr, "Portfolio server listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
        None => {
            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(listener) => listener,
                Err(e) => {
                    tracing::error!(error = %e, %addr, "Failed to bind");
                    return ExitCode::FAILURE;
                }
            };

            tracing::info!(%addr, "Portfolio server listening on http (docs at /docs)");
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
        }
    };

    match served {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}
