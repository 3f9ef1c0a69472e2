// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{sync::Arc, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use custody_server::{
    api::router,
    blockchain::EvmClient,
    config::{AppConfig, LogFormat, DEFAULT_LOG_FILTER},
    state::AppState,
    storage::{WalletDatabase, WalletRepository},
};

/// Time allowed for in-flight requests after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is not an error
    let _ = dotenvy::dotenv();
    init_tracing(LogFormat::from_env());

    // Install the ring crypto provider for rustls (must be done before any TLS operations)
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| "Failed to install rustls crypto provider")?;

    let config = AppConfig::from_env()?;

    let db_path = config.storage.wallet_db();
    let db = WalletDatabase::open(&db_path)?;
    tracing::info!(path = %db_path.display(), "Wallet database opened");

    let cipher = config.cipher.build(&config.cipher_key)?;
    let wallets = WalletRepository::new(db.clone(), cipher, config.max_secret_len);
    let chain = Arc::new(EvmClient::new(config.network.clone())?);

    let state = AppState::new(db, wallets, chain, config.transfer.clone());
    let app = router(state);

    let shutdown = CancellationToken::new();
    let handle: Handle<std::net::SocketAddr> = Handle::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));
    {
        let handle = handle.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            shutdown.cancelled().await;
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        });
    }

    tracing::info!(
        addr = %config.bind_addr,
        network = config.network.name,
        chain_id = config.transfer.chain_id,
        cipher = %config.cipher,
        sweep_policy = %config.transfer.sweep_policy,
        tls = config.tls.is_some(),
        "Custody server listening (docs at /docs)"
    );

    match &config.tls {
        Some(tls) => {
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;
            axum_server::bind_rustls(config.bind_addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            axum_server::bind(config.bind_addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    tracing::info!("Custody server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

async fn wait_for_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}
