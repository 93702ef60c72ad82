// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{error::Error, sync::Arc, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use clenxi_server::{
    api::router,
    blockchain::BaseClient,
    config::{AppConfig, DEFAULT_LOG_FILTER},
    state::AppState,
    storage::{
        import_pending_files, MemoryPlayerStore, PlayerDatabase, PlayerRepository, StoragePaths,
    },
};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.pretty().init();
    }
}

fn open_players(config: &AppConfig) -> Result<Arc<dyn PlayerRepository>, Box<dyn Error>> {
    let Some(data_dir) = &config.data_dir else {
        warn!("DATA_DIR not set; player data is kept in memory and lost on restart");
        return Ok(Arc::new(MemoryPlayerStore::new()));
    };

    let paths = StoragePaths::new(data_dir);
    let db = PlayerDatabase::open(&paths.database_file())?;

    let report = import_pending_files(&db, &paths.imports_dir(), Utc::now())?;
    if report.imported > 0 || report.malformed > 0 {
        info!(
            imported = report.imported,
            already_present = report.already_present,
            malformed = report.malformed,
            "Legacy player data imported"
        );
    }

    Ok(Arc::new(db))
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = shutdown.cancelled() => {},
    }
    info!("Shutdown signal received");
    shutdown.cancel();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::from_env()?;
    init_tracing(config.json_logs);

    // Install the ring crypto provider for rustls (must be done before any TLS operations)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("rustls crypto provider was already installed");
    }

    let players = open_players(&config)?;
    let mut state = AppState::new(players, config.clone());

    match &config.rpc_url {
        Some(rpc_url) => {
            let client = BaseClient::base(rpc_url)?;
            info!(rpc_url = %rpc_url, "Base RPC client configured");
            state = state.with_chain(client);
        }
        None => warn!("BASE_RPC_URL not set; wallet balances are not looked up"),
    }

    let app = router(state);
    let addr = config.bind_addr;

    let shutdown = CancellationToken::new();
    let handle = Handle::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        let handle = handle.clone();
        async move {
            shutdown_signal(shutdown).await;
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        }
    });

    match &config.tls {
        Some(tls) => {
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;
            info!(%addr, "Clenxi server listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            info!(%addr, "Clenxi server listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    shutdown.cancel();
    info!("Server stopped");
    Ok(())
}
