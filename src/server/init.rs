//! Server initialization
//!
//! Wires the store, bus, tracker, gateway and tool clients together and runs
//! the HTTP server until a shutdown signal arrives.

use super::config::{AppConfig, StoreKind};
use crate::api::{self, AppState};
use anyhow::{Context, Result};
use inkwell_core::{EventBus, WorkflowStreamGateway, WorkflowTracker};
use inkwell_store::{MemoryWorkflowStore, SqliteWorkflowStore, WorkflowStore};
use inkwell_tools::{BackendKind, DraftClient, ToolDispatcher};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

/// Build every component from configuration.
///
/// Open workflow streams hold child tokens of `shutdown`.
pub async fn build_state(config: &AppConfig, shutdown: CancellationToken) -> Result<AppState> {
    let store: Arc<dyn WorkflowStore> = match config.store.kind {
        StoreKind::Sqlite => {
            let path = config.db_path();
            info!("Workflow store: SQLite at {}", path.display());
            Arc::new(
                SqliteWorkflowStore::from_path(&path)
                    .await
                    .context("Failed to open workflow store")?,
            )
        }
        StoreKind::Memory => {
            info!("Workflow store: in-memory (not persisted)");
            Arc::new(MemoryWorkflowStore::new())
        }
    };

    let backends = &config.backends;
    let dispatcher = ToolDispatcher::from_endpoints(
        backends.get(BackendKind::Research).endpoint(BackendKind::Research),
        backends.get(BackendKind::Seo).endpoint(BackendKind::Seo),
        backends.get(BackendKind::Storage).endpoint(BackendKind::Storage),
    )
    .context("Failed to configure tool backends")?;
    let drafts = DraftClient::new(backends.get(BackendKind::Draft).endpoint(BackendKind::Draft))
        .context("Failed to configure draft backend")?;

    for kind in BackendKind::ALL {
        let backend = backends.get(kind);
        info!(
            backend = %kind,
            base_url = %backend.base_url,
            authenticated = !backend.api_key.is_empty(),
            "Tool backend configured"
        );
    }

    let bus = EventBus::new();
    Ok(AppState {
        tracker: WorkflowTracker::new(store.clone(), bus.clone()),
        gateway: WorkflowStreamGateway::new(store.clone(), bus.clone()),
        store,
        bus,
        dispatcher,
        drafts: Arc::new(drafts),
        shutdown,
    })
}

/// Run the server
pub async fn run(config: AppConfig) -> Result<()> {
    let shutdown = CancellationToken::new();
    let state = build_state(&config, shutdown.clone()).await?;

    let app = api::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("HTTP server error")?;

    info!("Inkwell shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM, then cancel `token` so open streams close.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C signal"),
        _ = terminate => info!("Received SIGTERM signal"),
    }

    token.cancel();
}
