//! Block Rush Back binary entrypoint wiring REST, WebSocket, SSE, and the slot store.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod dao;
mod dto;
mod error;
mod routes;
mod services;
mod state;

use config::AppConfig;
use dao::slot_store::memory::MemorySlotStore;
use services::{broadcast_service, game_service};
use state::{AppState, SharedState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let app_state = AppState::new(config);

    install_slot_store(app_state.clone()).await;

    // Both periodic loops share one shutdown signal and stop cleanly once
    // the server stops accepting connections.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let broadcaster = tokio::spawn(broadcast_service::run(
        app_state.clone(),
        shutdown_rx.clone(),
    ));
    let watchdog = tokio::spawn(game_service::run_duration_watchdog(
        app_state.clone(),
        shutdown_rx,
    ));

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    let _ = shutdown_tx.send(true);
    let _ = tokio::join!(broadcaster, watchdog);

    Ok(())
}

/// Pick and install the reservation backend.
///
/// With `MONGO_URI` set the MongoDB store is supervised in the background
/// (the server starts degraded until the first connection succeeds);
/// otherwise the in-memory store is installed immediately.
async fn install_slot_store(state: SharedState) {
    match env::var("MONGO_URI") {
        #[cfg(feature = "mongo-store")]
        Ok(uri) => {
            use crate::dao::slot_store::SlotStore;
            use crate::dao::slot_store::mongodb::{MongoConfig, MongoSlotStore};

            let db_name = env::var("MONGO_DB").ok();
            tokio::spawn(services::storage_supervisor::run(state, move || {
                let uri = uri.clone();
                let db_name = db_name.clone();
                async move {
                    let config = MongoConfig::from_uri(&uri, db_name.as_deref()).await?;
                    let store = MongoSlotStore::connect(config).await?;
                    Ok(Arc::new(store) as Arc<dyn SlotStore>)
                }
            }));
        }
        #[cfg(not(feature = "mongo-store"))]
        Ok(_) => {
            tracing::warn!(
                "MONGO_URI is set but the mongo-store feature is disabled; using the in-memory store"
            );
            state
                .install_slot_store(Arc::new(MemorySlotStore::new()))
                .await;
        }
        Err(_) => {
            info!("MONGO_URI not set; using the in-memory slot store");
            state
                .install_slot_store(Arc::new(MemorySlotStore::new()))
                .await;
        }
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
