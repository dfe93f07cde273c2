//! airdrop-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints, and the
//! optional PostgreSQL persistence tasks (event log writer, periodic
//! snapshots, restore-on-boot).

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use airdrop_gateway::api;
use airdrop_gateway::api::auth::SessionStore;
use airdrop_gateway::app_state::AppState;
use airdrop_gateway::config::GatewayConfig;
use airdrop_gateway::domain::{EventBus, UserRegistry};
use airdrop_gateway::persistence::PostgresPersistence;
use airdrop_gateway::service::{LedgerService, LedgerState};
use airdrop_gateway::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting airdrop-gateway");
    if config.admin_password == "change-me" {
        tracing::warn!("ADMIN_PASSWORD not set; using the default password");
    }

    // Build domain layer
    let registry = Arc::new(UserRegistry::new());
    let event_bus = EventBus::new(config.event_bus_capacity);

    // Build service layer
    let ledger = Arc::new(LedgerService::new(
        registry,
        event_bus.clone(),
        config.withdrawal_threshold,
    ));

    // Optional persistence: restore the latest snapshot, then keep the
    // event log and snapshots flowing in the background.
    if config.persistence_enabled {
        match connect_database(&config).await {
            Ok(persistence) => {
                restore_ledger(&persistence, &ledger).await;
                if config.event_log_enabled {
                    spawn_event_log_writer(persistence.clone(), &event_bus);
                }
                spawn_snapshot_task(
                    persistence,
                    Arc::clone(&ledger),
                    config.snapshot_interval_secs,
                    config.cleanup_after_days,
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "database unavailable; running memory-only");
            }
        }
    }

    // Build application state
    let app_state = AppState {
        ledger,
        event_bus,
        sessions: Arc::new(SessionStore::new()),
        admin_password: Arc::from(config.admin_password.as_str()),
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Connects to PostgreSQL and runs the embedded migrations.
async fn connect_database(
    config: &GatewayConfig,
) -> Result<PostgresPersistence, Box<dyn std::error::Error>> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!().run(&pool).await?;
    Ok(PostgresPersistence::new(pool))
}

/// Restores the ledger from the most recent snapshot, if one exists.
async fn restore_ledger(persistence: &PostgresPersistence, ledger: &LedgerService) {
    match persistence.load_latest_snapshot().await {
        Ok(Some(snapshot)) => match serde_json::from_value::<LedgerState>(snapshot.state_json) {
            Ok(state) => {
                ledger.import_state(state).await;
                tracing::info!(snapshot_id = snapshot.id, "ledger restored from snapshot");

                // Events logged after the snapshot are audit history, not a
                // replay source; surface the gap so operators can see it.
                if let Ok(missed) = persistence
                    .load_events_after(snapshot.snapshot_at, None)
                    .await
                    && !missed.is_empty()
                {
                    tracing::warn!(
                        count = missed.len(),
                        "events recorded after the restored snapshot are not replayed"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "snapshot did not deserialize; starting empty");
            }
        },
        Ok(None) => {
            tracing::info!("no snapshot found; starting with an empty ledger");
        }
        Err(e) => {
            tracing::warn!(error = %e, "snapshot load failed; starting empty");
        }
    }
}

/// Appends every published ledger event to the database event log.
fn spawn_event_log_writer(persistence: PostgresPersistence, event_bus: &EventBus) {
    let mut rx = event_bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let payload = serde_json::to_value(&event).unwrap_or_default();
                    if let Err(e) = persistence
                        .save_event(
                            event.user_id().map(uuid::Uuid::from),
                            event.event_type_str(),
                            &payload,
                        )
                        .await
                    {
                        tracing::warn!(error = %e, "event log append failed");
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "event log writer lagged behind event bus");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

/// Periodically snapshots the full ledger state and prunes old snapshots.
fn spawn_snapshot_task(
    persistence: PostgresPersistence,
    ledger: Arc<LedgerService>,
    interval_secs: u64,
    cleanup_after_days: u64,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let state = ledger.export_state().await;
            match serde_json::to_value(&state) {
                Ok(json) => {
                    if let Err(e) = persistence.save_snapshot(&json).await {
                        tracing::warn!(error = %e, "snapshot save failed");
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "snapshot serialization failed");
                }
            }
            if cleanup_after_days > 0
                && let Err(e) = persistence.delete_old_snapshots(cleanup_after_days).await
            {
                tracing::warn!(error = %e, "snapshot cleanup failed");
            }
        }
    });
}
