//! Lastword API server entry point.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use lastword_api::error::AppError;
use lastword_api::notify::TracingNotifier;
use lastword_api::routes;
use lastword_api::state::AppState;
use lastword_core::clock::SystemClock;
use lastword_core::rng::SystemRng;
use lastword_room::application::sweeper;
use lastword_store::PgStore;

/// Default seconds between expiration sweeps.
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Lastword API server");

    // Read configuration from environment.
    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| AppError::Config("DATABASE_URL environment variable must be set".into()))?;
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;
    let sweep_interval_secs: u64 = std::env::var("SWEEP_INTERVAL_SECS")
        .unwrap_or_else(|_| DEFAULT_SWEEP_INTERVAL_SECS.to_string())
        .parse()
        .map_err(|e| AppError::Config(format!("SWEEP_INTERVAL_SECS must be a valid u64: {e}")))?;

    // Create database connection pool and ensure the schema exists.
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;
    let store = PgStore::new(pool);
    store.apply_schema().await?;

    // Build application state.
    let app_state = AppState::new(
        Arc::new(store),
        Arc::new(SystemClock),
        Arc::new(Mutex::new(SystemRng)),
        Arc::new(TracingNotifier),
    );

    // Spawn the periodic expiration sweeper.
    let sweep_state = app_state.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(sweep_interval_secs));
        loop {
            ticker.tick().await;
            match sweeper::sweep(
                sweep_state.clock.as_ref(),
                sweep_state.store.as_ref(),
                sweep_state.notifier.as_ref(),
            )
            .await
            {
                Ok(0) => {}
                Ok(count) => tracing::info!(expired = count, "expiration sweep completed"),
                Err(err) => tracing::error!(error = %err, "expiration sweep failed"),
            }
        }
    });

    // Build router.
    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/rooms", routes::rooms::router())
        .nest("/api/v1", routes::eliminations::router())
        .nest("/api/v1/users", routes::users::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server.
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
