use parking_analytics::analytics::engine::{AnalyticsEngine, SystemClock};
use parking_analytics::store::memory::{FixedCapacityRegistry, InMemorySessionStore};
use parking_analytics::{api, config, state};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;

fn init_tracing(level: LevelFilter) {
    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_default()?;
    init_tracing(config.log_level());
    tracing::info!(
        config_path = config::DEFAULT_CONFIG_PATH,
        app = %config.app.name,
        "parking-analytics starting"
    );

    let store = build_session_store(&config);
    let registry = FixedCapacityRegistry::new(config.capacity());
    let engine = AnalyticsEngine::new(store, registry).with_fetch_timeout(config.fetch_timeout());
    let clock = SystemClock::new(config.utc_offset()?);
    tracing::info!(
        capacity = config.capacity(),
        fetch_timeout_ms = config.fetch_timeout().as_millis(),
        "Analytics engine ready"
    );

    let state = Arc::new(state::AppState::new(engine, Arc::new(clock)));
    let app = api::router(state);
    let port = config.server_port();
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Seed the in-memory store from the configured file, or start empty.
fn build_session_store(config: &config::Config) -> InMemorySessionStore {
    match config.sessions_path() {
        Some(path) => match InMemorySessionStore::load_from_path(path) {
            Ok(store) => {
                tracing::info!(
                    path = %path.display(),
                    sessions = store.len().unwrap_or(0),
                    "Session store seeded"
                );
                store
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load session seed, starting empty");
                InMemorySessionStore::default()
            }
        },
        None => {
            tracing::info!("No session seed configured, starting empty");
            InMemorySessionStore::default()
        }
    }
}
