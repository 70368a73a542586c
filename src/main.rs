use std::sync::Arc;

use matchtagger::{
    api, AppState, ConsoleConfig, EventBus, InMemoryMatchStore, MatchStore, PostgresMatchStore,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "matchtagger=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ConsoleConfig::from_env()?;
    info!(role = %config.role, bind_addr = %config.bind_addr, "Starting match tagging console");

    let bus = EventBus::with_capacity(config.channel_capacity);
    let store: Arc<dyn MatchStore> = match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::PgPool::connect(database_url).await?;
            let store = PostgresMatchStore::new(pool, bus);
            // Cross-process change fan-out; runs for the life of the server
            let _listener = store.spawn_listener().await?;
            info!("Using PostgreSQL match store");
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL not set, matches live in memory only");
            Arc::new(InMemoryMatchStore::with_bus(bus))
        }
    };

    let app_state = AppState::new(store, config.clone());
    let consoles = app_state.consoles.clone();
    let app = api::router(app_state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Server running on http://{}", config.bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    consoles.release_all().await;
    info!("Server stopped");
    Ok(())
}
