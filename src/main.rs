use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use eventcast::api::AppState;
use eventcast::cache::PersistentCache;
use eventcast::config::EventCastConfig;
use eventcast::notify::Notifier;
use eventcast::provider::OpenMeteoProvider;
use eventcast::store::EventStore;
use eventcast::{tasks, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config = EventCastConfig::load().context("Failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    if config.logging.format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    tracing::info!(version = eventcast::VERSION, "starting eventcast");

    let cache = Arc::new(
        PersistentCache::open(config.cache_path()).context("Failed to open cache database")?,
    );
    let cache_ttl = Duration::from_secs(u64::from(config.cache.ttl_hours) * 3600);
    let provider = Arc::new(OpenMeteoProvider::new(&config.weather, cache, cache_ttl)?);
    let store = Arc::new(
        EventStore::open(&config.store.events_path)
            .await
            .context("Failed to open event store")?,
    );
    let notifier = Notifier::from_config(&config.notifications)?.map(Arc::new);
    let engine = config.scoring.engine();
    let port = config.server.port;

    let state = AppState {
        config: Arc::new(config),
        engine,
        provider,
        store,
        notifier,
    };

    tokio::spawn(tasks::run_periodic_checks(state.clone()));

    web::run(state, port).await
}
