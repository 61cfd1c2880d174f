use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use voyara_core::repository::{BookingRepository, EventStore, InventoryStore};
use voyara_core::supplier::{EventFeed, InventoryAdapter};
use voyara_engine::{
    AlternativeRules, ComposeRules, DisruptionWatchdog, Engine, WatchdogConfig,
};
use voyara_store::{
    Config, DbClient, HttpEventFeed, HttpQuoteClient, PgBookingRepository, PgEventStore,
    PgInventoryAdapter, PgInventoryStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voyara=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("failed to load config")?;
    let timeout = Duration::from_millis(config.supplier.timeout_ms);
    tracing::info!(
        provider = %config.supplier.base_url,
        poll_interval = config.watchdog.poll_interval_secs,
        "starting voyara daemon"
    );

    let db = DbClient::new(&config.database.url)
        .await
        .context("failed to connect to database")?;

    let quotes = HttpQuoteClient::new(&config.supplier.base_url, timeout)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let feed: Arc<dyn EventFeed> = Arc::new(
        HttpEventFeed::new(&config.supplier.base_url, timeout)
            .map_err(|e| anyhow::anyhow!(e.to_string()))?,
    );

    let supplier: Arc<dyn InventoryAdapter> =
        Arc::new(PgInventoryAdapter::new(db.pool.clone(), quotes));
    let bookings: Arc<dyn BookingRepository> = Arc::new(PgBookingRepository::new(db.pool.clone()));
    let inventory: Arc<dyn InventoryStore> = Arc::new(PgInventoryStore::new(db.pool.clone()));
    let events: Arc<dyn EventStore> = Arc::new(PgEventStore::new(db.pool.clone()));

    let engine = Engine::new(
        supplier,
        bookings.clone(),
        inventory.clone(),
        events.clone(),
        ComposeRules {
            max_results: config.composition.max_results,
            max_cities: config.composition.max_cities,
            per_city: config.composition.per_city,
        },
        AlternativeRules {
            max_alternatives: config.composition.max_alternatives,
            candidate_cities: config.composition.candidate_cities,
        },
    );

    // The one continuously running process in the core. A single instance
    // owns the event cursor; do not scale this horizontally.
    let watchdog = DisruptionWatchdog::new(
        feed,
        bookings,
        events,
        inventory,
        engine.alternative_generator(),
        WatchdogConfig {
            poll_interval: Duration::from_secs(config.watchdog.poll_interval_secs),
        },
    );
    let watchdog_handle = tokio::spawn(watchdog.run());

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("shutdown signal received");
    watchdog_handle.abort();

    Ok(())
}
