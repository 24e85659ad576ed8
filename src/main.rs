use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hotel_reservations::booking::{BookingEngine, BookingEvent, BookingStore, HotelClock, PgBookingStore};
use hotel_reservations::cache::{start_cache_warmer, AppCache};
use hotel_reservations::config::Config;
use hotel_reservations::{db, routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    info!("Starting hotel reservation service...");
    info!(
        query = %config.policies.query,
        creation = %config.policies.creation,
        "Occupancy policies"
    );

    let pool = db::connect(&config).await.context("failed to connect to database")?;
    db::run_migrations(&pool).await.context("failed to run migrations")?;

    let store: Arc<dyn BookingStore> = Arc::new(PgBookingStore::new(pool.clone()));
    let cache = AppCache::new();
    let engine = BookingEngine::new(
        store.clone(),
        cache.clone(),
        config.policies.clone(),
        HotelClock::Offset(config.hotel_utc_offset),
    );

    // Confirmation mail hangs off this channel; until then, log it
    let mut events = engine.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(BookingEvent::Confirmed(booking)) => info!(
                    booking_id = %booking.id,
                    guest_email = %booking.guest_email,
                    "Booking confirmed"
                ),
                Err(RecvError::Lagged(skipped)) => warn!("Event listener lagged, {} events skipped", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    });

    tokio::spawn(start_cache_warmer(cache.clone(), store, config.cache_warm_interval));

    let state = AppState {
        db: pool,
        cache,
        engine: Arc::new(engine),
    };
    let app = routes::app(state);

    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
