//! In-memory caching using moka
//!
//! Caches the active room list and per-room pricing tiers. Both change only
//! through admin edits, which invalidate the affected entries. Bookings are
//! never cached: availability must always be read fresh.

use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};

use crate::booking::models::{Room, RoomPricing};
use crate::booking::store::BookingStore;

const ACTIVE_ROOMS_KEY: &str = "rooms:active";

/// Application cache holding rooms and pricing tiers
#[derive(Clone)]
pub struct AppCache {
    /// Active rooms (singleton list)
    pub rooms: Cache<String, Arc<Vec<Room>>>,
    /// Pricing tiers (room_id -> tiers)
    pub pricing: Cache<String, Arc<Vec<RoomPricing>>>,
}

impl AppCache {
    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self {
            // Room list: 1 entry, 10 min TTL
            rooms: Cache::builder()
                .max_capacity(1)
                .time_to_live(Duration::from_secs(10 * 60))
                .build(),

            // Pricing: one entry per room, 30 min TTL, 10 min idle
            pricing: Cache::builder()
                .max_capacity(200)
                .time_to_live(Duration::from_secs(30 * 60))
                .time_to_idle(Duration::from_secs(10 * 60))
                .build(),
        }
    }

    pub async fn active_rooms(&self) -> Option<Arc<Vec<Room>>> {
        self.rooms.get(ACTIVE_ROOMS_KEY).await
    }

    pub async fn store_active_rooms(&self, rooms: Arc<Vec<Room>>) {
        self.rooms.insert(ACTIVE_ROOMS_KEY.to_string(), rooms).await;
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            rooms_cached: self.rooms.entry_count() > 0,
            pricing_size: self.pricing.entry_count(),
        }
    }

    /// Invalidate the pricing tiers of one room
    pub async fn invalidate_pricing(&self, room_id: &str) {
        self.pricing.invalidate(room_id).await;
        info!("Pricing cache invalidated for room: {}", room_id);
    }

    /// Invalidate the active room list
    pub async fn invalidate_rooms(&self) {
        self.rooms.invalidate(ACTIVE_ROOMS_KEY).await;
        info!("Room list cache invalidated");
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub rooms_cached: bool,
    pub pricing_size: u64,
}

/// Start background cache warmer
///
/// Warms the cache on startup and refreshes every `period`.
pub async fn start_cache_warmer(cache: AppCache, store: Arc<dyn BookingStore>, period: Duration) {
    let mut interval = interval(period);
    loop {
        // First tick completes immediately
        interval.tick().await;
        warm_cache(&cache, store.as_ref()).await;
    }
}

/// Warm the cache with the room list and every active room's pricing
pub async fn warm_cache(cache: &AppCache, store: &dyn BookingStore) {
    info!("Starting cache warm-up...");

    let rooms = match store.list_active_rooms().await {
        Ok(rooms) => Arc::new(rooms),
        Err(e) => {
            warn!("Failed to warm room cache: {}", e);
            return;
        }
    };
    cache.store_active_rooms(rooms.clone()).await;

    for room in rooms.iter() {
        match store.pricing_tiers(&room.id).await {
            Ok(tiers) => {
                cache.pricing.insert(room.id.clone(), Arc::new(tiers)).await;
            }
            Err(e) => warn!("Failed to warm pricing cache for room {}: {}", room.id, e),
        }
    }

    cache.rooms.run_pending_tasks().await;
    cache.pricing.run_pending_tasks().await;
    info!("Cache warm-up complete. Stats: {:?}", cache.stats());
}
