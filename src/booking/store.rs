//! Persistence seam for the booking engine.
//!
//! The engine only talks to an injected `Arc<dyn BookingStore>`; the
//! PostgreSQL implementation lives here, the in-memory one in `memory`.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use super::models::{Booking, BookingStatus, NewBooking, PricingTier, Room, RoomPricing, RoomUpdate};
use super::policy::OccupancyPolicy;
use super::queries;
use super::services::{BookingError, ConflictInfo};
use super::stay::StayDates;

/// SQLSTATE for `exclusion_violation`
const EXCLUSION_VIOLATION: &str = "23P01";

/// Admin booking list filters. Every set field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub user_id: Option<String>,
    /// Exact, already lowercased guest e-mail
    pub guest_email: Option<String>,
    /// Case-insensitive substring of guest name, e-mail or phone
    pub search: Option<String>,
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        if self.status.is_some_and(|s| booking.status != s) {
            return false;
        }
        if self.user_id.as_ref().is_some_and(|id| booking.user_id.as_ref() != Some(id)) {
            return false;
        }
        if self.guest_email.as_ref().is_some_and(|e| &booking.guest_email != e) {
            return false;
        }
        match &self.search {
            Some(term) => {
                let term = term.to_lowercase();
                [&booking.guest_name, &booking.guest_email, &booking.guest_phone]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
            }
            None => true,
        }
    }
}

/// Storage operations the booking engine depends on
#[async_trait]
pub trait BookingStore: Send + Sync {
    // Rooms
    async fn get_room(&self, room_id: &str) -> Result<Option<Room>, BookingError>;
    async fn list_active_rooms(&self) -> Result<Vec<Room>, BookingError>;
    /// Every room, inactive ones included, by room number
    async fn list_rooms(&self) -> Result<Vec<Room>, BookingError>;
    async fn set_room_active(&self, room_id: &str, active: bool) -> Result<(), BookingError>;
    async fn update_room(&self, room_id: &str, update: &RoomUpdate) -> Result<Room, BookingError>;

    // Pricing
    async fn pricing_tiers(&self, room_id: &str) -> Result<Vec<RoomPricing>, BookingError>;
    /// Replace every tier of a room in one step
    async fn replace_pricing(&self, room_id: &str, tiers: &[PricingTier]) -> Result<(), BookingError>;

    // Bookings
    async fn overlapping_bookings(
        &self,
        room_id: Option<&str>,
        stay: &StayDates,
        policy: &OccupancyPolicy,
    ) -> Result<Vec<Booking>, BookingError>;

    /// Atomically check availability under `policy` and insert a PENDING
    /// booking. Fails with `Conflict` if any occupying booking overlaps.
    async fn insert_booking_if_available(
        &self,
        booking: NewBooking,
        policy: &OccupancyPolicy,
    ) -> Result<Booking, BookingError>;

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, BookingError>;
    async fn update_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        notes: Option<&str>,
    ) -> Result<Booking, BookingError>;
    /// Matching bookings, newest first
    async fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, BookingError>;
    async fn delete_booking(&self, id: Uuid) -> Result<(), BookingError>;
}

/// PostgreSQL-backed store
#[derive(Debug, Clone)]
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_exclusion_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(EXCLUSION_VIOLATION),
        _ => false,
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn get_room(&self, room_id: &str) -> Result<Option<Room>, BookingError> {
        Ok(queries::get_room(&self.pool, room_id).await?)
    }

    async fn list_active_rooms(&self) -> Result<Vec<Room>, BookingError> {
        Ok(queries::list_active_rooms(&self.pool).await?)
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, BookingError> {
        Ok(queries::list_rooms(&self.pool).await?)
    }

    async fn set_room_active(&self, room_id: &str, active: bool) -> Result<(), BookingError> {
        if !queries::set_room_active(&self.pool, room_id, active).await? {
            return Err(BookingError::RoomNotFound(room_id.to_string()));
        }
        Ok(())
    }

    async fn update_room(&self, room_id: &str, update: &RoomUpdate) -> Result<Room, BookingError> {
        queries::update_room(&self.pool, room_id, update)
            .await?
            .ok_or_else(|| BookingError::RoomNotFound(room_id.to_string()))
    }

    async fn pricing_tiers(&self, room_id: &str) -> Result<Vec<RoomPricing>, BookingError> {
        Ok(queries::get_room_pricing(&self.pool, room_id).await?)
    }

    async fn replace_pricing(&self, room_id: &str, tiers: &[PricingTier]) -> Result<(), BookingError> {
        let mut tx = self.pool.begin().await?;

        if !queries::lock_room(&mut *tx, room_id).await? {
            return Err(BookingError::RoomNotFound(room_id.to_string()));
        }
        queries::delete_room_pricing(&mut *tx, room_id).await?;
        for tier in tiers {
            queries::insert_room_pricing(&mut *tx, room_id, tier).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn overlapping_bookings(
        &self,
        room_id: Option<&str>,
        stay: &StayDates,
        policy: &OccupancyPolicy,
    ) -> Result<Vec<Booking>, BookingError> {
        Ok(queries::find_overlapping_bookings(&self.pool, room_id, stay, &policy.statuses()).await?)
    }

    async fn insert_booking_if_available(
        &self,
        booking: NewBooking,
        policy: &OccupancyPolicy,
    ) -> Result<Booking, BookingError> {
        let room_id = booking.room_id.clone();
        let mut tx = self.pool.begin().await?;

        // The row lock makes check + insert atomic per room; the exclusion
        // constraint backs it up for writers that skip this path.
        if !queries::lock_room(&mut *tx, &room_id).await? {
            return Err(BookingError::RoomNotFound(room_id));
        }

        let conflicts = queries::find_overlapping_bookings(
            &mut *tx,
            Some(&room_id),
            &booking.stay,
            &policy.statuses(),
        )
        .await?;
        if !conflicts.is_empty() {
            return Err(BookingError::Conflict {
                room_id,
                conflicts: conflicts.iter().map(ConflictInfo::from).collect(),
            });
        }

        let row = booking.into_booking(Uuid::new_v4(), Utc::now());
        let inserted = match queries::insert_booking(&mut *tx, &row).await {
            Ok(inserted) => inserted,
            Err(e) if is_exclusion_violation(&e) => {
                warn!("Exclusion constraint rejected booking for room {}", room_id);
                return Err(BookingError::Conflict {
                    room_id,
                    conflicts: vec![],
                });
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit().await?;
        Ok(inserted)
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, BookingError> {
        Ok(queries::get_booking(&self.pool, id).await?)
    }

    async fn update_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        notes: Option<&str>,
    ) -> Result<Booking, BookingError> {
        match queries::update_booking_status(&self.pool, id, status, notes).await {
            Ok(updated) => updated.ok_or(BookingError::BookingNotFound(id)),
            Err(e) if is_exclusion_violation(&e) => {
                warn!("Exclusion constraint rejected status {} for booking {}", status, id);
                let room_id = queries::get_booking(&self.pool, id)
                    .await?
                    .map(|b| b.room_id)
                    .unwrap_or_default();
                Err(BookingError::Conflict {
                    room_id,
                    conflicts: vec![],
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, BookingError> {
        Ok(queries::list_bookings(&self.pool, filter).await?)
    }

    async fn delete_booking(&self, id: Uuid) -> Result<(), BookingError> {
        if !queries::delete_booking(&self.pool, id).await? {
            return Err(BookingError::BookingNotFound(id));
        }
        Ok(())
    }
}
