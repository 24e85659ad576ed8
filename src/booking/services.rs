//! Booking engine services with storage access.
//!
//! `BookingEngine` loads rooms, tiers and bookings through the injected
//! store and cache, and delegates the math to `calculators`.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::AppCache;

use super::calculators::{self, GuestBreakdown, PricingOptions, PricingResult};
use super::models::{
    Booking, BookingStatus, GuestType, NewBooking, PricingTier, Room, RoomPricing, RoomUpdate,
};
use super::policy::AvailabilityPolicies;
use super::reports::{self, CustomerDetail, CustomerSummary, DashboardStats, RoomStats};
use super::stay::{CalendarWindow, HotelClock, StayDates};
use super::store::{BookingFilter, BookingStore};

/// Booking engine error types
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("{0}")]
    Validation(String),

    #[error("no {guest_type} pricing configured for room {room_id} with {guest_count} guest(s)")]
    NotConfigured {
        room_id: String,
        guest_type: GuestType,
        guest_count: i32,
    },

    #[error("room {room_id} is already booked for the requested dates")]
    Conflict {
        room_id: String,
        conflicts: Vec<ConflictInfo>,
    },

    #[error("room not found: {0}")]
    RoomNotFound(String),

    #[error("booking not found: {0}")]
    BookingNotFound(Uuid),

    #[error("customer not found: {0}")]
    CustomerNotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A booking that blocks a requested stay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictInfo {
    pub id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guest_name: String,
}

impl From<&Booking> for ConflictInfo {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id,
            check_in: booking.check_in,
            check_out: booking.check_out,
            guest_name: booking.guest_name.clone(),
        }
    }
}

/// Result of an availability check
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityResult {
    pub available: bool,
    pub conflicts: Vec<ConflictInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Booked,
}

/// One booked day of the calendar projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub status: DayStatus,
}

/// Ordering of the room list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoomSort {
    #[default]
    RoomNumber,
    Price,
}

/// Room search filters
#[derive(Debug, Clone, Default)]
pub struct RoomSearch {
    /// Only rooms free for this stay
    pub stay: Option<StayDates>,
    /// Only rooms holding at least this many guests
    pub guests: Option<i32>,
    pub sort: RoomSort,
}

/// Room with its teaser price
#[derive(Debug, Clone)]
pub struct RoomListing {
    pub room: Room,
    pub minimum_price: i64,
}

#[derive(Debug, Clone)]
pub struct RoomDetail {
    pub room: Room,
    pub pricing: PricingOptions,
}

/// Any room, active or not, with this month's booking figures
#[derive(Debug, Clone)]
pub struct AdminRoom {
    pub room: Room,
    pub stats: RoomStats,
}

/// Everything needed to create a booking
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub room_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: GuestBreakdown,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: String,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BookingConfirmation {
    pub booking: Booking,
    pub pricing: PricingResult,
}

/// Admin pricing table: adult tiers for 1-4 adults plus the child rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomPricingUpdate {
    pub adult1: i64,
    pub adult2: i64,
    pub adult3: i64,
    pub adult4: i64,
    pub child: i64,
}

impl RoomPricingUpdate {
    fn tiers(&self) -> Result<Vec<PricingTier>, BookingError> {
        let prices = [self.adult1, self.adult2, self.adult3, self.adult4, self.child];
        if prices.iter().any(|p| *p < 0) {
            return Err(BookingError::Validation("prices cannot be negative".to_string()));
        }

        let mut tiers: Vec<PricingTier> = [self.adult1, self.adult2, self.adult3, self.adult4]
            .into_iter()
            .zip(1..)
            .map(|(price, guest_count)| PricingTier {
                guest_type: GuestType::Adult,
                guest_count,
                price,
            })
            .collect();
        tiers.push(PricingTier {
            guest_type: GuestType::Child,
            guest_count: 1,
            price: self.child,
        });
        Ok(tiers)
    }
}

/// Events published for out-of-process side effects (confirmation mail)
#[derive(Debug, Clone)]
pub enum BookingEvent {
    Confirmed(Booking),
}

/// The availability and pricing engine
#[derive(Clone)]
pub struct BookingEngine {
    store: Arc<dyn BookingStore>,
    cache: AppCache,
    policies: AvailabilityPolicies,
    clock: HotelClock,
    events: broadcast::Sender<BookingEvent>,
}

impl BookingEngine {
    pub fn new(
        store: Arc<dyn BookingStore>,
        cache: AppCache,
        policies: AvailabilityPolicies,
        clock: HotelClock,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            store,
            cache,
            policies,
            clock,
            events,
        }
    }

    /// Receive booking lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<BookingEvent> {
        self.events.subscribe()
    }

    async fn require_room(&self, room_id: &str) -> Result<Room, BookingError> {
        self.store
            .get_room(room_id)
            .await?
            .ok_or_else(|| BookingError::RoomNotFound(room_id.to_string()))
    }

    async fn active_rooms(&self) -> Result<Arc<Vec<Room>>, BookingError> {
        if let Some(cached) = self.cache.active_rooms().await {
            debug!("Cache HIT for active rooms");
            return Ok(cached);
        }
        debug!("Cache MISS for active rooms");
        let rooms = Arc::new(self.store.list_active_rooms().await?);
        self.cache.store_active_rooms(rooms.clone()).await;
        Ok(rooms)
    }

    async fn tiers(&self, room_id: &str) -> Result<Arc<Vec<RoomPricing>>, BookingError> {
        if let Some(cached) = self.cache.pricing.get(room_id).await {
            debug!("Cache HIT for pricing: {}", room_id);
            return Ok(cached);
        }
        debug!("Cache MISS for pricing: {}", room_id);
        let tiers = Arc::new(self.store.pricing_tiers(room_id).await?);
        self.cache
            .pricing
            .insert(room_id.to_string(), tiers.clone())
            .await;
        Ok(tiers)
    }

    /// Check whether a room is free for `[check_in, check_out)`.
    ///
    /// Uses the guest-query policy. The check-in may not lie before today.
    pub async fn check_availability(
        &self,
        room_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<AvailabilityResult, BookingError> {
        let stay = StayDates::new(check_in, check_out)?;
        stay.ensure_not_past(self.clock.today())?;
        self.require_room(room_id).await?;

        let bookings = self
            .store
            .overlapping_bookings(Some(room_id), &stay, &self.policies.query)
            .await?;
        let conflicts: Vec<ConflictInfo> =
            calculators::find_conflicts(&bookings, &stay, &self.policies.query)
                .into_iter()
                .map(ConflictInfo::from)
                .collect();

        Ok(AvailabilityResult {
            available: conflicts.is_empty(),
            conflicts,
        })
    }

    /// Price a stay for the given guests.
    pub async fn calculate_price(
        &self,
        room_id: &str,
        guests: GuestBreakdown,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<PricingResult, BookingError> {
        guests.validate()?;
        let stay = StayDates::new(check_in, check_out)?;
        self.require_room(room_id).await?;
        let tiers = self.tiers(room_id).await?;

        calculators::calculate_room_price(room_id, &tiers, &guests, stay.nights())
    }

    /// Booked dates of a room between `start` and `end` inclusive.
    pub async fn list_availability(
        &self,
        room_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CalendarDay>, BookingError> {
        let window = CalendarWindow::new(start, end)?;
        let bookings = self
            .store
            .overlapping_bookings(Some(room_id), &window.as_stay(), &self.policies.query)
            .await?;

        Ok(calculators::booked_dates(&bookings, &window, &self.policies.query)
            .into_iter()
            .map(|date| CalendarDay {
                date,
                status: DayStatus::Booked,
            })
            .collect())
    }

    pub async fn pricing_options(&self, room_id: &str) -> Result<PricingOptions, BookingError> {
        let tiers = self.tiers(room_id).await?;
        Ok(calculators::pricing_options(&tiers))
    }

    /// The 1-adult rate; `NotConfigured` when the room lacks that tier.
    pub async fn minimum_price(&self, room_id: &str) -> Result<i64, BookingError> {
        let tiers = self.tiers(room_id).await?;
        calculators::minimum_price(room_id, &tiers)
    }

    /// Active rooms matching `search`, each with its teaser price.
    pub async fn list_rooms(&self, search: &RoomSearch) -> Result<Vec<RoomListing>, BookingError> {
        let rooms = self.active_rooms().await?;

        let booked: Vec<String> = match &search.stay {
            Some(stay) => self
                .store
                .overlapping_bookings(None, stay, &self.policies.creation)
                .await?
                .into_iter()
                .map(|b| b.room_id)
                .collect(),
            None => Vec::new(),
        };

        let mut listings = Vec::new();
        for room in rooms.iter() {
            if booked.contains(&room.id) {
                continue;
            }
            if let Some(guests) = search.guests {
                if room.max_guests < guests {
                    continue;
                }
            }

            // Teaser price only: an unconfigured room shows 0 instead of failing the list
            let minimum_price = match self.minimum_price(&room.id).await {
                Ok(price) => price,
                Err(BookingError::NotConfigured { .. }) => 0,
                Err(e) => return Err(e),
            };
            listings.push(RoomListing {
                room: room.clone(),
                minimum_price,
            });
        }

        if search.sort == RoomSort::Price {
            listings.sort_by_key(|l| l.minimum_price);
        }
        Ok(listings)
    }

    /// An active room with its pricing options.
    pub async fn room_detail(&self, room_id: &str) -> Result<RoomDetail, BookingError> {
        let room = self.require_room(room_id).await?;
        if !room.is_active {
            return Err(BookingError::RoomNotFound(room_id.to_string()));
        }
        let pricing = self.pricing_options(room_id).await?;
        Ok(RoomDetail { room, pricing })
    }

    /// Create a PENDING booking.
    ///
    /// Pricing fails hard on an unconfigured adult tier. Availability is
    /// checked under the creation policy atomically with the insert.
    pub async fn create_booking(
        &self,
        request: BookingRequest,
    ) -> Result<BookingConfirmation, BookingError> {
        for (field, value) in [
            ("guest name", &request.guest_name),
            ("guest email", &request.guest_email),
            ("guest phone", &request.guest_phone),
        ] {
            if value.trim().is_empty() {
                return Err(BookingError::Validation(format!("{} is required", field)));
            }
        }
        request.guests.validate()?;
        let stay = StayDates::new(request.check_in, request.check_out)?;
        stay.ensure_not_past(self.clock.today())?;

        let room = self.require_room(&request.room_id).await?;
        if !room.is_active {
            return Err(BookingError::RoomNotFound(room.id));
        }
        if request.guests.occupants() > room.max_guests {
            return Err(BookingError::Validation(format!(
                "room {} holds at most {} guests",
                room.id, room.max_guests
            )));
        }

        let tiers = self.tiers(&room.id).await?;
        let pricing =
            calculators::calculate_room_price(&room.id, &tiers, &request.guests, stay.nights())?;

        let booking = self
            .store
            .insert_booking_if_available(
                NewBooking {
                    room_id: room.id,
                    stay,
                    adults: request.guests.adults,
                    children: request.guests.children,
                    infants: request.guests.infants,
                    guest_name: request.guest_name.trim().to_string(),
                    guest_email: request.guest_email.trim().to_lowercase(),
                    guest_phone: request.guest_phone.trim().to_string(),
                    total_price: pricing.total_price,
                    user_id: request.user_id,
                },
                &self.policies.creation,
            )
            .await?;

        info!(
            booking_id = %booking.id,
            room_id = %booking.room_id,
            check_in = %booking.check_in,
            check_out = %booking.check_out,
            total_price = booking.total_price,
            "Booking created"
        );
        Ok(BookingConfirmation { booking, pricing })
    }

    /// Move a booking along its lifecycle.
    ///
    /// Entering CONFIRMED publishes `BookingEvent::Confirmed`.
    pub async fn update_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        notes: Option<&str>,
    ) -> Result<Booking, BookingError> {
        let current = self
            .store
            .get_booking(id)
            .await?
            .ok_or(BookingError::BookingNotFound(id))?;

        if !current.status.can_transition_to(status) {
            return Err(BookingError::Validation(format!(
                "cannot change booking status from {} to {}",
                current.status, status
            )));
        }

        if status != current.status && self.policies.creation.occupies(status) {
            let conflicts: Vec<ConflictInfo> = self
                .store
                .overlapping_bookings(
                    Some(current.room_id.as_str()),
                    &current.stay(),
                    &self.policies.creation,
                )
                .await?
                .iter()
                .filter(|b| b.id != current.id)
                .map(ConflictInfo::from)
                .collect();
            if !conflicts.is_empty() {
                return Err(BookingError::Conflict {
                    room_id: current.room_id,
                    conflicts,
                });
            }
        }

        let updated = self.store.update_booking_status(id, status, notes).await?;
        info!(
            booking_id = %id,
            from = %current.status,
            to = %updated.status,
            "Booking status updated"
        );

        if current.status != BookingStatus::Confirmed && updated.status == BookingStatus::Confirmed {
            // No subscribers is fine: the mailer may not be running
            let _ = self.events.send(BookingEvent::Confirmed(updated.clone()));
        }
        Ok(updated)
    }

    /// Bookings matching `filter`, newest first.
    pub async fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, BookingError> {
        self.store.list_bookings(filter).await
    }

    pub async fn delete_booking(&self, id: Uuid) -> Result<(), BookingError> {
        self.store.delete_booking(id).await?;
        info!(booking_id = %id, "Booking deleted");
        Ok(())
    }

    /// Guests grouped by e-mail, most recently active first.
    pub async fn customers(&self, search: Option<&str>) -> Result<Vec<CustomerSummary>, BookingError> {
        let bookings = self
            .store
            .list_bookings(&BookingFilter {
                search: search.map(str::to_string),
                ..Default::default()
            })
            .await?;
        Ok(reports::customer_summaries(&bookings))
    }

    /// One guest's history and statistics, looked up by e-mail.
    pub async fn customer(&self, email: &str) -> Result<CustomerDetail, BookingError> {
        let email = email.trim().to_lowercase();
        let bookings = self
            .store
            .list_bookings(&BookingFilter {
                guest_email: Some(email.clone()),
                ..Default::default()
            })
            .await?;
        let rooms = self.store.list_rooms().await?;

        reports::customer_detail(&email, bookings, &rooms).ok_or(BookingError::CustomerNotFound(email))
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, BookingError> {
        let bookings = self.store.list_bookings(&BookingFilter::default()).await?;
        let rooms = self.active_rooms().await?;
        Ok(reports::dashboard_stats(&bookings, self.clock.today(), rooms.len()))
    }

    /// Every room, inactive included, with this month's figures.
    pub async fn admin_rooms(&self) -> Result<Vec<AdminRoom>, BookingError> {
        let rooms = self.store.list_rooms().await?;
        let bookings = self.store.list_bookings(&BookingFilter::default()).await?;
        let month = StayDates::month_containing(self.clock.today());

        Ok(rooms
            .into_iter()
            .map(|room| AdminRoom {
                stats: reports::room_stats(&room.id, &bookings, &month),
                room,
            })
            .collect())
    }

    /// Edit a room's descriptive fields.
    pub async fn update_room(&self, room_id: &str, update: RoomUpdate) -> Result<Room, BookingError> {
        if update.max_guests.is_some_and(|n| n < 1) || update.size_sqm.is_some_and(|n| n < 1) {
            return Err(BookingError::Validation(
                "maxGuests and size must be positive".to_string(),
            ));
        }
        if let Some(Some(other)) = &update.connects_to {
            if other == room_id {
                return Err(BookingError::Validation(
                    "a room cannot connect to itself".to_string(),
                ));
            }
            if self.store.get_room(other).await?.is_none() {
                return Err(BookingError::Validation(format!(
                    "connecting room {} does not exist",
                    other
                )));
            }
        }

        let room = self.store.update_room(room_id, &update).await?;
        self.cache.invalidate_rooms().await;
        info!(room_id = %room_id, "Room updated");
        Ok(room)
    }

    /// Replace a room's pricing table.
    pub async fn replace_room_pricing(
        &self,
        room_id: &str,
        update: RoomPricingUpdate,
    ) -> Result<(), BookingError> {
        let tiers = update.tiers()?;
        self.store.replace_pricing(room_id, &tiers).await?;
        self.cache.invalidate_pricing(room_id).await;
        info!(room_id = %room_id, "Room pricing replaced");
        Ok(())
    }

    /// Enable or disable a room. Disabled rooms drop out of listings.
    pub async fn set_room_active(&self, room_id: &str, active: bool) -> Result<(), BookingError> {
        self.store.set_room_active(room_id, active).await?;
        self.cache.invalidate_rooms().await;
        info!(room_id = %room_id, active, "Room active flag changed");
        Ok(())
    }
}
