//! In-memory booking store for development and testing

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::calculators::find_conflicts;
use super::models::{Booking, BookingStatus, NewBooking, PricingTier, Room, RoomPricing, RoomUpdate};
use super::policy::OccupancyPolicy;
use super::services::{BookingError, ConflictInfo};
use super::store::{BookingFilter, BookingStore};
use super::stay::StayDates;

#[derive(Default)]
struct State {
    rooms: BTreeMap<String, Room>,
    pricing: Vec<RoomPricing>,
    bookings: Vec<Booking>,
}

/// Store holding everything behind one async mutex.
///
/// Check-and-insert runs under a single lock acquisition, so it is atomic
/// with respect to other writers of the same store.
#[derive(Default)]
pub struct InMemoryBookingStore {
    state: Mutex<State>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_room(&self, room: Room) {
        self.state.lock().await.rooms.insert(room.id.clone(), room);
    }

    pub async fn insert_tier(&self, room_id: &str, tier: PricingTier) {
        let mut state = self.state.lock().await;
        state
            .pricing
            .retain(|p| !(p.room_id == room_id && p.guest_type == tier.guest_type && p.guest_count == tier.guest_count));
        state.pricing.push(RoomPricing {
            id: Uuid::new_v4(),
            room_id: room_id.to_string(),
            guest_type: tier.guest_type,
            guest_count: tier.guest_count,
            price: tier.price,
        });
    }

    /// Insert a booking as-is, bypassing availability checks
    pub async fn insert_booking(&self, booking: Booking) {
        self.state.lock().await.bookings.push(booking);
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn get_room(&self, room_id: &str) -> Result<Option<Room>, BookingError> {
        Ok(self.state.lock().await.rooms.get(room_id).cloned())
    }

    async fn list_active_rooms(&self) -> Result<Vec<Room>, BookingError> {
        let state = self.state.lock().await;
        let mut rooms: Vec<Room> = state.rooms.values().filter(|r| r.is_active).cloned().collect();
        rooms.sort_by(|a, b| a.room_number.cmp(&b.room_number));
        Ok(rooms)
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, BookingError> {
        let state = self.state.lock().await;
        let mut rooms: Vec<Room> = state.rooms.values().cloned().collect();
        rooms.sort_by(|a, b| a.room_number.cmp(&b.room_number));
        Ok(rooms)
    }

    async fn update_room(&self, room_id: &str, update: &RoomUpdate) -> Result<Room, BookingError> {
        let mut state = self.state.lock().await;
        let room = state
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| BookingError::RoomNotFound(room_id.to_string()))?;
        update.apply(room);
        Ok(room.clone())
    }

    async fn set_room_active(&self, room_id: &str, active: bool) -> Result<(), BookingError> {
        let mut state = self.state.lock().await;
        let room = state
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| BookingError::RoomNotFound(room_id.to_string()))?;
        room.is_active = active;
        Ok(())
    }

    async fn pricing_tiers(&self, room_id: &str) -> Result<Vec<RoomPricing>, BookingError> {
        let state = self.state.lock().await;
        let mut tiers: Vec<RoomPricing> = state
            .pricing
            .iter()
            .filter(|p| p.room_id == room_id)
            .cloned()
            .collect();
        tiers.sort_by_key(|p| (p.guest_type, p.guest_count));
        Ok(tiers)
    }

    async fn replace_pricing(&self, room_id: &str, tiers: &[PricingTier]) -> Result<(), BookingError> {
        let mut state = self.state.lock().await;
        if !state.rooms.contains_key(room_id) {
            return Err(BookingError::RoomNotFound(room_id.to_string()));
        }

        state.pricing.retain(|p| p.room_id != room_id);
        state.pricing.extend(tiers.iter().map(|tier| RoomPricing {
            id: Uuid::new_v4(),
            room_id: room_id.to_string(),
            guest_type: tier.guest_type,
            guest_count: tier.guest_count,
            price: tier.price,
        }));
        Ok(())
    }

    async fn overlapping_bookings(
        &self,
        room_id: Option<&str>,
        stay: &StayDates,
        policy: &OccupancyPolicy,
    ) -> Result<Vec<Booking>, BookingError> {
        let state = self.state.lock().await;
        let mut found: Vec<Booking> = find_conflicts(&state.bookings, stay, policy)
            .into_iter()
            .filter(|b| room_id.map_or(true, |id| b.room_id == id))
            .cloned()
            .collect();
        found.sort_by_key(|b| b.check_in);
        Ok(found)
    }

    async fn insert_booking_if_available(
        &self,
        booking: NewBooking,
        policy: &OccupancyPolicy,
    ) -> Result<Booking, BookingError> {
        let mut state = self.state.lock().await;

        if !state.rooms.contains_key(&booking.room_id) {
            return Err(BookingError::RoomNotFound(booking.room_id));
        }

        let conflicts: Vec<ConflictInfo> = find_conflicts(&state.bookings, &booking.stay, policy)
            .into_iter()
            .filter(|b| b.room_id == booking.room_id)
            .map(ConflictInfo::from)
            .collect();
        if !conflicts.is_empty() {
            return Err(BookingError::Conflict {
                room_id: booking.room_id,
                conflicts,
            });
        }

        let row = booking.into_booking(Uuid::new_v4(), Utc::now());
        state.bookings.push(row.clone());
        Ok(row)
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, BookingError> {
        let state = self.state.lock().await;
        Ok(state.bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn update_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        notes: Option<&str>,
    ) -> Result<Booking, BookingError> {
        let mut state = self.state.lock().await;
        let booking = state
            .bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(BookingError::BookingNotFound(id))?;

        booking.status = status;
        if let Some(notes) = notes {
            booking.notes = Some(notes.to_string());
        }
        booking.updated_at = Utc::now();
        Ok(booking.clone())
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, BookingError> {
        let state = self.state.lock().await;
        let mut bookings: Vec<Booking> = state
            .bookings
            .iter()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookings)
    }

    async fn delete_booking(&self, id: Uuid) -> Result<(), BookingError> {
        let mut state = self.state.lock().await;
        let before = state.bookings.len();
        state.bookings.retain(|b| b.id != id);
        if state.bookings.len() == before {
            return Err(BookingError::BookingNotFound(id));
        }
        Ok(())
    }
}
