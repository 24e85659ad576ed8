//! Database models for rooms, pricing tiers and bookings.
//!
//! These models use sqlx's FromRow derive for direct database deserialization.
//! The enums map onto PostgreSQL enum types created by the schema migration.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use super::stay::StayDates;

/// Room category from the `room_type` enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "room_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomType {
    Corner,
    Standard,
    Connecting,
}

/// Guest type of a pricing tier. Infants are free and never priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "guest_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GuestType {
    Adult,
    Child,
}

impl fmt::Display for GuestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuestType::Adult => write!(f, "ADULT"),
            GuestType::Child => write!(f, "CHILD"),
        }
    }
}

/// Booking lifecycle status from the `booking_status` enum
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "booking_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Completed => "COMPLETED",
        }
    }

    /// Whether an admin may move a booking from `self` to `next`.
    ///
    /// Setting the current status again is accepted as a no-op.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;

        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Completed) | (Confirmed, Cancelled)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(BookingStatus::Pending),
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            "COMPLETED" => Ok(BookingStatus::Completed),
            other => Err(format!("unknown booking status '{}'", other)),
        }
    }
}

/// Room from rooms
#[derive(Debug, Clone, FromRow)]
pub struct Room {
    pub id: String,
    pub room_number: String,
    pub name: String,
    pub name_en: String,
    pub name_zh: String,
    pub description: String,
    pub description_en: String,
    pub description_zh: String,
    pub room_type: RoomType,
    pub max_guests: i32,
    pub size_sqm: i32,
    pub amenities: Json<Vec<String>>,
    pub images: Json<Vec<String>>,
    pub is_active: bool,
    pub connects_to: Option<String>,
}

/// Admin edit of a room's descriptive fields; `None` leaves a field as is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomUpdate {
    pub name: Option<String>,
    pub name_en: Option<String>,
    pub name_zh: Option<String>,
    pub description: Option<String>,
    pub description_en: Option<String>,
    pub description_zh: Option<String>,
    pub room_type: Option<RoomType>,
    pub max_guests: Option<i32>,
    pub size_sqm: Option<i32>,
    pub amenities: Option<Vec<String>>,
    /// `Some(None)` unlinks the connecting room
    pub connects_to: Option<Option<String>>,
}

impl RoomUpdate {
    pub fn apply(&self, room: &mut Room) {
        let text_fields = [
            (&self.name, &mut room.name),
            (&self.name_en, &mut room.name_en),
            (&self.name_zh, &mut room.name_zh),
            (&self.description, &mut room.description),
            (&self.description_en, &mut room.description_en),
            (&self.description_zh, &mut room.description_zh),
        ];
        for (update, field) in text_fields {
            if let Some(value) = update {
                *field = value.clone();
            }
        }
        if let Some(room_type) = self.room_type {
            room.room_type = room_type;
        }
        if let Some(max_guests) = self.max_guests {
            room.max_guests = max_guests;
        }
        if let Some(size_sqm) = self.size_sqm {
            room.size_sqm = size_sqm;
        }
        if let Some(amenities) = &self.amenities {
            room.amenities = Json(amenities.clone());
        }
        if let Some(connects_to) = &self.connects_to {
            room.connects_to = connects_to.clone();
        }
    }
}

/// Pricing tier from room_pricing, keyed by (room, guest type, guest count)
#[derive(Debug, Clone, FromRow)]
pub struct RoomPricing {
    pub id: Uuid,
    pub room_id: String,
    pub guest_type: GuestType,
    pub guest_count: i32,
    /// Nightly unit price in yen
    pub price: i64,
}

/// Booking from bookings. `check_out` is exclusive.
#[derive(Debug, Clone, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub room_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: i32,
    pub children: i32,
    pub infants: i32,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: String,
    pub total_price: i64,
    pub status: BookingStatus,
    pub notes: Option<String>,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn stay(&self) -> StayDates {
        StayDates {
            check_in: self.check_in,
            check_out: self.check_out,
        }
    }
}

/// Insert payload for a booking. Always stored as PENDING.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub room_id: String,
    pub stay: StayDates,
    pub adults: i32,
    pub children: i32,
    pub infants: i32,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: String,
    pub total_price: i64,
    pub user_id: Option<String>,
}

impl NewBooking {
    pub fn into_booking(self, id: Uuid, now: DateTime<Utc>) -> Booking {
        Booking {
            id,
            room_id: self.room_id,
            check_in: self.stay.check_in,
            check_out: self.stay.check_out,
            adults: self.adults,
            children: self.children,
            infants: self.infants,
            guest_name: self.guest_name,
            guest_email: self.guest_email,
            guest_phone: self.guest_phone,
            total_price: self.total_price,
            status: BookingStatus::Pending,
            notes: None,
            user_id: self.user_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A tier to write when replacing a room's pricing table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingTier {
    pub guest_type: GuestType,
    pub guest_count: i32,
    pub price: i64,
}
