//! Request DTOs for booking API endpoints.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use validator::Validate;

use crate::pagination;

use super::calculators::GuestBreakdown;
use super::models::{BookingStatus, RoomType, RoomUpdate};
use super::services::{BookingError, RoomPricingUpdate, RoomSearch, RoomSort};
use super::stay::StayDates;
use super::store::BookingFilter;

/// Query string for the room list
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomListQuery {
    #[serde(default)]
    pub check_in: Option<NaiveDate>,
    #[serde(default)]
    pub check_out: Option<NaiveDate>,
    #[serde(default)]
    pub guests: Option<i32>,
    #[serde(default)]
    pub sort: Option<String>,
}

impl RoomListQuery {
    /// Dates only filter when both are present.
    pub fn into_search(self) -> Result<RoomSearch, BookingError> {
        let stay = match (self.check_in, self.check_out) {
            (Some(check_in), Some(check_out)) => Some(StayDates::new(check_in, check_out)?),
            _ => None,
        };
        let sort = match self.sort.as_deref() {
            Some("price") => RoomSort::Price,
            _ => RoomSort::RoomNumber,
        };

        Ok(RoomSearch {
            stay,
            guests: self.guests,
            sort,
        })
    }
}

/// Request to price a stay
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatePriceRequest {
    pub adults: i32,
    #[serde(default)]
    pub children: i32,
    #[serde(default)]
    pub infants: i32,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl CalculatePriceRequest {
    pub fn guests(&self) -> GuestBreakdown {
        GuestBreakdown {
            adults: self.adults,
            children: self.children,
            infants: self.infants,
        }
    }
}

/// Query string for the availability calendar (end date inclusive)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAvailabilityRequest {
    pub room_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

/// Booking form submission
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[validate(length(min = 1, message = "roomId is required"))]
    pub room_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[validate(range(min = 1, message = "at least one adult is required"))]
    pub adults: i32,
    #[serde(default)]
    #[validate(range(min = 0, message = "children cannot be negative"))]
    pub children: i32,
    #[serde(default)]
    #[validate(range(min = 0, message = "infants cannot be negative"))]
    pub infants: i32,
    #[validate(length(min = 1, max = 100, message = "guestName must be 1-100 characters"))]
    pub guest_name: String,
    #[validate(email(message = "invalid email format"))]
    pub guest_email: String,
    #[validate(length(min = 1, max = 30, message = "guestPhone must be 1-30 characters"))]
    pub guest_phone: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl CreateBookingRequest {
    pub fn guests(&self) -> GuestBreakdown {
        GuestBreakdown {
            adults: self.adults,
            children: self.children,
            infants: self.infants,
        }
    }
}

/// Query string for the admin booking list
#[derive(Debug, Default, Deserialize)]
pub struct BookingListQuery {
    #[serde(default)]
    pub status: Option<BookingStatus>,
    #[serde(default)]
    pub search: Option<String>,
}

impl BookingListQuery {
    pub fn filter(self) -> BookingFilter {
        BookingFilter {
            status: self.status,
            search: non_blank(self.search),
            ..Default::default()
        }
    }
}

/// Query string for a guest's own booking list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBookingsQuery {
    pub user_id: String,
}

/// Query string for the admin customer list
#[derive(Debug, Deserialize)]
pub struct CustomerListQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default = "pagination::default_page")]
    pub page: i64,
    #[serde(default = "pagination::default_limit")]
    pub limit: i64,
}

impl CustomerListQuery {
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// `null` or `""` clears the field; an absent key leaves it unchanged
fn clearable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|value| Some(non_blank(value)))
}

/// Admin booking update
#[derive(Debug, Deserialize)]
pub struct UpdateBookingRequest {
    pub status: BookingStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Admin pricing table for one room
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePricingRequest {
    #[validate(range(min = 0))]
    pub adult1: i64,
    #[validate(range(min = 0))]
    pub adult2: i64,
    #[validate(range(min = 0))]
    pub adult3: i64,
    #[validate(range(min = 0))]
    pub adult4: i64,
    #[validate(range(min = 0))]
    pub child: i64,
}

impl From<UpdatePricingRequest> for RoomPricingUpdate {
    fn from(req: UpdatePricingRequest) -> Self {
        Self {
            adult1: req.adult1,
            adult2: req.adult2,
            adult3: req.adult3,
            adult4: req.adult4,
            child: req.child,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRoomActiveRequest {
    pub is_active: bool,
}

/// Admin room edit; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoomRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub name_en: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub name_zh: Option<String>,
    pub description: Option<String>,
    pub description_en: Option<String>,
    pub description_zh: Option<String>,
    #[serde(rename = "type")]
    pub room_type: Option<RoomType>,
    #[validate(range(min = 1, max = 20))]
    pub max_guests: Option<i32>,
    #[validate(range(min = 1))]
    pub size: Option<i32>,
    pub amenities: Option<Vec<String>>,
    #[serde(default, deserialize_with = "clearable")]
    pub connects_to: Option<Option<String>>,
}

impl From<UpdateRoomRequest> for RoomUpdate {
    fn from(req: UpdateRoomRequest) -> Self {
        Self {
            name: req.name,
            name_en: req.name_en,
            name_zh: req.name_zh,
            description: req.description,
            description_en: req.description_en,
            description_zh: req.description_zh,
            room_type: req.room_type,
            max_guests: req.max_guests,
            size_sqm: req.size,
            amenities: req.amenities,
            connects_to: req.connects_to,
        }
    }
}
