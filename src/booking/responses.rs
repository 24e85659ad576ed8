//! Response DTOs for booking API endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::pagination::Pagination;

use super::calculators::{PricingOptions, PricingResult};
use super::models::{Booking, BookingStatus, Room, RoomType};
use super::reports::{CustomerDetail, CustomerStatistics, CustomerSummary, RoomStats};
use super::services::{AdminRoom, CalendarDay, ConflictInfo, RoomDetail, RoomListing};

/// Room as shown to guests and admins
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
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
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub is_active: bool,
    pub connects_to: Option<String>,
}

impl From<Room> for RoomResponse {
    fn from(room: Room) -> Self {
        Self {
            id: room.id,
            room_number: room.room_number,
            name: room.name,
            name_en: room.name_en,
            name_zh: room.name_zh,
            description: room.description,
            description_en: room.description_en,
            description_zh: room.description_zh,
            room_type: room.room_type,
            max_guests: room.max_guests,
            size_sqm: room.size_sqm,
            amenities: room.amenities.0,
            images: room.images.0,
            is_active: room.is_active,
            connects_to: room.connects_to,
        }
    }
}

/// Room list entry with its 1-adult teaser price
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryResponse {
    #[serde(flatten)]
    pub room: RoomResponse,
    pub min_price: i64,
}

impl From<RoomListing> for RoomSummaryResponse {
    fn from(listing: RoomListing) -> Self {
        Self {
            room: listing.room.into(),
            min_price: listing.minimum_price,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RoomListResponse {
    pub rooms: Vec<RoomSummaryResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailResponse {
    #[serde(flatten)]
    pub room: RoomResponse,
    pub pricing_options: PricingOptions,
}

impl From<RoomDetail> for RoomDetailResponse {
    fn from(detail: RoomDetail) -> Self {
        Self {
            room: detail.room.into(),
            pricing_options: detail.pricing,
        }
    }
}

/// Response for the availability calendar
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarResponse {
    pub booked_dates: Vec<CalendarDay>,
}

/// Response for an availability check
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub available: bool,
    pub conflicting_bookings: Vec<ConflictInfo>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
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

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            room_id: b.room_id,
            check_in: b.check_in,
            check_out: b.check_out,
            adults: b.adults,
            children: b.children,
            infants: b.infants,
            guest_name: b.guest_name,
            guest_email: b.guest_email,
            guest_phone: b.guest_phone,
            total_price: b.total_price,
            status: b.status,
            notes: b.notes,
            user_id: b.user_id,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

/// Response for a created booking
#[derive(Debug, Serialize)]
pub struct CreateBookingResponse {
    pub booking: BookingResponse,
    pub pricing: PricingResult,
}

#[derive(Debug, Serialize)]
pub struct BookingListResponse {
    pub bookings: Vec<BookingResponse>,
}

/// Bookings of one signed-in guest
#[derive(Debug, Serialize)]
pub struct UserBookingsResponse {
    pub bookings: Vec<BookingResponse>,
    pub total: usize,
}

/// Room in the admin list, inactive rooms included
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRoomResponse {
    #[serde(flatten)]
    pub room: RoomResponse,
    pub stats: RoomStats,
}

impl From<AdminRoom> for AdminRoomResponse {
    fn from(admin: AdminRoom) -> Self {
        Self {
            room: admin.room.into(),
            stats: admin.stats,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdminRoomListResponse {
    pub rooms: Vec<AdminRoomResponse>,
}

#[derive(Debug, Serialize)]
pub struct CustomerListResponse {
    pub customers: Vec<CustomerSummary>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct CustomerDetailResponse {
    #[serde(flatten)]
    pub customer: CustomerSummary,
    pub statistics: CustomerStatistics,
    pub bookings: Vec<BookingResponse>,
}

impl From<CustomerDetail> for CustomerDetailResponse {
    fn from(detail: CustomerDetail) -> Self {
        Self {
            customer: detail.summary,
            statistics: detail.statistics,
            bookings: detail.bookings.into_iter().map(Into::into).collect(),
        }
    }
}

/// Generic error response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
