//! Booking route handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post, put},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiQuery};
use crate::pagination;
use crate::AppState;

use super::calculators::PricingResult;
use super::reports::DashboardStats;
use super::requests::{
    BookingListQuery, CalculatePriceRequest, CalendarQuery, CheckAvailabilityRequest,
    CreateBookingRequest, CustomerListQuery, RoomListQuery, SetRoomActiveRequest,
    UpdateBookingRequest, UpdatePricingRequest, UpdateRoomRequest, UserBookingsQuery,
};
use super::responses::{
    AdminRoomListResponse, AvailabilityResponse, BookingListResponse, BookingResponse,
    CalendarResponse, CreateBookingResponse, CustomerDetailResponse, CustomerListResponse,
    RoomDetailResponse, RoomListResponse, RoomResponse, UserBookingsResponse,
};
use super::services::BookingRequest;
use super::store::BookingFilter;

/// Guest-facing room and booking routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rooms", get(list_rooms))
        .route("/rooms/:id", get(room_detail))
        .route("/rooms/:id/calculate-price", post(calculate_price))
        .route("/rooms/:id/availability", get(availability_calendar))
        .route("/bookings", get(user_bookings).post(create_booking))
        .route("/bookings/check-availability", post(check_availability))
}

/// Back-office routes, nested under `/api/admin`
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list_bookings))
        .route("/bookings/:id", patch(update_booking).delete(delete_booking))
        .route("/rooms", get(admin_rooms))
        .route("/rooms/:id", patch(update_room))
        .route("/rooms/:id/pricing", put(update_pricing))
        .route("/rooms/:id/active", patch(set_room_active))
        .route("/customers", get(customers))
        .route("/customers/:email", get(customer_detail))
        .route("/dashboard/stats", get(dashboard_stats))
}

fn booking_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| AppError::NotFound(format!("booking not found: {}", id)))
}

/// Room listing with teaser prices
pub async fn list_rooms(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RoomListQuery>,
) -> Result<Json<RoomListResponse>> {
    let search = query.into_search()?;
    let rooms = state.engine.list_rooms(&search).await?;

    Ok(Json(RoomListResponse {
        rooms: rooms.into_iter().map(Into::into).collect(),
    }))
}

/// Room detail with pricing options
pub async fn room_detail(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailResponse>> {
    let detail = state.engine.room_detail(&room_id).await?;
    Ok(Json(detail.into()))
}

pub async fn calculate_price(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    ApiJson(req): ApiJson<CalculatePriceRequest>,
) -> Result<Json<PricingResult>> {
    let result = state
        .engine
        .calculate_price(&room_id, req.guests(), req.check_in, req.check_out)
        .await?;
    Ok(Json(result))
}

/// Booked dates for a month calendar
pub async fn availability_calendar(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    ApiQuery(query): ApiQuery<CalendarQuery>,
) -> Result<Json<CalendarResponse>> {
    let booked_dates = state
        .engine
        .list_availability(&room_id, query.start_date, query.end_date)
        .await?;
    Ok(Json(CalendarResponse { booked_dates }))
}

pub async fn check_availability(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CheckAvailabilityRequest>,
) -> Result<Json<AvailabilityResponse>> {
    let result = state
        .engine
        .check_availability(&req.room_id, req.check_in, req.check_out)
        .await?;

    Ok(Json(AvailabilityResponse {
        available: result.available,
        conflicting_bookings: result.conflicts,
    }))
}

pub async fn create_booking(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<CreateBookingResponse>)> {
    req.validate()?;

    let guests = req.guests();
    let confirmation = state
        .engine
        .create_booking(BookingRequest {
            room_id: req.room_id,
            check_in: req.check_in,
            check_out: req.check_out,
            guests,
            guest_name: req.guest_name,
            guest_email: req.guest_email,
            guest_phone: req.guest_phone,
            user_id: req.user_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateBookingResponse {
            booking: confirmation.booking.into(),
            pricing: confirmation.pricing,
        }),
    ))
}

pub async fn list_bookings(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<BookingListQuery>,
) -> Result<Json<BookingListResponse>> {
    let bookings = state.engine.list_bookings(&query.filter()).await?;
    Ok(Json(BookingListResponse {
        bookings: bookings.into_iter().map(Into::into).collect(),
    }))
}

/// Status change; confirming notifies subscribers of the engine's events
pub async fn update_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateBookingRequest>,
) -> Result<Json<BookingResponse>> {
    let id = booking_id(&id)?;
    let booking = state
        .engine
        .update_booking_status(id, req.status, req.notes.as_deref())
        .await?;
    Ok(Json(booking.into()))
}

pub async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.engine.delete_booking(booking_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// A signed-in guest's own bookings, newest first
pub async fn user_bookings(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UserBookingsQuery>,
) -> Result<Json<UserBookingsResponse>> {
    let bookings = state
        .engine
        .list_bookings(&BookingFilter {
            user_id: Some(query.user_id),
            ..Default::default()
        })
        .await?;

    Ok(Json(UserBookingsResponse {
        total: bookings.len(),
        bookings: bookings.into_iter().map(Into::into).collect(),
    }))
}

/// Every room, inactive ones included, with this month's figures
pub async fn admin_rooms(State(state): State<AppState>) -> Result<Json<AdminRoomListResponse>> {
    let rooms = state.engine.admin_rooms().await?;
    Ok(Json(AdminRoomListResponse {
        rooms: rooms.into_iter().map(Into::into).collect(),
    }))
}

pub async fn update_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    ApiJson(req): ApiJson<UpdateRoomRequest>,
) -> Result<Json<RoomResponse>> {
    req.validate()?;
    let room = state.engine.update_room(&room_id, req.into()).await?;
    Ok(Json(room.into()))
}

/// Guests grouped by e-mail
pub async fn customers(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CustomerListQuery>,
) -> Result<Json<CustomerListResponse>> {
    let (page, limit) = pagination::page_and_limit(query.page, query.limit);
    let all = state.engine.customers(query.search()).await?;
    let (customers, pagination) = pagination::page_of(all, page, limit);

    Ok(Json(CustomerListResponse {
        customers,
        pagination,
    }))
}

pub async fn customer_detail(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<CustomerDetailResponse>> {
    let detail = state.engine.customer(&email).await?;
    Ok(Json(detail.into()))
}

pub async fn dashboard_stats(State(state): State<AppState>) -> Result<Json<DashboardStats>> {
    Ok(Json(state.engine.dashboard_stats().await?))
}

pub async fn update_pricing(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    ApiJson(req): ApiJson<UpdatePricingRequest>,
) -> Result<StatusCode> {
    req.validate()?;
    state.engine.replace_room_pricing(&room_id, req.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_room_active(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    ApiJson(req): ApiJson<SetRoomActiveRequest>,
) -> Result<StatusCode> {
    state.engine.set_room_active(&room_id, req.is_active).await?;
    Ok(StatusCode::NO_CONTENT)
}
