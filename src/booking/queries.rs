//! Database queries for the booking engine.
//!
//! Functions are generic over the executor so the same query runs against
//! the pool or inside a transaction (`&mut *tx`).

use sqlx::types::Json;
use sqlx::{PgConnection, PgExecutor};
use uuid::Uuid;

use super::models::{Booking, BookingStatus, PricingTier, Room, RoomPricing, RoomUpdate};
use super::stay::StayDates;
use super::store::BookingFilter;

/// Get a room by id, active or not
pub async fn get_room<'e, E>(executor: E, room_id: &str) -> Result<Option<Room>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Room>(
        r#"
        SELECT
            id, room_number, name, name_en, name_zh,
            description, description_en, description_zh,
            room_type, max_guests, size_sqm, amenities, images,
            is_active, connects_to
        FROM rooms
        WHERE id = $1
        "#,
    )
    .bind(room_id)
    .fetch_optional(executor)
    .await
}

/// Get all active rooms ordered by room number
pub async fn list_active_rooms<'e, E>(executor: E) -> Result<Vec<Room>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Room>(
        r#"
        SELECT
            id, room_number, name, name_en, name_zh,
            description, description_en, description_zh,
            room_type, max_guests, size_sqm, amenities, images,
            is_active, connects_to
        FROM rooms
        WHERE is_active = true
        ORDER BY room_number
        "#,
    )
    .fetch_all(executor)
    .await
}

/// Get every room, active or not, ordered by room number
pub async fn list_rooms<'e, E>(executor: E) -> Result<Vec<Room>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Room>(
        r#"
        SELECT
            id, room_number, name, name_en, name_zh,
            description, description_en, description_zh,
            room_type, max_guests, size_sqm, amenities, images,
            is_active, connects_to
        FROM rooms
        ORDER BY room_number
        "#,
    )
    .fetch_all(executor)
    .await
}

/// Apply an admin edit. Returns None when the room does not exist.
pub async fn update_room<'e, E>(
    executor: E,
    room_id: &str,
    update: &RoomUpdate,
) -> Result<Option<Room>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Room>(
        r#"
        UPDATE rooms
        SET name = COALESCE($2, name),
            name_en = COALESCE($3, name_en),
            name_zh = COALESCE($4, name_zh),
            description = COALESCE($5, description),
            description_en = COALESCE($6, description_en),
            description_zh = COALESCE($7, description_zh),
            room_type = COALESCE($8, room_type),
            max_guests = COALESCE($9, max_guests),
            size_sqm = COALESCE($10, size_sqm),
            amenities = COALESCE($11, amenities),
            connects_to = CASE WHEN $12 THEN $13 ELSE connects_to END,
            updated_at = now()
        WHERE id = $1
        RETURNING
            id, room_number, name, name_en, name_zh,
            description, description_en, description_zh,
            room_type, max_guests, size_sqm, amenities, images,
            is_active, connects_to
        "#,
    )
    .bind(room_id)
    .bind(&update.name)
    .bind(&update.name_en)
    .bind(&update.name_zh)
    .bind(&update.description)
    .bind(&update.description_en)
    .bind(&update.description_zh)
    .bind(update.room_type)
    .bind(update.max_guests)
    .bind(update.size_sqm)
    .bind(update.amenities.clone().map(Json))
    .bind(update.connects_to.is_some())
    .bind(update.connects_to.clone().flatten())
    .fetch_optional(executor)
    .await
}

/// Toggle a room's active flag. Returns false when the room does not exist.
pub async fn set_room_active<'e, E>(
    executor: E,
    room_id: &str,
    active: bool,
) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE rooms
        SET is_active = $2, updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(room_id)
    .bind(active)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Lock a room row for the rest of the transaction.
///
/// Serializes concurrent booking inserts for the same room.
pub async fn lock_room(conn: &mut PgConnection, room_id: &str) -> Result<bool, sqlx::Error> {
    let locked: Option<String> = sqlx::query_scalar(
        r#"
        SELECT id FROM rooms WHERE id = $1 FOR UPDATE
        "#,
    )
    .bind(room_id)
    .fetch_optional(conn)
    .await?;

    Ok(locked.is_some())
}

/// Get every pricing tier of a room
pub async fn get_room_pricing<'e, E>(
    executor: E,
    room_id: &str,
) -> Result<Vec<RoomPricing>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, RoomPricing>(
        r#"
        SELECT id, room_id, guest_type, guest_count, price
        FROM room_pricing
        WHERE room_id = $1
        ORDER BY guest_type, guest_count
        "#,
    )
    .bind(room_id)
    .fetch_all(executor)
    .await
}

pub async fn delete_room_pricing(conn: &mut PgConnection, room_id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM room_pricing WHERE room_id = $1")
        .bind(room_id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}

pub async fn insert_room_pricing(
    conn: &mut PgConnection,
    room_id: &str,
    tier: &PricingTier,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO room_pricing (id, room_id, guest_type, guest_count, price)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(room_id)
    .bind(tier.guest_type)
    .bind(tier.guest_count)
    .bind(tier.price)
    .execute(conn)
    .await?;

    Ok(())
}

/// Find bookings whose `[check_in, check_out)` overlaps `stay`.
///
/// `room_id = None` searches every room.
pub async fn find_overlapping_bookings<'e, E>(
    executor: E,
    room_id: Option<&str>,
    stay: &StayDates,
    statuses: &[BookingStatus],
) -> Result<Vec<Booking>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Booking>(
        r#"
        SELECT
            id, room_id, check_in, check_out,
            adults, children, infants,
            guest_name, guest_email, guest_phone,
            total_price, status, notes, user_id,
            created_at, updated_at
        FROM bookings
        WHERE ($1::text IS NULL OR room_id = $1)
          AND status = ANY($2)
          AND check_in < $4
          AND check_out > $3
        ORDER BY check_in
        "#,
    )
    .bind(room_id)
    .bind(statuses)
    .bind(stay.check_in)
    .bind(stay.check_out)
    .fetch_all(executor)
    .await
}

/// Insert a booking and return the stored row
pub async fn insert_booking<'e, E>(executor: E, booking: &Booking) -> Result<Booking, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Booking>(
        r#"
        INSERT INTO bookings (
            id, room_id, check_in, check_out,
            adults, children, infants,
            guest_name, guest_email, guest_phone,
            total_price, status, notes, user_id,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        RETURNING
            id, room_id, check_in, check_out,
            adults, children, infants,
            guest_name, guest_email, guest_phone,
            total_price, status, notes, user_id,
            created_at, updated_at
        "#,
    )
    .bind(booking.id)
    .bind(&booking.room_id)
    .bind(booking.check_in)
    .bind(booking.check_out)
    .bind(booking.adults)
    .bind(booking.children)
    .bind(booking.infants)
    .bind(&booking.guest_name)
    .bind(&booking.guest_email)
    .bind(&booking.guest_phone)
    .bind(booking.total_price)
    .bind(booking.status)
    .bind(&booking.notes)
    .bind(&booking.user_id)
    .bind(booking.created_at)
    .bind(booking.updated_at)
    .fetch_one(executor)
    .await
}

pub async fn get_booking<'e, E>(executor: E, id: Uuid) -> Result<Option<Booking>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Booking>(
        r#"
        SELECT
            id, room_id, check_in, check_out,
            adults, children, infants,
            guest_name, guest_email, guest_phone,
            total_price, status, notes, user_id,
            created_at, updated_at
        FROM bookings
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Set a booking's status; `notes = None` keeps the existing notes
pub async fn update_booking_status<'e, E>(
    executor: E,
    id: Uuid,
    status: BookingStatus,
    notes: Option<&str>,
) -> Result<Option<Booking>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Booking>(
        r#"
        UPDATE bookings
        SET status = $2,
            notes = COALESCE($3, notes),
            updated_at = now()
        WHERE id = $1
        RETURNING
            id, room_id, check_in, check_out,
            adults, children, infants,
            guest_name, guest_email, guest_phone,
            total_price, status, notes, user_id,
            created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(status)
    .bind(notes)
    .fetch_optional(executor)
    .await
}

/// List bookings matching `filter`, newest first
pub async fn list_bookings<'e, E>(
    executor: E,
    filter: &BookingFilter,
) -> Result<Vec<Booking>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let search = filter.search.as_ref().map(|term| format!("%{}%", term));

    sqlx::query_as::<_, Booking>(
        r#"
        SELECT
            id, room_id, check_in, check_out,
            adults, children, infants,
            guest_name, guest_email, guest_phone,
            total_price, status, notes, user_id,
            created_at, updated_at
        FROM bookings
        WHERE ($1::booking_status IS NULL OR status = $1)
          AND ($2::text IS NULL OR user_id = $2)
          AND ($3::text IS NULL OR guest_email = $3)
          AND ($4::text IS NULL OR guest_name ILIKE $4 OR guest_email ILIKE $4 OR guest_phone ILIKE $4)
        ORDER BY created_at DESC
        "#,
    )
    .bind(filter.status)
    .bind(&filter.user_id)
    .bind(&filter.guest_email)
    .bind(search)
    .fetch_all(executor)
    .await
}

/// Delete a booking. Returns false when it does not exist.
pub async fn delete_booking<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
