//! Back-office aggregates over bookings.
//!
//! Pure functions, like `calculators`: the engine loads bookings and rooms
//! and hands them here. Revenue and occupancy only count stays that earn
//! money (CONFIRMED and COMPLETED), attributed by stay date.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::models::{Booking, BookingStatus, Room, RoomType};
use super::stay::StayDates;

fn earns(booking: &Booking) -> bool {
    matches!(booking.status, BookingStatus::Confirmed | BookingStatus::Completed)
}

/// `part / whole` as a rounded percentage; 0 for an empty whole
fn percent(part: i64, whole: i64) -> i64 {
    if whole <= 0 {
        return 0;
    }
    (part * 100 + whole / 2) / whole
}

/// Nights of earning stays falling inside `month`
fn occupied_nights<'a>(bookings: impl Iterator<Item = &'a Booking>, month: &StayDates) -> i64 {
    bookings
        .filter(|b| earns(b))
        .filter_map(|b| b.stay().intersection(month))
        .map(|stay| stay.nights())
        .sum()
}

/// One guest e-mail with its booking totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub email: String,
    /// Name and phone from the latest booking
    pub name: String,
    pub phone: String,
    pub total_bookings: i64,
    /// Sum over bookings that were not cancelled
    pub total_spent: i64,
    pub first_booking: DateTime<Utc>,
    pub last_booking: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerStatistics {
    pub total_bookings: i64,
    pub total_spent: i64,
    pub average_booking_value: i64,
    pub confirmed_bookings: i64,
    pub cancelled_bookings: i64,
    pub completed_bookings: i64,
    /// Room types booked, most frequent first
    pub favorite_room_types: Vec<RoomType>,
}

#[derive(Debug, Clone)]
pub struct CustomerDetail {
    pub summary: CustomerSummary,
    pub statistics: CustomerStatistics,
    /// Newest first
    pub bookings: Vec<Booking>,
}

/// Summarize one customer's bookings. `None` when there are none.
fn summarize(email: &str, bookings: &[&Booking]) -> Option<CustomerSummary> {
    let latest = bookings.iter().max_by_key(|b| b.created_at)?;
    let first = bookings.iter().map(|b| b.created_at).min()?;

    Some(CustomerSummary {
        email: email.to_string(),
        name: latest.guest_name.clone(),
        phone: latest.guest_phone.clone(),
        total_bookings: bookings.len() as i64,
        total_spent: bookings
            .iter()
            .filter(|b| b.status != BookingStatus::Cancelled)
            .map(|b| b.total_price)
            .sum(),
        first_booking: first,
        last_booking: latest.created_at,
    })
}

/// Group bookings by guest e-mail, most recently active customer first.
pub fn customer_summaries(bookings: &[Booking]) -> Vec<CustomerSummary> {
    let mut by_email: BTreeMap<&str, Vec<&Booking>> = BTreeMap::new();
    for booking in bookings {
        by_email.entry(booking.guest_email.as_str()).or_default().push(booking);
    }

    let mut customers: Vec<CustomerSummary> = by_email
        .into_iter()
        .filter_map(|(email, bookings)| summarize(email, &bookings))
        .collect();
    customers.sort_by(|a, b| b.last_booking.cmp(&a.last_booking).then_with(|| a.email.cmp(&b.email)));
    customers
}

/// Full history of one customer. `bookings` must all share `email`.
pub fn customer_detail(email: &str, mut bookings: Vec<Booking>, rooms: &[Room]) -> Option<CustomerDetail> {
    bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let summary = summarize(email, &bookings.iter().collect::<Vec<_>>())?;

    let count = |status: BookingStatus| bookings.iter().filter(|b| b.status == status).count() as i64;

    let mut type_counts: Vec<(RoomType, usize)> = Vec::new();
    for booking in &bookings {
        let Some(room) = rooms.iter().find(|r| r.id == booking.room_id) else {
            continue;
        };
        match type_counts.iter_mut().find(|(t, _)| *t == room.room_type) {
            Some((_, n)) => *n += 1,
            None => type_counts.push((room.room_type, 1)),
        }
    }
    // Stable sort keeps first-seen order between ties
    type_counts.sort_by(|a, b| b.1.cmp(&a.1));

    let statistics = CustomerStatistics {
        total_bookings: summary.total_bookings,
        total_spent: summary.total_spent,
        average_booking_value: if summary.total_bookings > 0 {
            summary.total_spent / summary.total_bookings
        } else {
            0
        },
        confirmed_bookings: count(BookingStatus::Confirmed),
        cancelled_bookings: count(BookingStatus::Cancelled),
        completed_bookings: count(BookingStatus::Completed),
        favorite_room_types: type_counts.into_iter().map(|(t, _)| t).collect(),
    };

    Some(CustomerDetail {
        summary,
        statistics,
        bookings,
    })
}

/// Booking figures of one room for the admin room list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStats {
    pub total_bookings: i64,
    pub confirmed_bookings: i64,
    /// Earning stays checking in this month
    pub monthly_bookings: i64,
    pub monthly_revenue: i64,
    /// Percentage of this month's nights sold
    pub occupancy_rate: i64,
}

pub fn room_stats(room_id: &str, bookings: &[Booking], month: &StayDates) -> RoomStats {
    let room_bookings: Vec<&Booking> = bookings.iter().filter(|b| b.room_id == room_id).collect();
    let this_month: Vec<&Booking> = room_bookings
        .iter()
        .copied()
        .filter(|b| earns(b) && month.contains(b.check_in))
        .collect();

    RoomStats {
        total_bookings: room_bookings.len() as i64,
        confirmed_bookings: room_bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Confirmed)
            .count() as i64,
        monthly_bookings: this_month.len() as i64,
        monthly_revenue: this_month.iter().map(|b| b.total_price).sum(),
        occupancy_rate: percent(occupied_nights(room_bookings.into_iter(), month), month.nights()),
    }
}

/// Headline numbers for the admin dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_bookings: i64,
    pub pending_bookings: i64,
    pub today_checkins: i64,
    pub today_checkouts: i64,
    /// Earning stays checking in this month
    pub monthly_revenue: i64,
    /// Percentage of this month's room-nights sold across `room_count` rooms
    pub occupancy_rate: i64,
}

pub fn dashboard_stats(bookings: &[Booking], today: NaiveDate, room_count: usize) -> DashboardStats {
    let month = StayDates::month_containing(today);
    let live: Vec<&Booking> = bookings
        .iter()
        .filter(|b| b.status != BookingStatus::Cancelled)
        .collect();

    DashboardStats {
        total_bookings: bookings.len() as i64,
        pending_bookings: bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Pending)
            .count() as i64,
        today_checkins: live.iter().filter(|b| b.check_in == today).count() as i64,
        today_checkouts: live.iter().filter(|b| b.check_out == today).count() as i64,
        monthly_revenue: bookings
            .iter()
            .filter(|b| earns(b) && month.contains(b.check_in))
            .map(|b| b.total_price)
            .sum(),
        occupancy_rate: percent(
            occupied_nights(bookings.iter(), &month),
            room_count as i64 * month.nights(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use sqlx::types::Json;
    use uuid::Uuid;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn booking(
        room_id: &str,
        email: &str,
        stay: (NaiveDate, NaiveDate),
        status: BookingStatus,
        total_price: i64,
        created_days_ago: i64,
    ) -> Booking {
        let created = Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap() - Duration::days(created_days_ago);
        Booking {
            id: Uuid::new_v4(),
            room_id: room_id.to_string(),
            check_in: stay.0,
            check_out: stay.1,
            adults: 2,
            children: 0,
            infants: 0,
            guest_name: format!("Guest {}", created_days_ago),
            guest_email: email.to_string(),
            guest_phone: "090-1234-5678".to_string(),
            total_price,
            status,
            notes: None,
            user_id: None,
            created_at: created,
            updated_at: created,
        }
    }

    fn room(id: &str, room_type: RoomType) -> Room {
        Room {
            id: id.to_string(),
            room_number: id.trim_start_matches("room-").to_string(),
            name: id.to_string(),
            name_en: id.to_string(),
            name_zh: id.to_string(),
            description: String::new(),
            description_en: String::new(),
            description_zh: String::new(),
            room_type,
            max_guests: 4,
            size_sqm: 20,
            amenities: Json(vec![]),
            images: Json(vec![]),
            is_active: true,
            connects_to: None,
        }
    }

    // ==================== customer tests ====================

    #[test]
    fn test_customer_summaries_group_by_email() {
        let bookings = vec![
            booking("room-201", "a@example.com", (date(12, 10), date(12, 12)), BookingStatus::Confirmed, 20000, 30),
            booking("room-202", "a@example.com", (date(12, 20), date(12, 21)), BookingStatus::Cancelled, 9000, 5),
            booking("room-201", "b@example.com", (date(12, 14), date(12, 15)), BookingStatus::Pending, 12000, 10),
        ];

        let customers = customer_summaries(&bookings);
        assert_eq!(customers.len(), 2);

        // a@ booked most recently
        assert_eq!(customers[0].email, "a@example.com");
        assert_eq!(customers[0].total_bookings, 2);
        assert_eq!(customers[0].total_spent, 20000);
        assert_eq!(customers[0].name, "Guest 5");
        assert!(customers[0].first_booking < customers[0].last_booking);
        assert_eq!(customers[1].email, "b@example.com");
    }

    #[test]
    fn test_customer_detail_statistics() {
        let rooms = vec![room("room-201", RoomType::Corner), room("room-202", RoomType::Standard)];
        let bookings = vec![
            booking("room-202", "a@example.com", (date(10, 1), date(10, 2)), BookingStatus::Completed, 10000, 60),
            booking("room-201", "a@example.com", (date(11, 1), date(11, 3)), BookingStatus::Completed, 24000, 40),
            booking("room-201", "a@example.com", (date(12, 10), date(12, 12)), BookingStatus::Confirmed, 20000, 20),
            booking("room-202", "a@example.com", (date(12, 20), date(12, 21)), BookingStatus::Cancelled, 9000, 5),
        ];

        let detail = customer_detail("a@example.com", bookings, &rooms).unwrap();
        let stats = &detail.statistics;
        assert_eq!(stats.total_bookings, 4);
        assert_eq!(stats.total_spent, 54000);
        assert_eq!(stats.average_booking_value, 13500);
        assert_eq!(stats.confirmed_bookings, 1);
        assert_eq!(stats.cancelled_bookings, 1);
        assert_eq!(stats.completed_bookings, 2);
        assert_eq!(stats.favorite_room_types, vec![RoomType::Standard, RoomType::Corner]);
        assert_eq!(detail.bookings[0].status, BookingStatus::Cancelled);
    }

    #[test]
    fn test_customer_detail_without_bookings() {
        assert!(customer_detail("nobody@example.com", vec![], &[]).is_none());
    }

    // ==================== room and dashboard tests ====================

    #[test]
    fn test_room_stats() {
        let december = StayDates::month_containing(date(12, 1));
        let bookings = vec![
            // Three nights in December, one spills over from November
            booking("room-201", "a@example.com", (date(11, 30), date(12, 2)), BookingStatus::Completed, 24000, 40),
            booking("room-201", "b@example.com", (date(12, 10), date(12, 12)), BookingStatus::Confirmed, 20000, 20),
            booking("room-201", "c@example.com", (date(12, 15), date(12, 18)), BookingStatus::Pending, 30000, 3),
            booking("room-202", "d@example.com", (date(12, 1), date(12, 31)), BookingStatus::Confirmed, 300000, 10),
        ];

        let stats = room_stats("room-201", &bookings, &december);
        assert_eq!(stats.total_bookings, 3);
        assert_eq!(stats.confirmed_bookings, 1);
        assert_eq!(stats.monthly_bookings, 1);
        assert_eq!(stats.monthly_revenue, 20000);
        assert_eq!(stats.occupancy_rate, 10); // 3 of 31 nights
    }

    #[test]
    fn test_dashboard_stats() {
        let today = date(12, 10);
        let bookings = vec![
            booking("room-201", "a@example.com", (date(12, 10), date(12, 12)), BookingStatus::Confirmed, 20000, 20),
            booking("room-202", "b@example.com", (date(12, 8), date(12, 10)), BookingStatus::Completed, 16000, 25),
            booking("room-203", "c@example.com", (date(12, 10), date(12, 11)), BookingStatus::Cancelled, 9000, 3),
            booking("room-204", "d@example.com", (date(12, 24), date(12, 26)), BookingStatus::Pending, 24000, 1),
        ];

        let stats = dashboard_stats(&bookings, today, 2);
        assert_eq!(stats.total_bookings, 4);
        assert_eq!(stats.pending_bookings, 1);
        assert_eq!(stats.today_checkins, 1);
        assert_eq!(stats.today_checkouts, 1);
        assert_eq!(stats.monthly_revenue, 36000);
        assert_eq!(stats.occupancy_rate, 6); // 4 of 62 room-nights
    }

    #[test]
    fn test_dashboard_stats_without_rooms() {
        let stats = dashboard_stats(&[], date(12, 10), 0);
        assert_eq!(stats.occupancy_rate, 0);
        assert_eq!(stats.total_bookings, 0);
    }
}
