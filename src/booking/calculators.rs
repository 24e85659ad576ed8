//! Core availability and pricing functions.
//!
//! Pure functions over already-loaded rows - no database access. The
//! engine in `services` loads tiers and bookings through the store and
//! hands them here.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use super::models::{Booking, GuestType, RoomPricing};
use super::policy::OccupancyPolicy;
use super::services::BookingError;
use super::stay::{CalendarWindow, StayDates};

/// Guest composition of a stay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GuestBreakdown {
    pub adults: i32,
    pub children: i32,
    pub infants: i32,
}

impl GuestBreakdown {
    pub fn validate(&self) -> Result<(), BookingError> {
        if self.adults < 1 {
            return Err(BookingError::Validation(
                "at least one adult is required".to_string(),
            ));
        }
        if self.children < 0 || self.infants < 0 {
            return Err(BookingError::Validation(
                "guest counts cannot be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Guests that take up a bed. Infants are not counted.
    pub fn occupants(&self) -> i32 {
        self.adults + self.children
    }
}

/// One line of an itemized receipt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub count: i32,
    pub unit_price: i64,
    pub total_price: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PricingBreakdown {
    pub adults: LineItem,
    pub children: LineItem,
    pub infants: LineItem,
}

/// Result of a stay price calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    pub total_price: i64,
    pub breakdown: PricingBreakdown,
    pub nights: i64,
}

/// A configured tier as shown on a room's detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingOption {
    pub guest_type: GuestType,
    pub guest_count: i32,
    pub price: i64,
}

/// All tiers of a room partitioned by guest type, ordered by guest count
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PricingOptions {
    pub adult: Vec<PricingOption>,
    pub child: Vec<PricingOption>,
}

fn find_tier(tiers: &[RoomPricing], guest_type: GuestType, guest_count: i32) -> Option<&RoomPricing> {
    tiers
        .iter()
        .find(|t| t.guest_type == guest_type && t.guest_count == guest_count)
}

fn price_overflow() -> BookingError {
    BookingError::Validation("stay price is too large to calculate".to_string())
}

/// `count * unit_price * nights`, rejecting totals that do not fit in an i64
fn line_total(count: i32, unit_price: i64, nights: i64) -> Result<i64, BookingError> {
    i64::from(count)
        .checked_mul(unit_price)
        .and_then(|per_night| per_night.checked_mul(nights))
        .ok_or_else(price_overflow)
}

/// Calculate the total price of a stay.
///
/// The adult unit price comes from the tier matching the exact adult count;
/// a missing tier is an error, never interpolated. Children pay the flat
/// child tier (0 when unconfigured). Infants are free.
///
/// # Examples
/// With an adult-2 tier of 8000 yen, two adults for three nights cost
/// `2 * 8000 * 3 = 48000` yen.
pub fn calculate_room_price(
    room_id: &str,
    tiers: &[RoomPricing],
    guests: &GuestBreakdown,
    nights: i64,
) -> Result<PricingResult, BookingError> {
    let adult_tier = find_tier(tiers, GuestType::Adult, guests.adults).ok_or_else(|| {
        BookingError::NotConfigured {
            room_id: room_id.to_string(),
            guest_type: GuestType::Adult,
            guest_count: guests.adults,
        }
    })?;

    // The child tier is count-independent and always stored at count 1
    let child_unit_price = find_tier(tiers, GuestType::Child, 1)
        .map(|t| t.price)
        .unwrap_or(0);

    let adult_total = line_total(guests.adults, adult_tier.price, nights)?;
    let child_total = line_total(guests.children, child_unit_price, nights)?;
    let infant_total = 0;
    let total_price = adult_total.checked_add(child_total).ok_or_else(price_overflow)?;

    Ok(PricingResult {
        total_price,
        breakdown: PricingBreakdown {
            adults: LineItem {
                count: guests.adults,
                unit_price: adult_tier.price,
                total_price: adult_total,
            },
            children: LineItem {
                count: guests.children,
                unit_price: child_unit_price,
                total_price: child_total,
            },
            infants: LineItem {
                count: guests.infants,
                unit_price: 0,
                total_price: infant_total,
            },
        },
        nights,
    })
}

/// Partition a room's tiers by guest type for display.
pub fn pricing_options(tiers: &[RoomPricing]) -> PricingOptions {
    let mut options = PricingOptions::default();

    for tier in tiers {
        let option = PricingOption {
            guest_type: tier.guest_type,
            guest_count: tier.guest_count,
            price: tier.price,
        };
        match tier.guest_type {
            GuestType::Adult => options.adult.push(option),
            GuestType::Child => options.child.push(option),
        }
    }

    options.adult.sort_by_key(|o| o.guest_count);
    options.child.sort_by_key(|o| o.guest_count);
    options
}

/// The 1-adult nightly rate, used as teaser price and sort key.
///
/// Returns `NotConfigured` when the room has no 1-adult tier; callers that
/// only need a teaser may treat that as 0.
pub fn minimum_price(room_id: &str, tiers: &[RoomPricing]) -> Result<i64, BookingError> {
    find_tier(tiers, GuestType::Adult, 1)
        .map(|t| t.price)
        .ok_or_else(|| BookingError::NotConfigured {
            room_id: room_id.to_string(),
            guest_type: GuestType::Adult,
            guest_count: 1,
        })
}

/// Bookings that block `stay` under `policy`.
pub fn find_conflicts<'a>(
    bookings: &'a [Booking],
    stay: &StayDates,
    policy: &OccupancyPolicy,
) -> Vec<&'a Booking> {
    bookings
        .iter()
        .filter(|b| policy.occupies(b.status) && b.stay().overlaps(stay))
        .collect()
}

/// Expand occupying bookings into the set of booked dates inside `window`.
///
/// Each booking contributes the dates of `[check_in, check_out)` that fall
/// inside the window. Shared dates appear once and output is ascending.
pub fn booked_dates(
    bookings: &[Booking],
    window: &CalendarWindow,
    policy: &OccupancyPolicy,
) -> Vec<NaiveDate> {
    let visible = window.as_stay();
    let dates: BTreeSet<NaiveDate> = bookings
        .iter()
        .filter(|b| policy.occupies(b.status))
        .filter_map(|b| b.stay().intersection(&visible))
        .flat_map(|stay| stay.dates().collect::<Vec<_>>())
        .collect();

    dates.into_iter().collect()
}
