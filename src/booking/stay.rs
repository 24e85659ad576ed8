//! Date-only stay values.
//!
//! Every availability comparison and calendar expansion goes through these
//! types, so there is no time-of-day or timezone component anywhere in the
//! booking math. Check-out is exclusive: a stay of `[25th, 27th)` occupies
//! the nights of the 25th and 26th.

use chrono::{Datelike, Days, FixedOffset, Months, NaiveDate, Utc};
use serde::Serialize;

use super::services::BookingError;

/// Longest stay accepted from a guest
pub const MAX_NIGHTS: i64 = 365;

/// A half-open `[check_in, check_out)` date range of at least one night
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StayDates {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl StayDates {
    /// Build a stay of 1 to `MAX_NIGHTS` nights.
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, BookingError> {
        if check_out <= check_in {
            return Err(BookingError::Validation(
                "check-out date must be after check-in date".to_string(),
            ));
        }
        if (check_out - check_in).num_days() > MAX_NIGHTS {
            return Err(BookingError::Validation(format!(
                "a stay may not exceed {} nights",
                MAX_NIGHTS
            )));
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// Reject stays starting before `today`.
    pub fn ensure_not_past(&self, today: NaiveDate) -> Result<(), BookingError> {
        if self.check_in < today {
            return Err(BookingError::Validation(format!(
                "check-in date {} is in the past (today is {})",
                self.check_in, today
            )));
        }
        Ok(())
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Half-open overlap: touching at a boundary is not an overlap.
    pub fn overlaps(&self, other: &StayDates) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }

    /// The calendar month holding `date`, as `[1st, 1st of next month)`.
    pub fn month_containing(date: NaiveDate) -> StayDates {
        let check_in = date
            .checked_sub_days(Days::new(u64::from(date.day0())))
            .unwrap_or(date);
        StayDates {
            check_in,
            check_out: check_in
                .checked_add_months(Months::new(1))
                .unwrap_or(NaiveDate::MAX),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.check_in <= date && date < self.check_out
    }

    /// The nights shared with `other`, if any.
    pub fn intersection(&self, other: &StayDates) -> Option<StayDates> {
        let check_in = self.check_in.max(other.check_in);
        let check_out = self.check_out.min(other.check_out);
        (check_in < check_out).then_some(StayDates {
            check_in,
            check_out,
        })
    }

    /// Every occupied night, ascending. Excludes the check-out date.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.check_out;
        self.check_in.iter_days().take_while(move |d| *d < end)
    }
}

/// Inclusive calendar window `[start, end]` for availability projection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl CalendarWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, BookingError> {
        if end < start {
            return Err(BookingError::Validation(
                "end date must not be before start date".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// The window as a half-open stay, for overlap queries.
    pub fn as_stay(&self) -> StayDates {
        StayDates {
            check_in: self.start,
            check_out: self
                .end
                .checked_add_days(Days::new(1))
                .unwrap_or(NaiveDate::MAX),
        }
    }
}

/// Source of "today" for past-date validation
#[derive(Debug, Clone, Copy)]
pub enum HotelClock {
    /// Current date at the hotel's UTC offset
    Offset(FixedOffset),
    /// A pinned date
    Fixed(NaiveDate),
}

impl HotelClock {
    pub fn today(&self) -> NaiveDate {
        match self {
            HotelClock::Offset(offset) => Utc::now().with_timezone(offset).date_naive(),
            HotelClock::Fixed(date) => *date,
        }
    }
}
