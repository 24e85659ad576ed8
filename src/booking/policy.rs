//! Occupying-status policies.
//!
//! Guest-facing queries treat CONFIRMED and COMPLETED bookings as blocking,
//! while booking creation blocks on PENDING and CONFIRMED. Both sets are
//! configuration, not per-call-site literals.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::models::BookingStatus;

/// Set of booking statuses that occupy a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyPolicy {
    statuses: BTreeSet<BookingStatus>,
}

impl OccupancyPolicy {
    pub fn new(statuses: impl IntoIterator<Item = BookingStatus>) -> Self {
        Self {
            statuses: statuses.into_iter().collect(),
        }
    }

    /// CONFIRMED + COMPLETED
    pub fn guest_query() -> Self {
        Self::new([BookingStatus::Confirmed, BookingStatus::Completed])
    }

    /// PENDING + CONFIRMED
    pub fn creation() -> Self {
        Self::new([BookingStatus::Pending, BookingStatus::Confirmed])
    }

    pub fn occupies(&self, status: BookingStatus) -> bool {
        self.statuses.contains(&status)
    }

    pub fn statuses(&self) -> Vec<BookingStatus> {
        self.statuses.iter().copied().collect()
    }
}

impl fmt::Display for OccupancyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.statuses.iter().map(|s| s.as_str()).collect();
        write!(f, "{}", names.join(","))
    }
}

/// Parses a comma-separated status list such as `CONFIRMED,COMPLETED`.
impl FromStr for OccupancyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let statuses = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse::<BookingStatus>)
            .collect::<Result<BTreeSet<_>, _>>()?;

        if statuses.is_empty() {
            return Err("occupancy policy needs at least one status".to_string());
        }
        if statuses.contains(&BookingStatus::Cancelled) {
            return Err("CANCELLED bookings can never occupy a room".to_string());
        }
        Ok(Self { statuses })
    }
}

/// The two policies the engine applies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityPolicies {
    /// Availability checks, calendars
    pub query: OccupancyPolicy,
    /// Booking creation and room search
    pub creation: OccupancyPolicy,
}

impl Default for AvailabilityPolicies {
    fn default() -> Self {
        Self {
            query: OccupancyPolicy::guest_query(),
            creation: OccupancyPolicy::creation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policies() {
        let policies = AvailabilityPolicies::default();
        assert!(policies.query.occupies(BookingStatus::Confirmed));
        assert!(policies.query.occupies(BookingStatus::Completed));
        assert!(!policies.query.occupies(BookingStatus::Pending));

        assert!(policies.creation.occupies(BookingStatus::Pending));
        assert!(policies.creation.occupies(BookingStatus::Confirmed));
        assert!(!policies.creation.occupies(BookingStatus::Completed));

        for policy in [&policies.query, &policies.creation] {
            assert!(!policy.occupies(BookingStatus::Cancelled));
        }
    }

    #[test]
    fn test_parse_policy() {
        let policy: OccupancyPolicy = "confirmed, completed".parse().unwrap();
        assert_eq!(policy, OccupancyPolicy::guest_query());
        assert_eq!(policy.to_string(), "CONFIRMED,COMPLETED");
    }

    #[test]
    fn test_parse_policy_rejects_bad_input() {
        assert!("".parse::<OccupancyPolicy>().is_err());
        assert!("PENDING,CANCELLED".parse::<OccupancyPolicy>().is_err());
        assert!("PENDING,HELD".parse::<OccupancyPolicy>().is_err());
    }
}
