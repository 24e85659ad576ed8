//! Room availability and pricing engine.
//!
//! Answers whether a room is free for a half-open `[check_in, check_out)`
//! stay, prices stays from per-room adult tiers plus a flat child rate, and
//! creates bookings with an atomic check-and-insert.

pub mod calculators;
pub mod memory;
pub mod models;
pub mod policy;
pub mod queries;
pub mod reports;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;
pub mod stay;
pub mod store;

// Re-export commonly used items
pub use calculators::{GuestBreakdown, PricingResult};
pub use memory::InMemoryBookingStore;
pub use policy::{AvailabilityPolicies, OccupancyPolicy};
pub use routes::{admin_router, router};
pub use services::{BookingEngine, BookingError, BookingEvent, ConflictInfo};
pub use stay::{HotelClock, StayDates};
pub use store::{BookingFilter, BookingStore, PgBookingStore};
