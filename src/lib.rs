//! Hotel reservation backend: room availability, stay pricing, bookings and
//! the contact form, served as a JSON API over axum and PostgreSQL.

use std::sync::Arc;

use sqlx::PgPool;

pub mod booking;
pub mod cache;
pub mod config;
pub mod contacts;
pub mod db;
pub mod error;
pub mod extract;
pub mod pagination;
pub mod routes;

use booking::BookingEngine;
use cache::AppCache;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
    pub engine: Arc<BookingEngine>,
}
