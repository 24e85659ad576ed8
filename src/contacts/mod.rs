//! Contact form messages and their admin handling.

pub mod models;
pub mod queries;
pub mod routes;

pub use models::{Contact, ContactStatus};
pub use routes::{admin_router, router};
