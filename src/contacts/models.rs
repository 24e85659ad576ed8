//! Contact form models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::pagination::{self, Pagination};

/// Handling state of a contact message from the `contact_status` enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "contact_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactStatus {
    New,
    InProgress,
    Resolved,
}

/// Contact message from contacts
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    pub status: ContactStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public contact form submission
#[derive(Debug, Deserialize, Validate)]
pub struct CreateContactRequest {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, max = 5000, message = "message is required"))]
    pub message: String,
}

impl CreateContactRequest {
    /// Trimmed copy with a lowercased e-mail, validated after normalizing
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            message: self.message.trim().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactResponse {
    pub success: bool,
    pub contact_id: Uuid,
}

/// Admin list filters
#[derive(Debug, Deserialize)]
pub struct ContactListQuery {
    #[serde(default)]
    pub status: Option<ContactStatus>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default = "pagination::default_page")]
    pub page: i64,
    #[serde(default = "pagination::default_limit")]
    pub limit: i64,
}

impl ContactListQuery {
    pub fn page_and_limit(&self) -> (i64, i64) {
        pagination::page_and_limit(self.page, self.limit)
    }
}

#[derive(Debug, Serialize)]
pub struct ContactListResponse {
    pub contacts: Vec<Contact>,
    pub pagination: Pagination,
}

/// Admin update; absent fields are left unchanged
#[derive(Debug, Deserialize)]
pub struct UpdateContactRequest {
    #[serde(default)]
    pub status: Option<ContactStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}
