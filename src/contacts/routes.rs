//! Contact form route handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiQuery};
use crate::pagination::Pagination;
use crate::AppState;

use super::models::{
    Contact, ContactListQuery, ContactListResponse, CreateContactRequest, CreateContactResponse,
    UpdateContactRequest,
};
use super::queries;

pub fn router() -> Router<AppState> {
    Router::new().route("/contacts", post(create))
}

/// Back-office routes, nested under `/api/admin`
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/contacts", get(list))
        .route("/contacts/:id", get(detail).patch(update).delete(remove))
}

fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| AppError::NotFound(format!("contact not found: {}", id)))
}

/// Contact form submission
pub async fn create(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateContactRequest>,
) -> Result<(StatusCode, Json<CreateContactResponse>)> {
    let req = req.normalized();
    req.validate()?;

    let contact = queries::insert_contact(&state.db, &req).await?;
    info!(contact_id = %contact.id, "Contact message received");

    Ok((
        StatusCode::CREATED,
        Json(CreateContactResponse {
            success: true,
            contact_id: contact.id,
        }),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ContactListQuery>,
) -> Result<Json<ContactListResponse>> {
    let (page, limit) = query.page_and_limit();
    let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let total = queries::count_contacts(&state.db, query.status, search).await?;
    let pagination = Pagination::new(page, limit, total);
    let contacts =
        queries::list_contacts(&state.db, query.status, search, limit, pagination.offset()).await?;

    Ok(Json(ContactListResponse {
        contacts,
        pagination,
    }))
}

pub async fn detail(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Contact>> {
    let id = parse_id(&id)?;
    let contact = queries::get_contact(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("contact not found: {}", id)))?;
    Ok(Json(contact))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateContactRequest>,
) -> Result<Json<Contact>> {
    let id = parse_id(&id)?;
    let contact = queries::update_contact(&state.db, id, req.status, req.notes.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("contact not found: {}", id)))?;
    info!(contact_id = %id, status = ?contact.status, "Contact updated");
    Ok(Json(contact))
}

pub async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    let id = parse_id(&id)?;
    if !queries::delete_contact(&state.db, id).await? {
        return Err(AppError::NotFound(format!("contact not found: {}", id)));
    }
    info!(contact_id = %id, "Contact deleted");
    Ok(StatusCode::NO_CONTENT)
}
