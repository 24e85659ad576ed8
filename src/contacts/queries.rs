//! Database queries for contact messages

use sqlx::PgPool;
use uuid::Uuid;

use super::models::{Contact, ContactStatus, CreateContactRequest};

pub async fn insert_contact(pool: &PgPool, req: &CreateContactRequest) -> Result<Contact, sqlx::Error> {
    sqlx::query_as::<_, Contact>(
        r#"
        INSERT INTO contacts (id, name, email, message, status)
        VALUES ($1, $2, $3, $4, 'NEW')
        RETURNING id, name, email, message, status, notes, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&req.name)
    .bind(&req.email)
    .bind(&req.message)
    .fetch_one(pool)
    .await
}

pub async fn get_contact(pool: &PgPool, id: Uuid) -> Result<Option<Contact>, sqlx::Error> {
    sqlx::query_as::<_, Contact>(
        r#"
        SELECT id, name, email, message, status, notes, created_at, updated_at
        FROM contacts
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// List contacts newest first, filtered by status and a name/email/message substring
pub async fn list_contacts(
    pool: &PgPool,
    status: Option<ContactStatus>,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Contact>, sqlx::Error> {
    sqlx::query_as::<_, Contact>(
        r#"
        SELECT id, name, email, message, status, notes, created_at, updated_at
        FROM contacts
        WHERE ($1::contact_status IS NULL OR status = $1)
          AND ($2::text IS NULL
               OR name ILIKE '%' || $2 || '%'
               OR email ILIKE '%' || $2 || '%'
               OR message ILIKE '%' || $2 || '%')
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(status)
    .bind(search)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_contacts(
    pool: &PgPool,
    status: Option<ContactStatus>,
    search: Option<&str>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM contacts
        WHERE ($1::contact_status IS NULL OR status = $1)
          AND ($2::text IS NULL
               OR name ILIKE '%' || $2 || '%'
               OR email ILIKE '%' || $2 || '%'
               OR message ILIKE '%' || $2 || '%')
        "#,
    )
    .bind(status)
    .bind(search)
    .fetch_one(pool)
    .await
}

pub async fn update_contact(
    pool: &PgPool,
    id: Uuid,
    status: Option<ContactStatus>,
    notes: Option<&str>,
) -> Result<Option<Contact>, sqlx::Error> {
    sqlx::query_as::<_, Contact>(
        r#"
        UPDATE contacts
        SET status = COALESCE($2, status),
            notes = COALESCE($3, notes),
            updated_at = now()
        WHERE id = $1
        RETURNING id, name, email, message, status, notes, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(status)
    .bind(notes)
    .fetch_optional(pool)
    .await
}

/// Returns false when nothing was deleted
pub async fn delete_contact(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
