//! Donor administration.

use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::errors::AppError;
use crate::models::donor::{CreateDonor, Donor, UpdateDonor};

pub async fn list(pool: &PgPool) -> Result<Vec<Donor>, AppError> {
    let rows = sqlx::query_as::<_, Donor>("SELECT * FROM donors ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Donor, AppError> {
    sqlx::query_as::<_, Donor>("SELECT * FROM donors WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Donor not found".to_string()))
}

pub async fn create(pool: &PgPool, input: &CreateDonor) -> Result<Donor, AppError> {
    let donor = sqlx::query_as::<_, Donor>(
        r#"
        INSERT INTO donors (id, name, registration_number, donor_type)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(input.name.trim())
    .bind(input.registration_number.trim())
    .bind(input.donor_type)
    .fetch_one(pool)
    .await
    .map_err(|e| map_duplicate(e, &input.registration_number))?;

    tracing::info!(donor_id = %donor.id, "Admin created donor");
    Ok(donor)
}

pub async fn update(pool: &PgPool, id: Uuid, input: &UpdateDonor) -> Result<Donor, AppError> {
    let existing = find_by_id(pool, id).await?;

    let donor = sqlx::query_as::<_, Donor>(
        r#"
        UPDATE donors SET
            name = COALESCE($2, name),
            registration_number = COALESCE($3, registration_number),
            donor_type = COALESCE($4, donor_type),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(existing.id)
    .bind(input.name.as_deref().map(str::trim))
    .bind(input.registration_number.as_deref().map(str::trim))
    .bind(input.donor_type)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        map_duplicate(
            e,
            input
                .registration_number
                .as_deref()
                .unwrap_or(&existing.registration_number),
        )
    })?;

    tracing::info!(donor_id = %donor.id, "Admin updated donor");
    Ok(donor)
}

/// Delete a donor with no recorded donations.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM donors WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| {
            if db::is_foreign_key_violation(&e) {
                AppError::Validation("Donor still has donations".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Donor not found".to_string()));
    }
    tracing::info!(donor_id = %id, "Admin deleted donor");
    Ok(())
}

fn map_duplicate(e: sqlx::Error, registration_number: &str) -> AppError {
    if db::is_unique_violation(&e) {
        AppError::Validation(format!(
            "Donor with registration number '{registration_number}' already exists"
        ))
    } else {
        AppError::Database(e)
    }
}
