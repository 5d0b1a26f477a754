//! Hospital service: public priority ranking, POC lookup, and admin CRUD.

use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::errors::AppError;
use crate::models::hospital::{CreateHospital, Hospital, HospitalRanking, UpdateHospital};

/// Hospitals ordered by `beds - waiting`, most spare capacity first.
pub async fn ranked(pool: &PgPool) -> Result<Vec<HospitalRanking>, AppError> {
    let hospitals = list(pool).await?;
    Ok(rank(&hospitals))
}

/// Sort by priority score descending; ties keep their input order.
pub fn rank(hospitals: &[Hospital]) -> Vec<HospitalRanking> {
    let mut ranked: Vec<HospitalRanking> =
        hospitals.iter().map(HospitalRanking::from_hospital).collect();
    ranked.sort_by(|a, b| b.priority_score.cmp(&a.priority_score));
    ranked
}

pub async fn list(pool: &PgPool) -> Result<Vec<Hospital>, AppError> {
    let rows = sqlx::query_as::<_, Hospital>("SELECT * FROM hospitals ORDER BY created_at, name")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Hospital, AppError> {
    sqlx::query_as::<_, Hospital>("SELECT * FROM hospitals WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Hospital not found".to_string()))
}

/// The hospital a POC user is linked to, if any.
pub async fn find_by_owner(pool: &PgPool, user_id: Uuid) -> Result<Option<Hospital>, AppError> {
    let hospital = sqlx::query_as::<_, Hospital>("SELECT * FROM hospitals WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(hospital)
}

/// Admin: create a hospital.
pub async fn create(pool: &PgPool, input: &CreateHospital) -> Result<Hospital, AppError> {
    if let Some(user_id) = input.user_id {
        ensure_user_unlinked(pool, user_id, None).await?;
    }

    let hospital = sqlx::query_as::<_, Hospital>(
        r#"
        INSERT INTO hospitals (id, name, phone, current, target, waiting, beds, is_locked, user_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(input.name.trim())
    .bind(input.phone.trim())
    .bind(input.current)
    .bind(input.target)
    .bind(input.waiting)
    .bind(input.beds)
    .bind(input.is_locked)
    .bind(input.user_id)
    .fetch_one(pool)
    .await
    .map_err(|e| map_write_error(e, &input.name))?;

    tracing::info!(hospital_id = %hospital.id, name = %hospital.name, "Admin created hospital");
    Ok(hospital)
}

/// Admin: partial update. Counters set here override the tracked values.
pub async fn update(pool: &PgPool, id: Uuid, input: &UpdateHospital) -> Result<Hospital, AppError> {
    let existing = find_by_id(pool, id).await?;

    if let Some(Some(user_id)) = input.user_id {
        ensure_user_unlinked(pool, user_id, Some(existing.id)).await?;
    }
    let user_id = match input.user_id {
        Some(link) => link,
        None => existing.user_id,
    };

    let hospital = sqlx::query_as::<_, Hospital>(
        r#"
        UPDATE hospitals SET
            name = COALESCE($2, name),
            phone = COALESCE($3, phone),
            current = COALESCE($4, current),
            target = COALESCE($5, target),
            waiting = COALESCE($6, waiting),
            beds = COALESCE($7, beds),
            is_locked = COALESCE($8, is_locked),
            user_id = $9,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(existing.id)
    .bind(input.name.as_deref().map(str::trim))
    .bind(input.phone.as_deref().map(str::trim))
    .bind(input.current)
    .bind(input.target)
    .bind(input.waiting)
    .bind(input.beds)
    .bind(input.is_locked)
    .bind(user_id)
    .fetch_one(pool)
    .await
    .map_err(|e| map_write_error(e, input.name.as_deref().unwrap_or(&existing.name)))?;

    tracing::info!(hospital_id = %hospital.id, "Admin updated hospital");
    Ok(hospital)
}

/// Admin: delete a hospital without donations.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM hospitals WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| {
            if db::is_foreign_key_violation(&e) {
                AppError::Validation("Hospital still has donations".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Hospital not found".to_string()));
    }
    tracing::info!(hospital_id = %id, "Admin deleted hospital");
    Ok(())
}

/// A POC user may own at most one hospital.
async fn ensure_user_unlinked(
    pool: &PgPool,
    user_id: Uuid,
    except_hospital: Option<Uuid>,
) -> Result<(), AppError> {
    let user_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    if !user_exists {
        return Err(AppError::Validation("User not found".to_string()));
    }

    match find_by_owner(pool, user_id).await? {
        Some(owned) if Some(owned.id) != except_hospital => Err(AppError::Validation(format!(
            "User is already linked to hospital '{}'",
            owned.name
        ))),
        _ => Ok(()),
    }
}

fn map_write_error(e: sqlx::Error, name: &str) -> AppError {
    if db::is_unique_violation(&e) {
        AppError::Validation(format!(
            "Hospital '{name}' already exists or the user is already linked"
        ))
    } else if db::is_foreign_key_violation(&e) {
        AppError::Validation("User not found".to_string())
    } else {
        AppError::Database(e)
    }
}
