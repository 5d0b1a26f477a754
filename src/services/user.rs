//! User account administration.

use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::errors::AppError;
use crate::models::user::{CreateUser, UpdateUser, User};
use crate::services::auth::hash_password;

pub async fn list(pool: &PgPool) -> Result<Vec<User>, AppError> {
    let rows = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<User, AppError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Create a new user with hashed password.
pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, AppError> {
    let password_hash = hash_password(&input.password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, name, email, password_hash, account_type)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(input.name.trim())
    .bind(input.email.trim())
    .bind(&password_hash)
    .bind(input.account_type)
    .fetch_one(pool)
    .await
    .map_err(map_duplicate_email)?;

    tracing::info!(user_id = %user.id, role = user.account_type.as_str(), "Admin created user");
    Ok(user)
}

pub async fn update(pool: &PgPool, id: Uuid, input: &UpdateUser) -> Result<User, AppError> {
    let existing = find_by_id(pool, id).await?;
    let password_hash = input.password.as_deref().map(hash_password).transpose()?;

    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            name = COALESCE($2, name),
            email = COALESCE($3, email),
            password_hash = COALESCE($4, password_hash),
            account_type = COALESCE($5, account_type),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(existing.id)
    .bind(input.name.as_deref().map(str::trim))
    .bind(input.email.as_deref().map(str::trim))
    .bind(password_hash)
    .bind(input.account_type)
    .fetch_one(pool)
    .await
    .map_err(map_duplicate_email)?;

    tracing::info!(user_id = %user.id, "Admin updated user");
    Ok(user)
}

/// Delete a user; a hospital it was linked to loses its POC.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    tracing::info!(user_id = %id, "Admin deleted user");
    Ok(())
}

fn map_duplicate_email(e: sqlx::Error) -> AppError {
    if db::is_unique_violation(&e) {
        AppError::Validation("User with this email already exists".to_string())
    } else {
        AppError::Database(e)
    }
}
