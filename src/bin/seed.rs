//! Seed script for development: populates a fresh database with the camp's
//! accounts and partner hospitals.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires `DATABASE_URL` (reads .env). Safe to re-run; existing rows are
//! kept and only passwords are refreshed.

use anyhow::Context;
use bloodcamp::services::auth::hash_password;
use sqlx::PgPool;
use uuid::Uuid;

const DEFAULT_PASSWORD: &str = "Camp123!";

/// Staff accounts: (name, email, account type).
const STAFF: &[(&str, &str, &str)] = &[
    ("Camp Administrator", "admin@bloodcamp.local", "admin"),
    ("Camp Desk", "camp@bloodcamp.local", "camp"),
    ("Registration Desk", "registration@bloodcamp.local", "registration"),
    ("Stats Display", "stats@bloodcamp.local", "stats"),
];

/// Partner hospitals: (name, phone, target, beds, point-of-contact email).
const HOSPITALS: &[(&str, &str, i32, i32, &str)] = &[
    ("Mercy General", "555-0101", 40, 10, "mercy@bloodcamp.local"),
    ("St. Luke's", "555-0102", 30, 6, "stlukes@bloodcamp.local"),
    ("City Care", "555-0103", 25, 4, "citycare@bloodcamp.local"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let db_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = bloodcamp::db::create_pool(&db_url, 5).await?;

    // Run migrations first
    bloodcamp::db::run_migrations(&pool).await?;

    println!("=== Blood Camp Seed Script ===");

    let hash = hash_password(DEFAULT_PASSWORD)?;
    seed_staff(&pool, &hash).await?;
    seed_hospitals(&pool, &hash).await?;

    println!("\n=== Seed complete! ===");
    println!("Admin login: admin@bloodcamp.local / {DEFAULT_PASSWORD}");

    Ok(())
}

/// Insert or refresh a user; returns its id.
async fn upsert_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    account_type: &str,
    hash: &str,
) -> anyhow::Result<Uuid> {
    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO users (id, name, email, password_hash, account_type)
         VALUES ($1, $2, $3, $4, $5::account_type)
         ON CONFLICT (email) DO UPDATE SET password_hash = EXCLUDED.password_hash,
             updated_at = NOW()
         RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(hash)
    .bind(account_type)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn seed_staff(pool: &PgPool, hash: &str) -> anyhow::Result<()> {
    for (name, email, account_type) in STAFF {
        upsert_user(pool, name, email, account_type, hash).await?;
    }
    println!("[done] Upserted {} staff accounts", STAFF.len());
    Ok(())
}

async fn seed_hospitals(pool: &PgPool, hash: &str) -> anyhow::Result<()> {
    let mut created = 0;
    for (name, phone, target, beds, poc_email) in HOSPITALS {
        let poc_id = upsert_user(pool, &format!("{name} Contact"), poc_email, "hospital", hash).await?;

        let inserted = sqlx::query(
            "INSERT INTO hospitals (id, name, phone, target, beds, user_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(phone)
        .bind(target)
        .bind(beds)
        .bind(poc_id)
        .execute(pool)
        .await?
        .rows_affected();

        created += inserted;
    }

    if created == 0 {
        println!("[skip] Hospitals already exist");
    } else {
        println!("[done] Created {created} hospitals with point-of-contact logins");
    }
    Ok(())
}
