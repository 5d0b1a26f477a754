//! Donation workflows: donor registration, hospital review and certificates,
//! and admin CRUD with hospital counter reconciliation.
//!
//! Every state change runs in one transaction together with the hospital
//! counter update. Review and certificate transitions are conditional
//! updates, so two concurrent requests on the same donation cannot both
//! apply.

use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::db;
use crate::errors::AppError;
use crate::models::donation::{
    CounterDelta, CreateDonation, Donation, DonationDetails, DonationState, DonationStatus,
    ReviewDecision, UpdateDonation,
};
use crate::models::donor::{Donor, DonorType};
use crate::models::hospital::Hospital;

const DETAILS_SELECT: &str = r#"
    SELECT
        x.id, x.status, x.is_certificate_issued,
        x.donor_id, d.name AS donor_name, d.registration_number, d.donor_type,
        x.hospital_id, h.name AS hospital_name,
        x.created_at, x.updated_at
    FROM donations x
    INNER JOIN donors d ON d.id = x.donor_id
    INNER JOIN hospitals h ON h.id = x.hospital_id
"#;

/// Public registration form submission. Absent fields deserialize empty so
/// the validation error names every missing field.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistrationRequest {
    #[validate(length(min = 1))]
    pub donor_type: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub registration_number: String,
    #[validate(length(min = 1))]
    pub hospital_name: String,
}

/// Whether a guarded transition changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied,
    /// The guard no longer held; nothing was written.
    Unchanged,
}

impl TransitionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Donations of one hospital split by what the POC still has to do.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalQueue {
    pub pending_review: Vec<DonationDetails>,
    pub pending_cert: Vec<DonationDetails>,
}

/// Record a donation: find-or-create the donor, queue the donation as
/// pending at the named hospital, and bump the hospital's waiting count.
pub async fn register(pool: &PgPool, input: &RegistrationRequest) -> Result<Donation, AppError> {
    input.validate()?;
    let donor_type: DonorType = input.donor_type.parse().map_err(AppError::Validation)?;
    let name = input.name.trim();
    let registration_number = input.registration_number.trim();
    if name.is_empty() || registration_number.is_empty() {
        return Err(AppError::Validation(
            "Name and registration number must not be blank".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    let hospital = sqlx::query_as::<_, Hospital>("SELECT * FROM hospitals WHERE name = $1")
        .bind(input.hospital_name.trim())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Hospital not found".to_string()))?;

    // Existing donors keep their identity; the no-op update makes RETURNING
    // yield the stored row.
    let donor = sqlx::query_as::<_, Donor>(
        r#"
        INSERT INTO donors (id, name, registration_number, donor_type)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (registration_number)
            DO UPDATE SET registration_number = EXCLUDED.registration_number
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(registration_number)
    .bind(donor_type)
    .fetch_one(&mut *tx)
    .await?;

    let donation = insert(&mut tx, donor.id, hospital.id, DonationState::PENDING).await?;
    apply_counter_delta(&mut tx, hospital.id, DonationState::PENDING.contribution()).await?;

    tx.commit().await?;

    tracing::info!(
        donation_id = %donation.id,
        donor_id = %donor.id,
        hospital = %hospital.name,
        "Registered donation"
    );
    Ok(donation)
}

/// Find a donation by ID.
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Donation, AppError> {
    sqlx::query_as::<_, Donation>("SELECT * FROM donations WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Donation not found".to_string()))
}

/// Reject the request unless the donation belongs to `hospital_id`.
pub fn ensure_owned_by(donation: &Donation, hospital_id: Uuid) -> Result<(), AppError> {
    if donation.hospital_id != hospital_id {
        return Err(AppError::Forbidden(
            "Donation not assigned to your hospital".to_string(),
        ));
    }
    Ok(())
}

/// Accept or reject a pending donation on behalf of its hospital.
pub async fn review(
    pool: &PgPool,
    donation_id: Uuid,
    hospital_id: Uuid,
    decision: ReviewDecision,
) -> Result<TransitionOutcome, AppError> {
    let donation = find_by_id(pool, donation_id).await?;
    ensure_owned_by(&donation, hospital_id)?;

    let mut tx = pool.begin().await?;

    let updated = sqlx::query_as::<_, Donation>(
        r#"
        UPDATE donations SET status = $3, updated_at = NOW()
        WHERE id = $1 AND hospital_id = $2 AND status = 'Pending'
        RETURNING *
        "#,
    )
    .bind(donation_id)
    .bind(hospital_id)
    .bind(decision.target_status())
    .fetch_optional(&mut *tx)
    .await?;

    let Some(updated) = updated else {
        tracing::debug!(donation_id = %donation_id, ?decision, "Donation already reviewed");
        return Ok(TransitionOutcome::Unchanged);
    };

    apply_counter_delta(
        &mut tx,
        hospital_id,
        CounterDelta::between(DonationState::PENDING, updated.state()),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(donation_id = %donation_id, status = ?updated.status, "Donation reviewed");
    Ok(TransitionOutcome::Applied)
}

/// Issue the certificate for an accepted donation, once.
pub async fn issue_certificate(
    pool: &PgPool,
    donation_id: Uuid,
    hospital_id: Uuid,
) -> Result<TransitionOutcome, AppError> {
    let donation = find_by_id(pool, donation_id).await?;
    ensure_owned_by(&donation, hospital_id)?;

    let mut tx = pool.begin().await?;

    let updated = sqlx::query_as::<_, Donation>(
        r#"
        UPDATE donations SET is_certificate_issued = TRUE, updated_at = NOW()
        WHERE id = $1 AND hospital_id = $2
          AND status = 'Accepted' AND is_certificate_issued = FALSE
        RETURNING *
        "#,
    )
    .bind(donation_id)
    .bind(hospital_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(updated) = updated else {
        tracing::debug!(donation_id = %donation_id, "Certificate not issuable");
        return Ok(TransitionOutcome::Unchanged);
    };

    let before = DonationState {
        status: DonationStatus::Accepted,
        certificate_issued: false,
    };
    apply_counter_delta(&mut tx, hospital_id, CounterDelta::between(before, updated.state()))
        .await?;
    tx.commit().await?;

    tracing::info!(donation_id = %donation_id, "Certificate issued");
    Ok(TransitionOutcome::Applied)
}

/// Donations of a hospital still awaiting review or a certificate.
pub async fn queue_for_hospital(pool: &PgPool, hospital_id: Uuid) -> Result<HospitalQueue, AppError> {
    let donations = sqlx::query_as::<_, DonationDetails>(&format!(
        "{DETAILS_SELECT} WHERE x.hospital_id = $1 ORDER BY x.created_at"
    ))
    .bind(hospital_id)
    .fetch_all(pool)
    .await?;

    let (pending_review, rest): (Vec<_>, Vec<_>) =
        donations.into_iter().partition(DonationDetails::awaits_review);
    let pending_cert = rest
        .into_iter()
        .filter(DonationDetails::awaits_certificate)
        .collect();

    Ok(HospitalQueue {
        pending_review,
        pending_cert,
    })
}

/// List every donation with donor and hospital details.
pub async fn list(pool: &PgPool) -> Result<Vec<DonationDetails>, AppError> {
    let rows = sqlx::query_as::<_, DonationDetails>(&format!(
        "{DETAILS_SELECT} ORDER BY x.created_at DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Get one donation with donor and hospital details.
pub async fn find_details(pool: &PgPool, id: Uuid) -> Result<DonationDetails, AppError> {
    sqlx::query_as::<_, DonationDetails>(&format!("{DETAILS_SELECT} WHERE x.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Donation not found".to_string()))
}

/// Admin: create a donation in any valid state and count it at its hospital.
pub async fn create(pool: &PgPool, input: &CreateDonation) -> Result<DonationDetails, AppError> {
    let state = DonationState::new(
        input.status.unwrap_or(DonationStatus::Pending),
        input.is_certificate_issued,
    )?;

    let mut tx = pool.begin().await?;
    let donation = insert(&mut tx, input.donor_id, input.hospital_id, state).await?;
    apply_counter_delta(&mut tx, donation.hospital_id, state.contribution()).await?;
    tx.commit().await?;

    tracing::info!(donation_id = %donation.id, "Admin created donation");
    find_details(pool, donation.id).await
}

/// Admin: edit a donation and reconcile the affected hospital counters.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    input: &UpdateDonation,
) -> Result<DonationDetails, AppError> {
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, Donation>("SELECT * FROM donations WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Donation not found".to_string()))?;

    let old_state = existing.state();
    let new_state = DonationState::new(
        input.status.unwrap_or(old_state.status),
        input.is_certificate_issued.unwrap_or(old_state.certificate_issued),
    )?;
    let donor_id = input.donor_id.unwrap_or(existing.donor_id);
    let hospital_id = input.hospital_id.unwrap_or(existing.hospital_id);

    sqlx::query(
        r#"
        UPDATE donations SET
            donor_id = $2,
            hospital_id = $3,
            status = $4,
            is_certificate_issued = $5,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(donor_id)
    .bind(hospital_id)
    .bind(new_state.status)
    .bind(new_state.certificate_issued)
    .execute(&mut *tx)
    .await
    .map_err(map_reference_error)?;

    if hospital_id == existing.hospital_id {
        apply_counter_delta(&mut tx, hospital_id, CounterDelta::between(old_state, new_state))
            .await?;
    } else {
        apply_counter_delta(&mut tx, existing.hospital_id, -old_state.contribution()).await?;
        apply_counter_delta(&mut tx, hospital_id, new_state.contribution()).await?;
    }

    tx.commit().await?;

    tracing::info!(
        donation_id = %id,
        old_status = ?old_state.status,
        new_status = ?new_state.status,
        "Admin updated donation"
    );
    find_details(pool, id).await
}

/// Admin: delete a donation and withdraw its contribution from its hospital.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let removed = sqlx::query_as::<_, Donation>("DELETE FROM donations WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Donation not found".to_string()))?;

    apply_counter_delta(&mut tx, removed.hospital_id, -removed.state().contribution()).await?;
    tx.commit().await?;

    tracing::info!(donation_id = %id, "Admin deleted donation");
    Ok(())
}

async fn insert(
    conn: &mut PgConnection,
    donor_id: Uuid,
    hospital_id: Uuid,
    state: DonationState,
) -> Result<Donation, AppError> {
    sqlx::query_as::<_, Donation>(
        r#"
        INSERT INTO donations (id, donor_id, hospital_id, status, is_certificate_issued)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(donor_id)
    .bind(hospital_id)
    .bind(state.status)
    .bind(state.certificate_issued)
    .fetch_one(conn)
    .await
    .map_err(map_reference_error)
}

/// Shift a hospital's counters, clamping both at zero.
async fn apply_counter_delta(
    conn: &mut PgConnection,
    hospital_id: Uuid,
    delta: CounterDelta,
) -> Result<(), AppError> {
    if delta.is_zero() {
        return Ok(());
    }

    sqlx::query(
        r#"
        UPDATE hospitals SET
            waiting = GREATEST(waiting + $2, 0),
            current = GREATEST(current + $3, 0),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(hospital_id)
    .bind(delta.waiting)
    .bind(delta.current)
    .execute(conn)
    .await?;
    Ok(())
}

fn map_reference_error(e: sqlx::Error) -> AppError {
    if db::is_foreign_key_violation(&e) {
        AppError::Validation("Referenced donor or hospital does not exist".to_string())
    } else {
        AppError::Database(e)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn donation(hospital_id: Uuid) -> Donation {
        Donation {
            id: Uuid::new_v4(),
            donor_id: Uuid::new_v4(),
            hospital_id,
            status: DonationStatus::Pending,
            is_certificate_issued: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn ownership_guard() {
        let mine = Uuid::new_v4();
        let d = donation(mine);
        assert!(ensure_owned_by(&d, mine).is_ok());
        assert!(matches!(
            ensure_owned_by(&d, Uuid::new_v4()),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn registration_requires_all_fields() {
        let request: RegistrationRequest = serde_json::from_value(serde_json::json!({
            "donorType": "student",
            "name": "Alice",
            "registrationNumber": "",
            "hospitalName": "Mercy"
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn outcome_flags() {
        assert!(TransitionOutcome::Applied.is_applied());
        assert!(!TransitionOutcome::Unchanged.is_applied());
    }
}
