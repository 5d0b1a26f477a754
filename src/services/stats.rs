//! Stats aggregation for the live dashboard.
//!
//! Every snapshot is recomputed from the tables; there is no cached or
//! incremental state. All reads share one repeatable-read transaction so
//! the histogram, hospital list, and donor-type counts agree with each other.

use std::collections::BTreeMap;

use chrono::Utc;
use sqlx::{PgConnection, PgPool};

use crate::errors::AppError;
use crate::models::donor::DonorType;
use crate::models::stats::{HospitalStats, StatsSnapshot, StatusHistogram, SNAPSHOT_SCHEMA_VERSION};

/// Accepted-donation count for one donor type.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DonorTypeCount {
    pub donor_type: DonorType,
    pub count: i64,
}

/// Compute a fresh snapshot from current persisted state.
pub async fn compute_snapshot(pool: &PgPool) -> Result<StatsSnapshot, AppError> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
        .execute(&mut *tx)
        .await?;

    let status = fetch_status_histogram(&mut tx).await?;
    let hospitals = fetch_hospital_stats(&mut tx).await?;
    let donor_types = fetch_donor_type_counts(&mut tx).await?;

    tx.commit().await?;

    Ok(assemble_snapshot(status, hospitals, donor_types))
}

/// Build the snapshot from the raw aggregates.
pub fn assemble_snapshot(
    status: StatusHistogram,
    hospitals: Vec<HospitalStats>,
    donor_types: Vec<DonorTypeCount>,
) -> StatsSnapshot {
    let donor_types: BTreeMap<String, i64> = donor_types
        .into_iter()
        .filter(|c| c.count > 0)
        .map(|c| (c.donor_type.as_str().to_string(), c.count))
        .collect();

    StatsSnapshot {
        schema_version: SNAPSHOT_SCHEMA_VERSION,
        generated_at: Utc::now(),
        total_donations: status.accepted,
        donation_status: status,
        hospitals,
        donor_types,
    }
}

/// Count donations per review status.
async fn fetch_status_histogram(conn: &mut PgConnection) -> Result<StatusHistogram, AppError> {
    let row = sqlx::query_as::<_, StatusRow>(
        r#"
        SELECT
            COUNT(*) FILTER (WHERE status = 'Accepted') AS accepted,
            COUNT(*) FILTER (WHERE status = 'Rejected') AS rejected,
            COUNT(*) FILTER (WHERE status = 'Pending')  AS pending
        FROM donations
        "#,
    )
    .fetch_one(conn)
    .await?;

    Ok(StatusHistogram {
        accepted: row.accepted,
        rejected: row.rejected,
        pending: row.pending,
    })
}

/// Intermediate row for the status histogram.
#[derive(Debug, sqlx::FromRow)]
struct StatusRow {
    accepted: i64,
    rejected: i64,
    pending: i64,
}

/// Project every hospital to its dashboard counters.
async fn fetch_hospital_stats(conn: &mut PgConnection) -> Result<Vec<HospitalStats>, AppError> {
    let rows = sqlx::query_as::<_, HospitalStats>(
        "SELECT name, current, target, waiting, beds FROM hospitals ORDER BY created_at, name",
    )
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

/// Count accepted donations grouped by the donor's type.
async fn fetch_donor_type_counts(conn: &mut PgConnection) -> Result<Vec<DonorTypeCount>, AppError> {
    let rows = sqlx::query_as::<_, DonorTypeCount>(
        r#"
        SELECT d.donor_type, COUNT(*) AS count
        FROM donations x
        INNER JOIN donors d ON d.id = x.donor_id
        WHERE x.status = 'Accepted'
        GROUP BY d.donor_type
        "#,
    )
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_counts_only_accepted() {
        let snapshot = assemble_snapshot(
            StatusHistogram {
                accepted: 3,
                rejected: 2,
                pending: 5,
            },
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(snapshot.total_donations, 3);
        assert_eq!(snapshot.donation_status.rejected, 2);
        assert_eq!(snapshot.donation_status.pending, 5);
        assert_eq!(snapshot.schema_version, SNAPSHOT_SCHEMA_VERSION);
        assert!(snapshot.donor_types.is_empty());
    }

    #[test]
    fn donor_types_keyed_by_canonical_label() {
        let snapshot = assemble_snapshot(
            StatusHistogram {
                accepted: 3,
                ..Default::default()
            },
            vec![HospitalStats {
                name: "Mercy".to_string(),
                current: 0,
                target: 0,
                waiting: 0,
                beds: 10,
            }],
            vec![
                DonorTypeCount {
                    donor_type: DonorType::Student,
                    count: 2,
                },
                DonorTypeCount {
                    donor_type: DonorType::Faculty,
                    count: 1,
                },
            ],
        );
        assert_eq!(snapshot.donor_types.get("student"), Some(&2));
        assert_eq!(snapshot.donor_types.get("faculty"), Some(&1));
        assert_eq!(snapshot.donor_types.get("other"), None);
        assert_eq!(snapshot.hospitals.len(), 1);
    }
}
