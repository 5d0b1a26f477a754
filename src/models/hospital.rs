//! Hospital model: capacity, donation targets, and the POC owner link.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Hospital {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    /// Certificates issued so far.
    pub current: i32,
    pub target: i32,
    /// Donations awaiting review.
    pub waiting: i32,
    pub beds: i32,
    pub is_locked: bool,
    /// Point-of-contact user, at most one hospital per user.
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Entry of the public hospital picker, ordered by `priority_score`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalRanking {
    pub name: String,
    pub beds: i32,
    pub waiting: i32,
    pub current: i32,
    pub target: i32,
    /// `None` when the target is zero and the ratio is not finite.
    pub percentage: Option<f64>,
    pub priority_score: i32,
}

impl HospitalRanking {
    pub fn from_hospital(h: &Hospital) -> Self {
        Self {
            name: h.name.clone(),
            beds: h.beds,
            waiting: h.waiting,
            current: h.current,
            target: h.target,
            percentage: target_percentage(h.current, h.target),
            priority_score: h.beds - h.waiting,
        }
    }
}

/// `current / target * 100` rounded to one decimal place.
///
/// Ties round half away from zero on the scaled value, so a ratio whose
/// binary form sits just below a `.x5` boundary may round up where a
/// fixed-point formatter would round down.
pub fn target_percentage(current: i32, target: i32) -> Option<f64> {
    let ratio = f64::from(current) / f64::from(target) * 100.0;
    ratio.is_finite().then(|| (ratio * 10.0).round() / 10.0)
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateHospital {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub phone: String,
    #[validate(range(min = 0))]
    pub current: i32,
    #[validate(range(min = 0))]
    pub target: i32,
    #[validate(range(min = 0))]
    pub waiting: i32,
    #[validate(range(min = 0))]
    pub beds: i32,
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub is_locked: bool,
}

/// Partial hospital update. `user_id: Some(None)` detaches the POC.
#[derive(Debug, Clone, Deserialize, Default, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHospital {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub phone: Option<String>,
    #[validate(range(min = 0))]
    pub current: Option<i32>,
    #[validate(range(min = 0))]
    pub target: Option<i32>,
    #[validate(range(min = 0))]
    pub waiting: Option<i32>,
    #[validate(range(min = 0))]
    pub beds: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub user_id: Option<Option<Uuid>>,
    pub is_locked: Option<bool>,
}

/// Distinguishes an explicit `null` from an absent field.
fn deserialize_some<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
