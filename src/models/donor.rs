//! Donor identity and donor categories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Donor category. Input is accepted case-insensitively; the canonical form
/// is lowercase.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[sqlx(type_name = "donor_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum DonorType {
    Student,
    Faculty,
    Other,
}

impl DonorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonorType::Student => "student",
            DonorType::Faculty => "faculty",
            DonorType::Other => "other",
        }
    }
}

impl std::fmt::Display for DonorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DonorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(DonorType::Student),
            "faculty" => Ok(DonorType::Faculty),
            "other" => Ok(DonorType::Other),
            _ => Err(format!(
                "donorType must be one of student, faculty, other (got '{s}')"
            )),
        }
    }
}

impl TryFrom<String> for DonorType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    pub id: Uuid,
    pub name: String,
    pub registration_number: String,
    pub donor_type: DonorType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonor {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub registration_number: String,
    pub donor_type: DonorType,
}

#[derive(Debug, Clone, Deserialize, Default, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDonor {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub registration_number: Option<String>,
    pub donor_type: Option<DonorType>,
}
