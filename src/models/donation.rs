//! Donation lifecycle: review status plus an orthogonal certificate flag.
//!
//! A donation starts `Pending`, is reviewed exactly once into `Accepted` or
//! `Rejected`, and only an accepted donation may carry a certificate. Each
//! state contributes to its hospital's `waiting`/`current` counters; admin
//! edits reconcile counters through [`CounterDelta`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::donor::DonorType;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "donation_status")]
pub enum DonationStatus {
    Pending,
    Accepted,
    Rejected,
}

/// Full lifecycle state of a donation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DonationState {
    pub status: DonationStatus,
    pub certificate_issued: bool,
}

impl DonationState {
    pub const PENDING: Self = Self {
        status: DonationStatus::Pending,
        certificate_issued: false,
    };

    pub fn new(status: DonationStatus, certificate_issued: bool) -> Result<Self, AppError> {
        if certificate_issued && status != DonationStatus::Accepted {
            return Err(AppError::Validation(
                "A certificate can only be issued for an accepted donation".to_string(),
            ));
        }
        Ok(Self {
            status,
            certificate_issued,
        })
    }

    /// This state's share of its hospital's counters.
    pub fn contribution(&self) -> CounterDelta {
        CounterDelta {
            waiting: i32::from(self.status == DonationStatus::Pending),
            current: i32::from(self.certificate_issued),
        }
    }
}

/// Signed adjustment to a hospital's `waiting` and `current` counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterDelta {
    pub waiting: i32,
    pub current: i32,
}

impl CounterDelta {
    /// Delta that moves a hospital from counting `old` to counting `new`.
    pub fn between(old: DonationState, new: DonationState) -> Self {
        new.contribution() - old.contribution()
    }

    pub fn is_zero(&self) -> bool {
        self.waiting == 0 && self.current == 0
    }
}

impl std::ops::Sub for CounterDelta {
    type Output = CounterDelta;

    fn sub(self, rhs: Self) -> Self::Output {
        CounterDelta {
            waiting: self.waiting - rhs.waiting,
            current: self.current - rhs.current,
        }
    }
}

impl std::ops::Neg for CounterDelta {
    type Output = CounterDelta;

    fn neg(self) -> Self::Output {
        CounterDelta {
            waiting: -self.waiting,
            current: -self.current,
        }
    }
}

/// Review decision taken by a hospital POC on a pending donation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Accept,
    Reject,
}

impl ReviewDecision {
    pub fn target_status(&self) -> DonationStatus {
        match self {
            ReviewDecision::Accept => DonationStatus::Accepted,
            ReviewDecision::Reject => DonationStatus::Rejected,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ReviewDecision::Accept => "Donation accepted",
            ReviewDecision::Reject => "Donation rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: Uuid,
    pub donor_id: Uuid,
    pub hospital_id: Uuid,
    pub status: DonationStatus,
    pub is_certificate_issued: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Donation {
    pub fn state(&self) -> DonationState {
        DonationState {
            status: self.status,
            certificate_issued: self.is_certificate_issued,
        }
    }
}

/// Donation joined with its donor and hospital, as listed to staff.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DonationDetails {
    pub id: Uuid,
    pub status: DonationStatus,
    pub is_certificate_issued: bool,
    pub donor_id: Uuid,
    pub donor_name: String,
    pub registration_number: String,
    pub donor_type: DonorType,
    pub hospital_id: Uuid,
    pub hospital_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DonationDetails {
    pub fn awaits_review(&self) -> bool {
        self.status == DonationStatus::Pending
    }

    pub fn awaits_certificate(&self) -> bool {
        self.status == DonationStatus::Accepted && !self.is_certificate_issued
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonation {
    pub donor_id: Uuid,
    pub hospital_id: Uuid,
    pub status: Option<DonationStatus>,
    #[serde(default)]
    pub is_certificate_issued: bool,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDonation {
    pub donor_id: Option<Uuid>,
    pub hospital_id: Option<Uuid>,
    pub status: Option<DonationStatus>,
    pub is_certificate_issued: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(status: DonationStatus, certificate_issued: bool) -> DonationState {
        DonationState::new(status, certificate_issued).unwrap()
    }

    #[test]
    fn certificate_requires_acceptance() {
        assert!(DonationState::new(DonationStatus::Pending, true).is_err());
        assert!(DonationState::new(DonationStatus::Rejected, true).is_err());
        assert!(DonationState::new(DonationStatus::Accepted, true).is_ok());
    }

    #[test]
    fn leaving_pending_releases_one_waiting_slot() {
        let accepted = CounterDelta::between(
            DonationState::PENDING,
            state(DonationStatus::Accepted, false),
        );
        assert_eq!(accepted, CounterDelta { waiting: -1, current: 0 });

        let rejected = CounterDelta::between(
            DonationState::PENDING,
            state(DonationStatus::Rejected, false),
        );
        assert_eq!(rejected, CounterDelta { waiting: -1, current: 0 });
    }

    #[test]
    fn moving_between_reviewed_states_leaves_waiting_alone() {
        let delta = CounterDelta::between(
            state(DonationStatus::Accepted, false),
            state(DonationStatus::Rejected, false),
        );
        assert!(delta.is_zero());
    }

    #[test]
    fn certificate_toggle_adjusts_current() {
        let issued = CounterDelta::between(
            state(DonationStatus::Accepted, false),
            state(DonationStatus::Accepted, true),
        );
        assert_eq!(issued, CounterDelta { waiting: 0, current: 1 });

        let revoked = CounterDelta::between(
            state(DonationStatus::Accepted, true),
            state(DonationStatus::Rejected, false),
        );
        assert_eq!(revoked, CounterDelta { waiting: 0, current: -1 });
    }

    #[test]
    fn back_to_pending_requeues() {
        let delta = CounterDelta::between(
            state(DonationStatus::Accepted, true),
            DonationState::PENDING,
        );
        assert_eq!(delta, CounterDelta { waiting: 1, current: -1 });
    }

    #[test]
    fn status_serializes_as_label() {
        assert_eq!(
            serde_json::to_string(&DonationStatus::Accepted).unwrap(),
            "\"Accepted\""
        );
    }

    #[test]
    fn review_decision_targets() {
        assert_eq!(ReviewDecision::Accept.target_status(), DonationStatus::Accepted);
        assert_eq!(ReviewDecision::Reject.target_status(), DonationStatus::Rejected);
    }
}
