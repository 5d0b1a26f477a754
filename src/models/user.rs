//! User accounts and the account types that drive authorization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "account_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Admin,
    Camp,
    Hospital,
    Registration,
    Stats,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Admin => "admin",
            AccountType::Camp => "camp",
            AccountType::Hospital => "hospital",
            AccountType::Registration => "registration",
            AccountType::Stats => "stats",
        }
    }

    /// Landing page the login response points the browser to.
    pub fn redirect_url(&self) -> &'static str {
        match self {
            AccountType::Admin => "/admin.html",
            AccountType::Registration => "/registration.html",
            AccountType::Hospital => "/hospital.html",
            AccountType::Stats => "/stats.html",
            AccountType::Camp => "/index.html",
        }
    }
}

/// Full user row from database, including password_hash; never serialized to the API.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub account_type: AccountType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User response DTO without password_hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub account_type: AccountType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            account_type: u.account_type,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    pub account_type: AccountType,
}

#[derive(Debug, Clone, Deserialize, Default, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1))]
    pub password: Option<String>,
    pub account_type: Option<AccountType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_type_serialization() {
        let json = serde_json::to_string(&AccountType::Hospital).unwrap();
        assert_eq!(json, "\"hospital\"");
        let parsed: AccountType = serde_json::from_str("\"stats\"").unwrap();
        assert_eq!(parsed, AccountType::Stats);
    }

    #[test]
    fn redirect_per_account_type() {
        assert_eq!(AccountType::Admin.redirect_url(), "/admin.html");
        assert_eq!(AccountType::Hospital.redirect_url(), "/hospital.html");
        assert_eq!(AccountType::Stats.redirect_url(), "/stats.html");
        assert_eq!(AccountType::Camp.redirect_url(), "/index.html");
    }

    #[test]
    fn user_response_excludes_password() {
        let user = User {
            id: Uuid::nil(),
            name: "Mercy POC".to_string(),
            email: "poc@mercy.test".to_string(),
            password_hash: "secret_hash".to_string(),
            account_type: AccountType::Hospital,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&UserResponse::from(user)).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("secret_hash"));
        assert!(json.contains("\"accountType\":\"hospital\""));
    }

    #[test]
    fn update_user_partial_validation() {
        let update = UpdateUser {
            email: Some("bad".to_string()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
        assert!(UpdateUser::default().validate().is_ok());
    }
}
