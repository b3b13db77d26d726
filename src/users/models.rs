use crate::sessions::models::PageMeta;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Moderator,
    Admin,
}

/// Account lifecycle state.
///
/// `deleted` is terminal; every other transition is reversible.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "user_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
    Deleted,
}

/// Full user row, internal only. Never serialized to a response.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub email_verified: bool,
    pub two_factor_enabled: bool,
    pub two_factor_secret: Option<String>,
    pub suspension_reason: Option<String>,
    pub suspended_until: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response-safe projection of a user.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub email_verified: bool,
    pub two_factor_enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
            status: user.status,
            email_verified: user.email_verified,
            two_factor_enabled: user.two_factor_enabled,
            created_at: user.created_at,
        }
    }
}

/// One page of the admin account listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserPage {
    pub users: Vec<PublicUser>,
    pub meta: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde_lowercase() -> anyhow::Result<()> {
        assert_eq!(serde_json::to_string(&UserRole::Admin)?, r#""admin""#);
        assert_eq!(
            serde_json::from_str::<UserRole>(r#""moderator""#)?,
            UserRole::Moderator
        );
        Ok(())
    }

    #[test]
    fn test_status_serde_lowercase() -> anyhow::Result<()> {
        assert_eq!(serde_json::to_string(&UserStatus::Suspended)?, r#""suspended""#);
        assert_eq!(
            serde_json::from_str::<UserStatus>(r#""deleted""#)?,
            UserStatus::Deleted
        );
        Ok(())
    }

    #[test]
    fn test_public_user_drops_secrets() {
        let user = User {
            id: Uuid::new_v4(),
            email: "alice@example.com".to_string(),
            username: Some("alice".to_string()),
            password_hash: "$argon2id$...".to_string(),
            first_name: None,
            last_name: None,
            role: UserRole::User,
            status: UserStatus::Active,
            email_verified: true,
            two_factor_enabled: true,
            two_factor_secret: Some("JBSWY3DPEHPK3PXP".to_string()),
            suspension_reason: None,
            suspended_until: None,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let public = PublicUser::from(&user);
        let json = serde_json::to_string(&public).expect("serializable");

        assert!(!json.contains("argon2id"));
        assert!(!json.contains("JBSWY3DPEHPK3PXP"));
        assert!(json.contains("alice@example.com"));
    }
}
