use chrono::{DateTime, Utc};
use thiserror::Error;

/// Domain error taxonomy for the authentication engine.
///
/// Every recoverable outcome a caller can act on has its own variant;
/// unrecovered infrastructure failures are carried opaquely by `Internal`.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account suspended")]
    AccountSuspended {
        reason: Option<String>,
        until: Option<DateTime<Utc>>,
    },

    #[error("account deleted")]
    AccountDeleted,

    #[error("account inactive")]
    AccountInactive,

    #[error("email already registered")]
    EmailAlreadyExists,

    #[error("username already taken")]
    UsernameAlreadyExists,

    #[error("two-factor code required")]
    TwoFactorRequired,

    #[error("invalid two-factor code")]
    InvalidTwoFactorCode,

    #[error("invalid refresh token")]
    InvalidRefreshToken,

    #[error("invalid or expired token")]
    InvalidOrExpiredToken,

    #[error("invalid password")]
    InvalidPassword,

    #[error("new password must differ from the current one")]
    SamePassword,

    #[error("user not found")]
    UserNotFound,

    #[error("insufficient privileges")]
    Forbidden,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(AuthError::InvalidCredentials.to_string(), "invalid credentials");
        assert_eq!(
            AuthError::AccountSuspended {
                reason: Some("abuse".to_string()),
                until: None,
            }
            .to_string(),
            "account suspended"
        );
        assert_eq!(AuthError::SamePassword.to_string(), "new password must differ from the current one");
    }

    #[test]
    fn test_internal_wraps_anyhow() {
        let err: AuthError = anyhow::anyhow!("pool exhausted").into();
        assert!(matches!(err, AuthError::Internal(_)));
        assert_eq!(err.to_string(), "pool exhausted");
    }
}
