pub mod auth;
pub mod health;
pub mod sessions;
pub mod users;

use crate::auth::{
    error::AuthError,
    service::{AuthService, RequestContext},
    token::Claims,
    utils,
};
use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

/// Wire shape of every error response: a stable machine code plus a
/// human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(value_type = String)]
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTime<Utc>>,
}

impl ErrorBody {
    #[must_use]
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            reason: None,
            until: None,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            Self::AccountSuspended { .. } => (StatusCode::LOCKED, "ACCOUNT_SUSPENDED"),
            Self::AccountDeleted => (StatusCode::UNAUTHORIZED, "ACCOUNT_DELETED"),
            Self::AccountInactive => (StatusCode::FORBIDDEN, "ACCOUNT_INACTIVE"),
            Self::EmailAlreadyExists => (StatusCode::CONFLICT, "EMAIL_ALREADY_EXISTS"),
            Self::UsernameAlreadyExists => (StatusCode::CONFLICT, "USERNAME_ALREADY_EXISTS"),
            Self::TwoFactorRequired => (StatusCode::UNAUTHORIZED, "TWO_FACTOR_REQUIRED"),
            Self::InvalidTwoFactorCode => (StatusCode::UNAUTHORIZED, "INVALID_TWO_FACTOR_CODE"),
            Self::InvalidRefreshToken => (StatusCode::UNAUTHORIZED, "INVALID_REFRESH_TOKEN"),
            Self::InvalidOrExpiredToken => (StatusCode::BAD_REQUEST, "INVALID_OR_EXPIRED_TOKEN"),
            Self::InvalidPassword => (StatusCode::UNAUTHORIZED, "INVALID_PASSWORD"),
            Self::SamePassword => (StatusCode::BAD_REQUEST, "SAME_PASSWORD"),
            Self::UserNotFound => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
            Self::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Internal(err) => {
                error!("internal error: {err:#}");
                let body = ErrorBody::new("INTERNAL", "internal server error");
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
            }
        };

        let mut body = ErrorBody::new(code, self.to_string());
        if let Self::AccountSuspended { reason, until } = self {
            body.reason = reason;
            body.until = until;
        }

        (status, Json(body)).into_response()
    }
}

pub(crate) fn validation_error(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody::new("VALIDATION_ERROR", message)),
    )
        .into_response()
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Decode and verify the bearer access token of a request.
pub(crate) fn require_auth(headers: &HeaderMap, auth: &AuthService) -> Result<Claims, AuthError> {
    let token = bearer_token(headers).ok_or(AuthError::InvalidCredentials)?;
    auth.verify_access_token(token)
}

pub(crate) fn request_context(headers: &HeaderMap) -> RequestContext {
    RequestContext {
        ip: utils::client_ip(headers),
        user_agent: utils::user_agent(headers),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            AuthError::InvalidCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::AccountSuspended {
                reason: Some("abuse".to_string()),
                until: None,
            }
            .into_response()
            .status(),
            StatusCode::LOCKED
        );
        assert_eq!(
            AuthError::AccountInactive.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthError::EmailAlreadyExists.into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AuthError::InvalidOrExpiredToken.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::UserNotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AuthError::Internal(anyhow::anyhow!("boom"))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert_eq!(bearer_token(&headers), None);

        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
