use crate::{
    api::handlers::{request_context, require_auth, validation_error, ErrorBody},
    auth::{
        error::AuthError,
        service::{AuthService, AuthTokens, SigninInput, SignupInput},
        utils,
    },
};
use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignoutRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PasswordResetConfirm {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyEmailRequest {
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignoutResponse {
    pub signed_out: bool,
}

fn validate_credentials(email: &str, password: &str) -> Option<&'static str> {
    if !utils::valid_email(&utils::normalize_email(email)) {
        return Some("invalid email address");
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Some("password must be at least 8 characters");
    }
    None
}

#[utoipa::path(
    post,
    path = "/v1/auth/signup",
    request_body = SignupInput,
    responses(
        (status = 201, description = "Account created", body = AuthTokens),
        (status = 400, description = "Validation failed", body = ErrorBody),
        (status = 409, description = "Email or username already taken", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn signup(
    headers: HeaderMap,
    Extension(auth): Extension<Arc<AuthService>>,
    Json(input): Json<SignupInput>,
) -> Result<Response, AuthError> {
    if let Some(message) = validate_credentials(&input.email, &input.password) {
        return Ok(validation_error(message));
    }

    let ctx = request_context(&headers);
    let tokens = auth.signup(input, &ctx).await?;

    Ok((StatusCode::CREATED, Json(tokens)).into_response())
}

#[utoipa::path(
    post,
    path = "/v1/auth/signin",
    request_body = SigninInput,
    responses(
        (status = 200, description = "Signed in", body = AuthTokens),
        (status = 401, description = "Invalid credentials or two-factor failure", body = ErrorBody),
        (status = 403, description = "Account inactive", body = ErrorBody),
        (status = 423, description = "Account suspended", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn signin(
    headers: HeaderMap,
    Extension(auth): Extension<Arc<AuthService>>,
    Json(input): Json<SigninInput>,
) -> Result<Response, AuthError> {
    let ctx = request_context(&headers);
    let tokens = auth.signin(input, &ctx).await?;

    Ok(Json(tokens).into_response())
}

#[utoipa::path(
    post,
    path = "/v1/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Rotated token pair", body = AuthTokens),
        (status = 401, description = "Invalid refresh token", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn refresh(
    headers: HeaderMap,
    Extension(auth): Extension<Arc<AuthService>>,
    Json(input): Json<RefreshRequest>,
) -> Result<Response, AuthError> {
    let ctx = request_context(&headers);
    let tokens = auth.refresh(&input.refresh_token, &ctx).await?;

    Ok(Json(tokens).into_response())
}

#[utoipa::path(
    post,
    path = "/v1/auth/signout",
    request_body = SignoutRequest,
    responses(
        (status = 200, description = "Signout outcome", body = SignoutResponse)
    ),
    tag = "auth"
)]
pub async fn signout(
    headers: HeaderMap,
    Extension(auth): Extension<Arc<AuthService>>,
    Json(input): Json<SignoutRequest>,
) -> Result<Response, AuthError> {
    let ctx = request_context(&headers);
    let signed_out = auth.signout(&input.refresh_token, &ctx).await?;

    Ok(Json(SignoutResponse { signed_out }).into_response())
}

#[utoipa::path(
    post,
    path = "/v1/auth/signout-all",
    responses(
        (status = 200, description = "All sessions revoked"),
        (status = 401, description = "Missing or invalid access token", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn signout_all(
    headers: HeaderMap,
    Extension(auth): Extension<Arc<AuthService>>,
) -> Result<Response, AuthError> {
    let claims = require_auth(&headers, &auth)?;
    let ctx = request_context(&headers);
    let revoked = auth.signout_all(claims.sub, &ctx).await?;

    Ok(Json(json!({ "sessions_revoked": revoked })).into_response())
}

#[utoipa::path(
    post,
    path = "/v1/auth/password-reset/request",
    request_body = PasswordResetRequest,
    responses(
        (status = 202, description = "Accepted regardless of account existence")
    ),
    tag = "auth"
)]
pub async fn request_password_reset(
    headers: HeaderMap,
    Extension(auth): Extension<Arc<AuthService>>,
    Json(input): Json<PasswordResetRequest>,
) -> Result<Response, AuthError> {
    let ctx = request_context(&headers);
    auth.request_password_reset(&input.email, &ctx).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "message": "If the account exists, a reset link has been sent"
        })),
    )
        .into_response())
}

#[utoipa::path(
    post,
    path = "/v1/auth/password-reset/confirm",
    request_body = PasswordResetConfirm,
    responses(
        (status = 200, description = "Password replaced, all sessions revoked"),
        (status = 400, description = "Invalid or expired token", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn confirm_password_reset(
    headers: HeaderMap,
    Extension(auth): Extension<Arc<AuthService>>,
    Json(input): Json<PasswordResetConfirm>,
) -> Result<Response, AuthError> {
    if input.new_password.len() < MIN_PASSWORD_LEN {
        return Ok(validation_error("password must be at least 8 characters"));
    }

    let ctx = request_context(&headers);
    auth.confirm_password_reset(&input.token, &input.new_password, &ctx)
        .await?;

    Ok(Json(json!({ "message": "Password updated" })).into_response())
}

#[utoipa::path(
    post,
    path = "/v1/auth/verify-email",
    request_body = VerifyEmailRequest,
    responses(
        (status = 200, description = "Email verified"),
        (status = 400, description = "Invalid or expired token", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn verify_email(
    headers: HeaderMap,
    Extension(auth): Extension<Arc<AuthService>>,
    Json(input): Json<VerifyEmailRequest>,
) -> Result<Response, AuthError> {
    let ctx = request_context(&headers);
    auth.verify_email(&input.token, &ctx).await?;

    Ok(Json(json!({ "message": "Email verified" })).into_response())
}
