use crate::{
    api::handlers::{request_context, require_auth, ErrorBody},
    auth::{error::AuthError, service::AuthService},
    users::{
        models::{PublicUser, UserPage, UserRole, UserStatus},
        service::{TwoFactorSetup, UserService},
    },
};
use axum::{
    extract::{Path, Query},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SuspendRequest {
    pub reason: Option<String>,
    pub until: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TwoFactorConfirmRequest {
    pub code: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TwoFactorDisableRequest {
    pub password: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UserListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<UserStatus>,
    pub role: Option<UserRole>,
}

fn require_admin(headers: &HeaderMap, auth: &AuthService) -> Result<Uuid, AuthError> {
    let claims = require_auth(headers, auth)?;
    if claims.role != UserRole::Admin {
        return Err(AuthError::Forbidden);
    }
    Ok(claims.sub)
}

#[utoipa::path(
    get,
    path = "/v1/users/me",
    responses(
        (status = 200, description = "Caller's account", body = PublicUser),
        (status = 401, description = "Missing or invalid access token", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn me(
    headers: HeaderMap,
    Extension(auth): Extension<Arc<AuthService>>,
    Extension(users): Extension<Arc<UserService>>,
) -> Result<Response, AuthError> {
    let claims = require_auth(&headers, &auth)?;
    let user = users.get(claims.sub).await?;

    Ok(Json(user).into_response())
}

#[utoipa::path(
    put,
    path = "/v1/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated account", body = PublicUser),
        (status = 401, description = "Missing or invalid access token", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn update_profile(
    headers: HeaderMap,
    Extension(auth): Extension<Arc<AuthService>>,
    Extension(users): Extension<Arc<UserService>>,
    Json(input): Json<UpdateProfileRequest>,
) -> Result<Response, AuthError> {
    let claims = require_auth(&headers, &auth)?;
    let ctx = request_context(&headers);

    let user = users
        .update_profile(
            claims.sub,
            input.first_name.as_deref(),
            input.last_name.as_deref(),
            &ctx,
        )
        .await?;

    Ok(Json(user).into_response())
}

#[utoipa::path(
    post,
    path = "/v1/users/me/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed, all sessions revoked"),
        (status = 400, description = "New password equals the current one", body = ErrorBody),
        (status = 401, description = "Current password does not verify", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn change_password(
    headers: HeaderMap,
    Extension(auth): Extension<Arc<AuthService>>,
    Extension(users): Extension<Arc<UserService>>,
    Json(input): Json<ChangePasswordRequest>,
) -> Result<Response, AuthError> {
    let claims = require_auth(&headers, &auth)?;
    let ctx = request_context(&headers);

    users
        .change_password(claims.sub, &input.current_password, &input.new_password, &ctx)
        .await?;

    Ok(Json(json!({ "message": "Password changed" })).into_response())
}

#[utoipa::path(
    post,
    path = "/v1/users/me/deactivate",
    responses(
        (status = 200, description = "Account deactivated, sessions revoked"),
        (status = 401, description = "Missing or invalid access token", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn deactivate(
    headers: HeaderMap,
    Extension(auth): Extension<Arc<AuthService>>,
    Extension(users): Extension<Arc<UserService>>,
) -> Result<Response, AuthError> {
    let claims = require_auth(&headers, &auth)?;
    let ctx = request_context(&headers);

    users.deactivate_account(claims.sub, &ctx).await?;

    Ok(Json(json!({ "message": "Account deactivated" })).into_response())
}

#[utoipa::path(
    delete,
    path = "/v1/users/me",
    responses(
        (status = 200, description = "Account deleted and anonymized"),
        (status = 401, description = "Missing or invalid access token", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn delete_me(
    headers: HeaderMap,
    Extension(auth): Extension<Arc<AuthService>>,
    Extension(users): Extension<Arc<UserService>>,
) -> Result<Response, AuthError> {
    let claims = require_auth(&headers, &auth)?;
    let ctx = request_context(&headers);

    users.delete_account(claims.sub, &ctx).await?;

    Ok(Json(json!({ "message": "Account deleted" })).into_response())
}

#[utoipa::path(
    post,
    path = "/v1/users/me/2fa",
    responses(
        (status = 200, description = "Enrollment secret and otpauth URL", body = TwoFactorSetup),
        (status = 401, description = "Missing or invalid access token", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn two_factor_begin(
    headers: HeaderMap,
    Extension(auth): Extension<Arc<AuthService>>,
    Extension(users): Extension<Arc<UserService>>,
) -> Result<Response, AuthError> {
    let claims = require_auth(&headers, &auth)?;
    let setup = users.two_factor_begin(claims.sub).await?;

    Ok(Json(setup).into_response())
}

#[utoipa::path(
    post,
    path = "/v1/users/me/2fa/confirm",
    request_body = TwoFactorConfirmRequest,
    responses(
        (status = 200, description = "Two-factor enabled"),
        (status = 401, description = "Code does not verify", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn two_factor_confirm(
    headers: HeaderMap,
    Extension(auth): Extension<Arc<AuthService>>,
    Extension(users): Extension<Arc<UserService>>,
    Json(input): Json<TwoFactorConfirmRequest>,
) -> Result<Response, AuthError> {
    let claims = require_auth(&headers, &auth)?;
    let ctx = request_context(&headers);

    users.two_factor_confirm(claims.sub, &input.code, &ctx).await?;

    Ok(Json(json!({ "message": "Two-factor enabled" })).into_response())
}

#[utoipa::path(
    delete,
    path = "/v1/users/me/2fa",
    request_body = TwoFactorDisableRequest,
    responses(
        (status = 200, description = "Two-factor disabled"),
        (status = 401, description = "Password does not verify", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn two_factor_disable(
    headers: HeaderMap,
    Extension(auth): Extension<Arc<AuthService>>,
    Extension(users): Extension<Arc<UserService>>,
    Json(input): Json<TwoFactorDisableRequest>,
) -> Result<Response, AuthError> {
    let claims = require_auth(&headers, &auth)?;
    let ctx = request_context(&headers);

    users
        .two_factor_disable(claims.sub, &input.password, &ctx)
        .await?;

    Ok(Json(json!({ "message": "Two-factor disabled" })).into_response())
}

#[utoipa::path(
    get,
    path = "/v1/users",
    params(UserListQuery),
    responses(
        (status = 200, description = "Accounts, newest first", body = UserPage),
        (status = 403, description = "Caller is not an admin", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn list(
    headers: HeaderMap,
    Extension(auth): Extension<Arc<AuthService>>,
    Extension(users): Extension<Arc<UserService>>,
    Query(query): Query<UserListQuery>,
) -> Result<Response, AuthError> {
    require_admin(&headers, &auth)?;

    let page = users
        .list_users(
            query.status,
            query.role,
            query.page.unwrap_or(1),
            query.per_page.unwrap_or(20),
        )
        .await?;

    Ok(Json(page).into_response())
}

#[utoipa::path(
    post,
    path = "/v1/users/{id}/suspend",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = SuspendRequest,
    responses(
        (status = 200, description = "Account suspended, sessions revoked"),
        (status = 403, description = "Caller is not an admin", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn suspend(
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Extension(auth): Extension<Arc<AuthService>>,
    Extension(users): Extension<Arc<UserService>>,
    Json(input): Json<SuspendRequest>,
) -> Result<Response, AuthError> {
    require_admin(&headers, &auth)?;
    let ctx = request_context(&headers);

    users
        .suspend(id, input.reason.as_deref(), input.until, &ctx)
        .await?;

    Ok(Json(json!({ "message": "Account suspended" })).into_response())
}

#[utoipa::path(
    post,
    path = "/v1/users/{id}/unsuspend",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "Suspension lifted"),
        (status = 403, description = "Caller is not an admin", body = ErrorBody),
        (status = 404, description = "User not found or not suspended", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn unsuspend(
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Extension(auth): Extension<Arc<AuthService>>,
    Extension(users): Extension<Arc<UserService>>,
) -> Result<Response, AuthError> {
    require_admin(&headers, &auth)?;
    let ctx = request_context(&headers);

    users.unsuspend(id, &ctx).await?;

    Ok(Json(json!({ "message": "Suspension lifted" })).into_response())
}

#[utoipa::path(
    put,
    path = "/v1/users/{id}/role",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Updated account", body = PublicUser),
        (status = 403, description = "Caller is not an admin", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn update_role(
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Extension(auth): Extension<Arc<AuthService>>,
    Extension(users): Extension<Arc<UserService>>,
    Json(input): Json<UpdateRoleRequest>,
) -> Result<Response, AuthError> {
    require_admin(&headers, &auth)?;
    let ctx = request_context(&headers);

    let user = users.update_role(id, input.role, &ctx).await?;

    Ok(Json(user).into_response())
}

#[utoipa::path(
    delete,
    path = "/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "Account deleted and anonymized"),
        (status = 403, description = "Caller is not an admin", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn delete_user(
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Extension(auth): Extension<Arc<AuthService>>,
    Extension(users): Extension<Arc<UserService>>,
) -> Result<Response, AuthError> {
    require_admin(&headers, &auth)?;
    let ctx = request_context(&headers);

    users.delete_account(id, &ctx).await?;

    Ok(Json(json!({ "message": "Account deleted" })).into_response())
}
