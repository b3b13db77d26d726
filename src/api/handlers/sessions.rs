use crate::{
    api::handlers::{require_auth, ErrorBody},
    auth::{error::AuthError, service::AuthService},
    sessions::models::SessionPage,
};
use axum::{
    extract::Query,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Defaults to true; false includes revoked and expired sessions.
    pub active_only: Option<bool>,
}

#[utoipa::path(
    get,
    path = "/v1/sessions",
    params(PageQuery),
    responses(
        (status = 200, description = "Caller's sessions, most recently used first", body = SessionPage),
        (status = 401, description = "Missing or invalid access token", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "sessions"
)]
pub async fn list(
    headers: HeaderMap,
    Extension(auth): Extension<Arc<AuthService>>,
    Query(query): Query<PageQuery>,
) -> Result<Response, AuthError> {
    let claims = require_auth(&headers, &auth)?;

    let page = auth
        .sessions(
            claims.sub,
            query.active_only.unwrap_or(true),
            query.page.unwrap_or(1),
            query.per_page.unwrap_or(20),
        )
        .await?;

    Ok(Json(page).into_response())
}
