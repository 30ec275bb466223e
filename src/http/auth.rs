//! Account and session endpoints.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;

use crate::http::dto::{Credentials, ProfileUpdate};
use crate::http::error::ApiError;
use crate::http::extract::ApiJson;
use crate::http::middleware::{bearer_token, AuthUser};
use crate::http::server::AppState;

pub async fn signup(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .auth
        .signup(
            body.username.as_deref().unwrap_or_default(),
            body.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully" })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    let (_, token) = state
        .auth
        .login(body.username.as_deref(), body.password.as_deref())
        .await?;

    Ok(Json(json!({ "message": "Login successful", "token": token })))
}

/// Always succeeds; a presented token is revoked.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    state.auth.logout(bearer_token(&headers));
    Json(json!({ "message": "Logged out successfully" }))
}

pub async fn dashboard(Extension(user): Extension<AuthUser>) -> impl IntoResponse {
    Json(json!({
        "message": format!("Welcome to your dashboard, {}!", user.username)
    }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<ProfileUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let username = body
        .username
        .ok_or_else(|| ApiError::BadRequest("username is required".into()))?;
    let updated = state.auth.rename(user.id, &username)?;

    Ok(Json(json!({
        "message": "Profile updated successfully",
        "username": updated.username,
    })))
}
