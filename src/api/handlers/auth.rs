use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::api::auth::bearer_token;
use crate::api::AppState;
use crate::error::{AppError, AppResult};
use crate::model::user::{Credentials, RegisterUser};

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUser>,
) -> AppResult<impl IntoResponse> {
    let (user, token) = state.auth_service.register(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "User registered successfully",
            "user_id": user.id,
            "token": token,
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<Credentials>,
) -> AppResult<impl IntoResponse> {
    let (user, token) = state.auth_service.login(payload).await?;

    Ok(Json(serde_json::json!({
        "message": "Login successful",
        "user_id": user.id,
        "token": token,
    })))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let token = bearer_token(&headers).ok_or(AppError::Unauthorized)?;
    state
        .auth_service
        .authenticate(token)
        .ok_or(AppError::Unauthorized)?;

    state.auth_service.logout(token);

    Ok(Json(serde_json::json!({ "message": "Logout successful" })))
}
