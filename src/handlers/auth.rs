//! Authentication HTTP handlers

use axum::{extract::State, Json};

use super::AuthenticatedUser;
use crate::error::ApiError;
use crate::models::{LoginRequest, LoginResponse, UserResponse, VerifyResponse};
use crate::state::AppState;

/// POST /api/auth/login - Exchange username and password for a session token
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }

    let response = state
        .auth_service
        .login(req.username.trim(), &req.password)
        .await?;

    Ok(Json(response))
}

/// GET /api/auth/verify - Check that the presented token is still good
pub async fn verify(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<VerifyResponse>, ApiError> {
    let user = state.auth_service.get_user_by_id(user.user_id).await?;

    Ok(Json(VerifyResponse {
        valid: true,
        user: user.into(),
    }))
}

/// GET /api/auth/me - Current authenticated user
pub async fn get_current_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.auth_service.get_user_by_id(user.user_id).await?;
    Ok(Json(user.into()))
}
