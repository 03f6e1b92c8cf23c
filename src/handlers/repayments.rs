//! Repayment schedule handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use super::{AdminUser, AuthenticatedUser};
use crate::auth::{Operation, Resource};
use crate::error::ApiError;
use crate::models::{
    CreateScheduleRequest, ScheduleEntry, ScheduleEntryDetail, UpdateScheduleRequest,
};
use crate::state::AppState;

/// GET /api/repayments
pub async fn list_schedule(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<ScheduleEntryDetail>>, ApiError> {
    user.require(Operation::View, Resource::Repayment)?;
    Ok(Json(state.schedule_service.list().await?))
}

/// GET /api/repayments/loan/:loan_id
pub async fn list_loan_schedule(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(loan_id): Path<Uuid>,
) -> Result<Json<Vec<ScheduleEntry>>, ApiError> {
    user.require(Operation::View, Resource::Repayment)?;
    Ok(Json(state.schedule_service.list_by_loan(loan_id).await?))
}

/// POST /api/repayments
pub async fn create_schedule_entry(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<CreateScheduleRequest>,
) -> Result<(StatusCode, Json<ScheduleEntry>), ApiError> {
    req.validate()?;
    let entry = state.schedule_service.create(req).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// PUT /api/repayments/:id
pub async fn update_schedule_entry(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateScheduleRequest>,
) -> Result<Json<ScheduleEntry>, ApiError> {
    req.validate()?;
    Ok(Json(state.schedule_service.update(id, req).await?))
}
