//! Payment handlers

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
use crate::models::{AmendPaymentRequest, PaymentDetail, RecordPaymentRequest, RecordPaymentResponse};
use crate::state::AppState;

/// GET /api/payments
pub async fn list_payments(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<PaymentDetail>>, ApiError> {
    user.require(Operation::View, Resource::Payment)?;
    Ok(Json(state.payment_service.list().await?))
}

/// GET /api/payments/loan/:loan_id
pub async fn list_loan_payments(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(loan_id): Path<Uuid>,
) -> Result<Json<Vec<PaymentDetail>>, ApiError> {
    user.require(Operation::View, Resource::Payment)?;
    Ok(Json(state.payment_service.list_by_loan(loan_id).await?))
}

/// POST /api/payments - Record a payment and allocate it to the schedule
pub async fn record_payment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<RecordPaymentResponse>), ApiError> {
    user.require(Operation::Create, Resource::Payment)?;
    req.validate()?;
    let recorded = state.payment_service.record(req, user.user_id).await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

/// PUT /api/payments/:id - Amend a payment record
pub async fn amend_payment(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<AmendPaymentRequest>,
) -> Result<Json<PaymentDetail>, ApiError> {
    req.validate()?;
    Ok(Json(state.payment_service.amend(id, req).await?))
}
