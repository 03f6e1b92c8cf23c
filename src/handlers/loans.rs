//! Loan handlers

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use super::{csv_attachment, AuthenticatedUser};
use crate::auth::{Operation, Resource};
use crate::error::ApiError;
use crate::models::{
    CreateLoanRequest, ImportSummary, Loan, LoanWithCustomer, MessageResponse, UpdateLoanRequest,
};
use crate::state::AppState;

/// GET /api/loans
pub async fn list_loans(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<LoanWithCustomer>>, ApiError> {
    user.require(Operation::View, Resource::Loan)?;
    Ok(Json(state.loan_service.list().await?))
}

/// GET /api/loans/:id
pub async fn get_loan(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<LoanWithCustomer>, ApiError> {
    user.require(Operation::View, Resource::Loan)?;
    Ok(Json(state.loan_service.get(id).await?))
}

/// GET /api/loans/customer/:customer_id
pub async fn list_customer_loans(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<Vec<Loan>>, ApiError> {
    user.require(Operation::View, Resource::Loan)?;
    Ok(Json(state.loan_service.list_by_customer(customer_id).await?))
}

/// POST /api/loans
pub async fn create_loan(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<CreateLoanRequest>,
) -> Result<(StatusCode, Json<LoanWithCustomer>), ApiError> {
    user.require(Operation::Create, Resource::Loan)?;
    req.validate()?;
    let loan = state.loan_service.create(req).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// PUT /api/loans/:id
pub async fn update_loan(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateLoanRequest>,
) -> Result<Json<LoanWithCustomer>, ApiError> {
    user.require(Operation::Edit, Resource::Loan)?;
    req.validate()?;
    Ok(Json(state.loan_service.update(id, req).await?))
}

/// DELETE /api/loans/:id
pub async fn delete_loan(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    user.require_delete()?;
    state.loan_service.delete(id).await?;
    Ok(Json(MessageResponse::new("Loan deleted successfully")))
}

/// GET /api/loans/export
pub async fn export_loans(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Response, ApiError> {
    user.require(Operation::View, Resource::Loan)?;
    let body = state.loan_service.export_csv().await?;
    csv_attachment("loans", body)
}

/// POST /api/loans/import - CSV request body
pub async fn import_loans(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    body: Bytes,
) -> Result<Json<ImportSummary>, ApiError> {
    user.require(Operation::Create, Resource::Loan)?;
    if body.is_empty() {
        return Err(ApiError::BadRequest("No file uploaded".to_string()));
    }
    Ok(Json(state.loan_service.import_csv(&body).await?))
}
