//! Customer handlers

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
    CreateCustomerRequest, Customer, ImportSummary, MessageResponse, UpdateCustomerRequest,
};
use crate::state::AppState;

/// GET /api/customers
pub async fn list_customers(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Customer>>, ApiError> {
    user.require(Operation::View, Resource::Customer)?;
    Ok(Json(state.customer_service.list().await?))
}

/// GET /api/customers/:id
pub async fn get_customer(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Customer>, ApiError> {
    user.require(Operation::View, Resource::Customer)?;
    Ok(Json(state.customer_service.get(id).await?))
}

/// POST /api/customers
pub async fn create_customer(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    user.require(Operation::Create, Resource::Customer)?;
    req.validate()?;
    let customer = state.customer_service.create(req).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// PUT /api/customers/:id
pub async fn update_customer(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCustomerRequest>,
) -> Result<Json<Customer>, ApiError> {
    user.require(Operation::Edit, Resource::Customer)?;
    req.validate()?;
    Ok(Json(state.customer_service.update(id, req).await?))
}

/// DELETE /api/customers/:id
pub async fn delete_customer(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    user.require_delete()?;
    state.customer_service.delete(id).await?;
    Ok(Json(MessageResponse::new("Customer deleted successfully")))
}

/// GET /api/customers/export
pub async fn export_customers(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Response, ApiError> {
    user.require(Operation::View, Resource::Customer)?;
    let body = state.customer_service.export_csv().await?;
    csv_attachment("customers", body)
}

/// POST /api/customers/import - CSV request body
pub async fn import_customers(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    body: Bytes,
) -> Result<Json<ImportSummary>, ApiError> {
    user.require(Operation::Create, Resource::Customer)?;
    if body.is_empty() {
        return Err(ApiError::BadRequest("No file uploaded".to_string()));
    }
    Ok(Json(state.customer_service.import_csv(&body).await?))
}
