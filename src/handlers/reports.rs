//! Report handlers

use axum::{
    extract::{Query, State},
    Json,
};

use super::AuthenticatedUser;
use crate::auth::{Operation, Resource};
use crate::error::ApiError;
use crate::models::{
    ActiveLoansReport, CollectionsReport, LoansByPeriodReport, OutstandingBalanceRow,
    OverdueReport, PeriodQuery,
};
use crate::state::AppState;

/// GET /api/reports/active-loans
pub async fn active_loans(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ActiveLoansReport>, ApiError> {
    user.require(Operation::View, Resource::Report)?;
    Ok(Json(state.report_service.active_loans().await?))
}

/// GET /api/reports/outstanding-balance
pub async fn outstanding_balance(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<OutstandingBalanceRow>>, ApiError> {
    user.require(Operation::View, Resource::Report)?;
    Ok(Json(state.report_service.outstanding_balance().await?))
}

/// GET /api/reports/collections?period=&start_date=&end_date=
pub async fn collections(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<CollectionsReport>, ApiError> {
    user.require(Operation::View, Resource::Report)?;
    Ok(Json(state.report_service.collections(query).await?))
}

/// GET /api/reports/loans-by-period?period=&start_date=&end_date=
pub async fn loans_by_period(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<LoansByPeriodReport>, ApiError> {
    user.require(Operation::View, Resource::Report)?;
    Ok(Json(state.report_service.loans_by_period(query).await?))
}

/// GET /api/reports/overdue - Also moves past-due Unpaid rows to Late
pub async fn overdue(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<OverdueReport>, ApiError> {
    user.require(Operation::View, Resource::Report)?;
    Ok(Json(state.report_service.overdue().await?))
}
