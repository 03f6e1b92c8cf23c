//! Report routes

use axum::{routing::get, Router};

use crate::handlers::reports;
use crate::state::AppState;

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/api/reports/active-loans", get(reports::active_loans))
        .route(
            "/api/reports/outstanding-balance",
            get(reports::outstanding_balance),
        )
        .route("/api/reports/collections", get(reports::collections))
        .route("/api/reports/loans-by-period", get(reports::loans_by_period))
        .route("/api/reports/overdue", get(reports::overdue))
}
