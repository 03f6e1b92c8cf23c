//! Repayment schedule routes

use axum::{
    routing::{get, put},
    Router,
};

use crate::handlers::repayments;
use crate::state::AppState;

pub fn repayment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/repayments",
            get(repayments::list_schedule).post(repayments::create_schedule_entry),
        )
        .route(
            "/api/repayments/loan/:loan_id",
            get(repayments::list_loan_schedule),
        )
        .route("/api/repayments/:id", put(repayments::update_schedule_entry))
}
