//! Payment routes

use axum::{
    routing::{get, put},
    Router,
};

use crate::handlers::payments;
use crate::state::AppState;

pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/payments",
            get(payments::list_payments).post(payments::record_payment),
        )
        .route("/api/payments/loan/:loan_id", get(payments::list_loan_payments))
        .route("/api/payments/:id", put(payments::amend_payment))
}
