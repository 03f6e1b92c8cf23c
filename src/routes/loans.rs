//! Loan routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::loans;
use crate::state::AppState;

pub fn loan_routes() -> Router<AppState> {
    Router::new()
        .route("/api/loans", get(loans::list_loans).post(loans::create_loan))
        .route("/api/loans/export", get(loans::export_loans))
        .route("/api/loans/import", post(loans::import_loans))
        .route(
            "/api/loans/customer/:customer_id",
            get(loans::list_customer_loans),
        )
        .route(
            "/api/loans/:id",
            get(loans::get_loan)
                .put(loans::update_loan)
                .delete(loans::delete_loan),
        )
}
