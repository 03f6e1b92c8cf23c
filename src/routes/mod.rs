//! Route definitions for the loan desk API

mod auth;
mod customers;
mod loans;
mod payments;
mod repayments;
mod reports;
mod users;

use axum::Router;

use crate::state::AppState;

pub use auth::auth_routes;
pub use customers::customer_routes;
pub use loans::loan_routes;
pub use payments::payment_routes;
pub use repayments::repayment_routes;
pub use reports::report_routes;
pub use users::user_routes;

/// Every API route, ready for `with_state`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(customer_routes())
        .merge(loan_routes())
        .merge(repayment_routes())
        .merge(payment_routes())
        .merge(report_routes())
}
