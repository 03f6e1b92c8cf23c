//! Customer routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::customers;
use crate::state::AppState;

pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/customers",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route("/api/customers/export", get(customers::export_customers))
        .route("/api/customers/import", post(customers::import_customers))
        .route(
            "/api/customers/:id",
            get(customers::get_customer)
                .put(customers::update_customer)
                .delete(customers::delete_customer),
        )
}
