//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::auth::AuthService;
use crate::config::Config;
use crate::services::{
    CustomerService, LoanService, PaymentService, ReportService, ScheduleService, UserService,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub customer_service: Arc<CustomerService>,
    pub loan_service: Arc<LoanService>,
    pub schedule_service: Arc<ScheduleService>,
    pub payment_service: Arc<PaymentService>,
    pub report_service: Arc<ReportService>,
}

impl AppState {
    /// Build every service over one connection pool
    pub fn new(db_pool: PgPool, config: &Config) -> Self {
        let schedule_service = Arc::new(ScheduleService::new(db_pool.clone()));

        Self {
            auth_service: Arc::new(AuthService::new(
                db_pool.clone(),
                config.jwt_secret.clone(),
                config.jwt_ttl_seconds,
                config.bcrypt_cost,
            )),
            user_service: Arc::new(UserService::new(db_pool.clone(), config.bcrypt_cost)),
            customer_service: Arc::new(CustomerService::new(db_pool.clone())),
            loan_service: Arc::new(LoanService::new(db_pool.clone())),
            payment_service: Arc::new(PaymentService::new(db_pool.clone())),
            report_service: Arc::new(ReportService::new(
                db_pool.clone(),
                schedule_service.clone(),
            )),
            schedule_service,
            db_pool,
        }
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth_service.clone()
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}
