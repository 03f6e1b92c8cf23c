//! Router-level tests that stop before the database
//!
//! The pool is created lazily and never connects, so every request here must
//! be answered by extraction, authentication or validation alone.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use loandesk_server::config::{Config, Environment};
use loandesk_server::routes::api_routes;
use loandesk_server::state::AppState;

fn test_config() -> Config {
    Config {
        database_url: "postgresql://localhost/loandesk_unused".to_string(),
        environment: Environment::Development,
        port: 0,
        db_max_connections: 1,
        rate_limit_rps: 100,
        cors_allowed_origins: None,
        log_level: "warn".to_string(),
        jwt_secret: "router-test-secret".to_string(),
        jwt_ttl_seconds: 900,
        bcrypt_cost: 4,
        seed_default_users: false,
        overdue_sweep_interval_seconds: 0,
    }
}

fn app() -> Router {
    let config = test_config();
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy(&config.database_url)
        .expect("lazy pool");
    api_routes().with_state(AppState::new(pool, &config))
}

#[tokio::test]
async fn test_protected_routes_require_bearer_token() {
    for uri in [
        "/api/customers",
        "/api/loans",
        "/api/repayments",
        "/api/payments",
        "/api/reports/overdue",
        "/api/users",
        "/api/auth/me",
    ] {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }
}

#[tokio::test]
async fn test_malformed_token_is_rejected() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/payments")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_requires_credentials() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"username":"  ","password":""}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/collateral")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
