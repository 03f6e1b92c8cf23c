//! Loan desk backend server
//!
//! HTTP API for customers, loans, repayment schedules, payments and reports.

use axum::http::{HeaderValue, Method};
use axum::{extract::State, routing::get, Json, Router};
use sqlx::PgPool;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};

use loandesk_server::config::Config;
use loandesk_server::middleware::{self, RateLimiter};
use loandesk_server::services::overdue_sweeper;
use loandesk_server::state::AppState;
use loandesk_server::{db, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!(environment = %config.environment.as_str(), "Starting loan desk server");
    if config.uses_default_jwt_secret() {
        tracing::warn!("JWT_SECRET not set, using the development signing key");
    }

    let db_pool = db::create_pool(&config).await?;
    db::run_migrations(&db_pool).await?;

    let app_state = AppState::new(db_pool.clone(), &config);

    if config.seed_default_users {
        let created = app_state.auth_service.seed_default_users().await?;
        if created > 0 {
            tracing::info!(created, "Seeded default user accounts");
        }
    }

    if config.overdue_sweep_interval_seconds > 0 {
        let schedule_service = app_state.schedule_service.clone();
        let interval = Duration::from_secs(config.overdue_sweep_interval_seconds);
        tokio::spawn(async move {
            tracing::info!("Overdue sweeper task started");
            overdue_sweeper(schedule_service, interval).await;
            tracing::error!("Overdue sweeper task exited unexpectedly");
        });
    } else {
        tracing::info!("Overdue sweeper disabled");
    }

    let rate_limiter = RateLimiter::new(config.rate_limit_rps);
    rate_limiter.spawn_pruner(Duration::from_secs(300));

    let mut app = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .merge(routes::api_routes())
        .with_state(app_state)
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(axum::middleware::from_fn(middleware::request_tracing))
        .layer(axum::middleware::from_fn(middleware::rate_limit_layer(
            rate_limiter,
        )))
        .layer(configure_cors(config.cors_allowed_origins.as_deref()));

    if config.environment.is_production() {
        app = app.layer(axum::middleware::from_fn(middleware::hsts_header));
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check at http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn root() -> &'static str {
    "Loan Desk API Server"
}

/// Health check response
#[derive(serde::Serialize)]
struct HealthResponse {
    status: String,
    database: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    database_status: Option<db::DatabaseStatus>,
    version: String,
}

/// Health check endpoint
async fn health_check(State(pool): State<PgPool>) -> Json<HealthResponse> {
    let (status, database, database_status) = match db::check_health(&pool).await {
        Ok(db_status) => ("healthy", "connected".to_string(), Some(db_status)),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            ("unhealthy", format!("error: {}", e), None)
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        database,
        database_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn configure_cors(allowed_origins: Option<&str>) -> CorsLayer {
    let allowed_origins = allowed_origins.unwrap_or_default().trim();

    if allowed_origins.is_empty() {
        tracing::warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (permissive)");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
