//! API handlers

pub mod auth;
pub mod customers;
pub mod loans;
pub mod payments;
pub mod reports;
pub mod repayments;
pub mod users;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::error::ApiError;
use crate::services::tabular::{export_filename, CSV_CONTENT_TYPE};

// Re-export extractors from middleware for handler use
pub use crate::middleware::auth::{AdminUser, AuthenticatedUser};

/// Wrap CSV bytes as a dated file download
pub(crate) fn csv_attachment(entity: &str, body: Vec<u8>) -> Result<Response, ApiError> {
    let filename = export_filename(entity, Utc::now().date_naive());
    let disposition = HeaderValue::from_str(&format!("attachment; filename={}", filename))
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(CSV_CONTENT_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
