//! Data models for the loan desk backend

use serde::Serialize;

pub mod auth;
pub mod customer;
pub mod loan;
pub mod payment;
pub mod report;
pub mod schedule;
pub mod user;

pub use auth::*;
pub use customer::*;
pub use loan::*;
pub use payment::*;
pub use report::*;
pub use schedule::*;
pub use user::*;

/// Plain acknowledgement body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result of a tabular import: rows created plus per-row problems
#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub message: String,
    pub imported: usize,
    pub errors: usize,
    pub error_details: Vec<String>,
}

impl ImportSummary {
    pub fn new(entity: &str, imported: usize, error_details: Vec<String>) -> Self {
        Self {
            message: format!(
                "Import completed. {} {} imported successfully.",
                imported, entity
            ),
            imported,
            errors: error_details.len(),
            error_details,
        }
    }
}
