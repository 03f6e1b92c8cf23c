//! Repayment schedule models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::loan::{non_negative_amount, positive_amount};

/// Persisted status of a schedule entry
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq, Default)]
#[sqlx(type_name = "schedule_status", rename_all = "lowercase")]
pub enum ScheduleStatus {
    #[default]
    Unpaid,
    Paid,
    Late,
}

impl ScheduleStatus {
    /// Unpaid and Late rows still carry a balance and take part in allocation.
    pub fn is_outstanding(&self) -> bool {
        matches!(self, ScheduleStatus::Unpaid | ScheduleStatus::Late)
    }
}

/// One installment of a loan's repayment schedule
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone, PartialEq)]
pub struct ScheduleEntry {
    pub id: Uuid,
    pub loan_id: Uuid,
    pub due_date: NaiveDate,
    pub amount_due: Decimal,
    pub outstanding_balance: Decimal,
    pub status: ScheduleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Schedule entry joined with loan and customer context, for listings
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct ScheduleEntryDetail {
    pub id: Uuid,
    pub loan_id: Uuid,
    pub due_date: NaiveDate,
    pub amount_due: Decimal,
    pub outstanding_balance: Decimal,
    pub status: ScheduleStatus,
    pub loan_amount: Decimal,
    pub interest_rate: Decimal,
    pub customer_id: Uuid,
    pub full_name: String,
}

/// Request to add a schedule entry to a loan
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_new_entry"))]
pub struct CreateScheduleRequest {
    pub loan_id: Uuid,
    pub due_date: NaiveDate,
    #[validate(custom = "positive_amount")]
    pub amount_due: Decimal,
    /// Defaults to `amount_due` when omitted
    #[validate(custom = "non_negative_amount")]
    pub outstanding_balance: Option<Decimal>,
    pub status: Option<ScheduleStatus>,
}

impl CreateScheduleRequest {
    pub fn resolved_balance(&self) -> Decimal {
        self.outstanding_balance.unwrap_or(self.amount_due)
    }

    pub fn resolved_status(&self) -> ScheduleStatus {
        self.status.unwrap_or_default()
    }
}

/// Administrative correction of a schedule entry
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_corrected_entry"))]
pub struct UpdateScheduleRequest {
    pub due_date: NaiveDate,
    #[validate(custom = "positive_amount")]
    pub amount_due: Decimal,
    #[validate(custom = "non_negative_amount")]
    pub outstanding_balance: Decimal,
    pub status: ScheduleStatus,
}

fn validate_new_entry(req: &CreateScheduleRequest) -> Result<(), ValidationError> {
    check_entry_consistency(req.amount_due, req.resolved_balance(), req.resolved_status())
}

fn validate_corrected_entry(req: &UpdateScheduleRequest) -> Result<(), ValidationError> {
    check_entry_consistency(req.amount_due, req.outstanding_balance, req.status)
}

/// A row is Paid exactly when nothing is outstanding, and never owes more
/// than it was scheduled for.
fn check_entry_consistency(
    amount_due: Decimal,
    outstanding: Decimal,
    status: ScheduleStatus,
) -> Result<(), ValidationError> {
    if outstanding > amount_due {
        return Err(ValidationError::new("outstanding_exceeds_amount_due"));
    }
    match (status, outstanding.is_zero()) {
        (ScheduleStatus::Paid, false) => Err(ValidationError::new("paid_entry_has_balance")),
        (ScheduleStatus::Unpaid | ScheduleStatus::Late, true) => {
            Err(ValidationError::new("open_entry_has_no_balance"))
        }
        _ => Ok(()),
    }
}
