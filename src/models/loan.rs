//! Loan models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::repayment::is_whole_cents;

/// Repayment cadence of a loan
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq, Default)]
#[sqlx(type_name = "loan_term", rename_all = "lowercase")]
pub enum LoanTerm {
    Weekly,
    #[default]
    Monthly,
}

impl LoanTerm {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Some(LoanTerm::Weekly),
            "monthly" => Some(LoanTerm::Monthly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoanTerm::Weekly => "Weekly",
            LoanTerm::Monthly => "Monthly",
        }
    }
}

/// Loan status enum
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq, Default)]
#[sqlx(type_name = "loan_status", rename_all = "lowercase")]
pub enum LoanStatus {
    #[default]
    Pending,
    Approved,
    Active,
    Closed,
}

impl LoanStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(LoanStatus::Pending),
            "approved" => Some(LoanStatus::Approved),
            "active" => Some(LoanStatus::Active),
            "closed" => Some(LoanStatus::Closed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Pending => "Pending",
            LoanStatus::Approved => "Approved",
            LoanStatus::Active => "Active",
            LoanStatus::Closed => "Closed",
        }
    }
}

/// Loan model
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Loan {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub loan_amount: Decimal,
    pub interest_rate: Decimal,
    pub loan_term: LoanTerm,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub loan_status: LoanStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Loan joined with the owning customer's name and contact
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct LoanWithCustomer {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub loan_amount: Decimal,
    pub interest_rate: Decimal,
    pub loan_term: LoanTerm,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub loan_status: LoanStatus,
    pub full_name: String,
    pub contact_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to originate a loan
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_loan_dates"))]
pub struct CreateLoanRequest {
    pub customer_id: Uuid,
    #[validate(custom = "positive_amount")]
    pub loan_amount: Decimal,
    #[validate(custom = "non_negative_rate")]
    pub interest_rate: Decimal,
    pub loan_term: LoanTerm,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub loan_status: Option<LoanStatus>,
}

/// Request to update a loan
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_update_dates"))]
pub struct UpdateLoanRequest {
    #[validate(custom = "positive_amount")]
    pub loan_amount: Decimal,
    #[validate(custom = "non_negative_rate")]
    pub interest_rate: Decimal,
    pub loan_term: LoanTerm,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub loan_status: LoanStatus,
}

/// Money stored in a `NUMERIC(14, 2)` column: greater than zero, whole cents
pub(crate) fn positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if !value.is_sign_positive() || value.is_zero() {
        return Err(ValidationError::new("amount_must_be_positive"));
    }
    whole_cents(value)
}

pub(crate) fn non_negative_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("amount_must_not_be_negative"));
    }
    whole_cents(value)
}

fn whole_cents(value: &Decimal) -> Result<(), ValidationError> {
    if is_whole_cents(*value) {
        Ok(())
    } else {
        Err(ValidationError::new("amount_has_sub_cent_digits"))
    }
}

fn non_negative_rate(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        Err(ValidationError::new("rate_must_not_be_negative"))
    } else {
        Ok(())
    }
}

fn validate_loan_dates(req: &CreateLoanRequest) -> Result<(), ValidationError> {
    check_date_order(req.start_date, req.end_date)
}

fn validate_update_dates(req: &UpdateLoanRequest) -> Result<(), ValidationError> {
    check_date_order(req.start_date, req.end_date)
}

fn check_date_order(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if end < start {
        return Err(ValidationError::new("end_date_before_start_date"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(amount: Decimal, start: &str, end: &str) -> CreateLoanRequest {
        CreateLoanRequest {
            customer_id: Uuid::new_v4(),
            loan_amount: amount,
            interest_rate: dec!(5),
            loan_term: LoanTerm::Monthly,
            start_date: start.parse().unwrap(),
            end_date: end.parse().unwrap(),
            loan_status: None,
        }
    }

    #[test]
    fn test_create_loan_validation() {
        assert!(request(dec!(1000), "2024-01-01", "2024-06-30").validate().is_ok());
        assert!(request(dec!(0), "2024-01-01", "2024-06-30").validate().is_err());
        assert!(request(dec!(-10), "2024-01-01", "2024-06-30").validate().is_err());
        assert!(request(dec!(1000), "2024-06-30", "2024-01-01").validate().is_err());
        assert!(request(dec!(1000.005), "2024-01-01", "2024-06-30").validate().is_err());
    }

    #[test]
    fn test_status_and_term_parsing() {
        assert_eq!(LoanStatus::parse("Active"), Some(LoanStatus::Active));
        assert_eq!(LoanStatus::parse(" closed "), Some(LoanStatus::Closed));
        assert_eq!(LoanStatus::parse("defaulted"), None);
        assert_eq!(LoanTerm::parse("WEEKLY"), Some(LoanTerm::Weekly));
        assert_eq!(LoanTerm::parse("daily"), None);
    }
}
