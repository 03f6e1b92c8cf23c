//! Payment models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use super::loan::positive_amount;
use crate::repayment::ScheduleUpdate;

/// How a payment was made
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Bank,
    #[serde(rename = "E-Wallet", alias = "EWallet")]
    EWallet,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Bank => "Bank",
            PaymentMethod::EWallet => "E-Wallet",
        }
    }
}

/// Payment model
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Payment {
    pub id: Uuid,
    pub loan_id: Uuid,
    pub customer_id: Uuid,
    pub payment_date: NaiveDate,
    pub amount_paid: Decimal,
    pub payment_method: PaymentMethod,
    pub reference_number: Option<String>,
    pub recorded_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payment joined with the customer name and the recording user's name
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct PaymentDetail {
    pub id: Uuid,
    pub loan_id: Uuid,
    pub customer_id: Uuid,
    pub payment_date: NaiveDate,
    pub amount_paid: Decimal,
    pub payment_method: PaymentMethod,
    pub reference_number: Option<String>,
    pub recorded_by: Uuid,
    pub full_name: String,
    pub recorded_by_name: String,
    pub created_at: DateTime<Utc>,
}

/// Request to record a payment against a loan
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordPaymentRequest {
    pub loan_id: Uuid,
    /// Must match the loan's customer when given; taken from the loan otherwise
    pub customer_id: Option<Uuid>,
    pub payment_date: NaiveDate,
    #[validate(custom = "positive_amount")]
    pub amount_paid: Decimal,
    pub payment_method: PaymentMethod,
    #[validate(length(max = 120))]
    pub reference_number: Option<String>,
}

/// Outcome of recording a payment
#[derive(Debug, Serialize)]
pub struct RecordPaymentResponse {
    pub payment: PaymentDetail,
    pub schedule_updates: Vec<ScheduleUpdate>,
    /// Portion of the payment that no outstanding schedule entry absorbed
    pub unallocated_amount: Decimal,
}

/// Administrative amendment of a payment record
#[derive(Debug, Deserialize, Validate)]
pub struct AmendPaymentRequest {
    pub payment_date: NaiveDate,
    #[validate(custom = "positive_amount")]
    pub amount_paid: Decimal,
    pub payment_method: PaymentMethod,
    #[validate(length(max = 120))]
    pub reference_number: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(amount: &str) -> RecordPaymentRequest {
        serde_json::from_value(serde_json::json!({
            "loan_id": Uuid::new_v4(),
            "payment_date": "2024-01-05",
            "amount_paid": amount,
            "payment_method": "Cash",
        }))
        .unwrap()
    }

    #[test]
    fn test_record_amount_must_be_whole_cents() {
        assert!(record("10.00").validate().is_ok());
        assert!(record("10.5").validate().is_ok());
        assert!(record("10.005").validate().is_err());
        assert!(record("0.001").validate().is_err());
        assert!(record("0").validate().is_err());
    }

    #[test]
    fn test_amend_amount_must_be_whole_cents() {
        let amend = |amount_paid| AmendPaymentRequest {
            payment_date: "2024-01-05".parse().unwrap(),
            amount_paid,
            payment_method: PaymentMethod::Bank,
            reference_number: None,
        };

        assert!(amend(dec!(40.00)).validate().is_ok());
        assert!(amend(dec!(40.004)).validate().is_err());
        assert!(amend(dec!(-1)).validate().is_err());
    }
}
