//! Report payloads

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{LoanTerm, LoanWithCustomer, PaymentMethod, ScheduleStatus};
use crate::repayment::DerivedStatus;

/// Reporting window selector
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

/// Query parameters shared by period-based reports
#[derive(Debug, Deserialize, Default)]
pub struct PeriodQuery {
    pub period: Option<ReportPeriod>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Inclusive date range a period report covers
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ActiveLoansSummary {
    pub total: i64,
    pub total_amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct ActiveLoansReport {
    pub summary: ActiveLoansSummary,
    pub loans: Vec<LoanWithCustomer>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct OutstandingBalanceRow {
    pub customer_id: Uuid,
    pub full_name: String,
    pub contact_number: String,
    pub active_loans: i64,
    pub total_outstanding: Decimal,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct CollectionRow {
    pub payment_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub payment_count: i64,
    pub total_collected: Decimal,
    pub unique_customers: i64,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct CollectionsSummary {
    pub total_payments: i64,
    pub total_amount: Decimal,
    pub unique_customers: i64,
}

#[derive(Debug, Serialize)]
pub struct CollectionsReport {
    pub period: ReportPeriod,
    pub range: DateRange,
    pub summary: CollectionsSummary,
    pub collections: Vec<CollectionRow>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct LoansByPeriodSummary {
    pub total_loans: i64,
    pub total_amount: Decimal,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct LoansByDayRow {
    pub loan_date: NaiveDate,
    pub loan_count: i64,
    pub total_amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct LoansByPeriodReport {
    pub period: ReportPeriod,
    pub range: DateRange,
    pub summary: LoansByPeriodSummary,
    pub breakdown: Vec<LoansByDayRow>,
}

/// Past-due schedule row with its loan and customer, as loaded for the overdue report
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OverdueCandidate {
    pub schedule_id: Uuid,
    pub loan_id: Uuid,
    pub due_date: NaiveDate,
    pub amount_due: Decimal,
    pub outstanding_balance: Decimal,
    pub status: ScheduleStatus,
    pub loan_amount: Decimal,
    pub loan_term: LoanTerm,
    pub customer_id: Uuid,
    pub full_name: String,
    pub contact_number: String,
}

#[derive(Debug, Serialize)]
pub struct OverdueRow {
    pub schedule_id: Uuid,
    pub loan_id: Uuid,
    pub due_date: NaiveDate,
    pub amount_due: Decimal,
    pub outstanding_balance: Decimal,
    /// Persisted status after this report ran
    pub status: ScheduleStatus,
    pub payment_status: DerivedStatus,
    pub days_overdue: i64,
    pub loan_amount: Decimal,
    pub loan_term: LoanTerm,
    pub customer_id: Uuid,
    pub full_name: String,
    pub contact_number: String,
}

#[derive(Debug, Serialize)]
pub struct OverdueReport {
    pub as_of: NaiveDate,
    pub marked_late: u64,
    pub entries: Vec<OverdueRow>,
}
