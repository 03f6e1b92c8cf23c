//! Management reports
//!
//! All date filters are bound parameters. Period reports cover an inclusive
//! date range resolved by [`resolve_range`].

use chrono::{Duration, NaiveDate, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::error::ApiResult;
use crate::models::{
    ActiveLoansReport, ActiveLoansSummary, CollectionRow, CollectionsReport, CollectionsSummary,
    DateRange, LoanStatus, LoanWithCustomer, LoansByDayRow, LoansByPeriodReport,
    LoansByPeriodSummary, OutstandingBalanceRow, OverdueCandidate, OverdueReport, OverdueRow,
    PeriodQuery, ReportPeriod, ScheduleStatus,
};
use crate::repayment::classify;

use super::ScheduleService;

/// Date range a period report covers.
///
/// An explicit start and end win over the period; otherwise `daily` is
/// today, `weekly` the last 7 days and `monthly` the last 30 days, each
/// ending today. A reversed explicit range is swapped.
pub fn resolve_range(
    period: ReportPeriod,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> DateRange {
    if let (Some(start), Some(end)) = (start, end) {
        return if start <= end {
            DateRange { start, end }
        } else {
            DateRange { start: end, end: start }
        };
    }

    let days_back = match period {
        ReportPeriod::Daily => 0,
        ReportPeriod::Weekly => 6,
        ReportPeriod::Monthly => 29,
    };
    DateRange {
        start: today - Duration::days(days_back),
        end: today,
    }
}

#[derive(Clone)]
pub struct ReportService {
    db_pool: PgPool,
    schedule_service: Arc<ScheduleService>,
}

impl ReportService {
    pub fn new(db_pool: PgPool, schedule_service: Arc<ScheduleService>) -> Self {
        Self {
            db_pool,
            schedule_service,
        }
    }

    pub async fn active_loans(&self) -> ApiResult<ActiveLoansReport> {
        let summary = sqlx::query_as::<_, ActiveLoansSummary>(
            r#"
            SELECT COUNT(*)::BIGINT AS total, COALESCE(SUM(loan_amount), 0) AS total_amount
            FROM loans
            WHERE loan_status = $1
            "#,
        )
        .bind(LoanStatus::Active)
        .fetch_one(&self.db_pool)
        .await?;

        let loans = sqlx::query_as::<_, LoanWithCustomer>(
            r#"
            SELECT l.id, l.customer_id, l.loan_amount, l.interest_rate, l.loan_term,
                   l.start_date, l.end_date, l.loan_status, c.full_name, c.contact_number,
                   l.created_at, l.updated_at
            FROM loans l
            JOIN customers c ON l.customer_id = c.id
            WHERE l.loan_status = $1
            ORDER BY l.start_date DESC
            "#,
        )
        .bind(LoanStatus::Active)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(ActiveLoansReport { summary, loans })
    }

    /// Per-customer unpaid balance over active loans, largest first
    pub async fn outstanding_balance(&self) -> ApiResult<Vec<OutstandingBalanceRow>> {
        let rows = sqlx::query_as::<_, OutstandingBalanceRow>(
            r#"
            SELECT c.id AS customer_id, c.full_name, c.contact_number,
                   COUNT(DISTINCT l.id)::BIGINT AS active_loans,
                   COALESCE(SUM(rs.outstanding_balance), 0) AS total_outstanding
            FROM customers c
            JOIN loans l ON l.customer_id = c.id AND l.loan_status = $1
            JOIN repayment_schedule rs ON rs.loan_id = l.id AND rs.status <> $2
            GROUP BY c.id, c.full_name, c.contact_number
            HAVING COALESCE(SUM(rs.outstanding_balance), 0) > 0
            ORDER BY total_outstanding DESC
            "#,
        )
        .bind(LoanStatus::Active)
        .bind(ScheduleStatus::Paid)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(rows)
    }

    /// Payments grouped by day and method
    pub async fn collections(&self, query: PeriodQuery) -> ApiResult<CollectionsReport> {
        let period = query.period.unwrap_or_default();
        let range = resolve_range(period, query.start_date, query.end_date, today());

        let collections = sqlx::query_as::<_, CollectionRow>(
            r#"
            SELECT payment_date, payment_method,
                   COUNT(*)::BIGINT AS payment_count,
                   COALESCE(SUM(amount_paid), 0) AS total_collected,
                   COUNT(DISTINCT customer_id)::BIGINT AS unique_customers
            FROM payments
            WHERE payment_date BETWEEN $1 AND $2
            GROUP BY payment_date, payment_method
            ORDER BY payment_date DESC, payment_method
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db_pool)
        .await?;

        let summary = sqlx::query_as::<_, CollectionsSummary>(
            r#"
            SELECT COUNT(*)::BIGINT AS total_payments,
                   COALESCE(SUM(amount_paid), 0) AS total_amount,
                   COUNT(DISTINCT customer_id)::BIGINT AS unique_customers
            FROM payments
            WHERE payment_date BETWEEN $1 AND $2
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(CollectionsReport {
            period,
            range,
            summary,
            collections,
        })
    }

    /// Loans originated in the range, with a per-day breakdown
    pub async fn loans_by_period(&self, query: PeriodQuery) -> ApiResult<LoansByPeriodReport> {
        let period = query.period.unwrap_or_default();
        let range = resolve_range(period, query.start_date, query.end_date, today());

        let summary = sqlx::query_as::<_, LoansByPeriodSummary>(
            r#"
            SELECT COUNT(*)::BIGINT AS total_loans, COALESCE(SUM(loan_amount), 0) AS total_amount
            FROM loans
            WHERE start_date BETWEEN $1 AND $2
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&self.db_pool)
        .await?;

        let breakdown = sqlx::query_as::<_, LoansByDayRow>(
            r#"
            SELECT start_date AS loan_date, COUNT(*)::BIGINT AS loan_count,
                   COALESCE(SUM(loan_amount), 0) AS total_amount
            FROM loans
            WHERE start_date BETWEEN $1 AND $2
            GROUP BY start_date
            ORDER BY start_date DESC
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(LoansByPeriodReport {
            period,
            range,
            summary,
            breakdown,
        })
    }

    /// Past-due Unpaid and Late rows, oldest first.
    ///
    /// Unpaid rows found past due are moved to Late before the report is
    /// returned; each row's `status` is the persisted status afterwards.
    pub async fn overdue(&self) -> ApiResult<OverdueReport> {
        let as_of = today();

        let candidates = sqlx::query_as::<_, OverdueCandidate>(
            r#"
            SELECT rs.id AS schedule_id, rs.loan_id, rs.due_date, rs.amount_due,
                   rs.outstanding_balance, rs.status, l.loan_amount, l.loan_term,
                   l.customer_id, c.full_name, c.contact_number
            FROM repayment_schedule rs
            JOIN loans l ON rs.loan_id = l.id
            JOIN customers c ON l.customer_id = c.id
            WHERE rs.status IN ($1, $2) AND rs.due_date < $3
            ORDER BY rs.due_date ASC, rs.id ASC
            "#,
        )
        .bind(ScheduleStatus::Unpaid)
        .bind(ScheduleStatus::Late)
        .bind(as_of)
        .fetch_all(&self.db_pool)
        .await?;

        let entries = build_overdue_rows(candidates, as_of);

        let to_mark: Vec<_> = entries
            .iter()
            .filter(|(_, needs_late)| *needs_late)
            .map(|(row, _)| row.schedule_id)
            .collect();
        let marked_late = self.schedule_service.mark_late(&to_mark).await?;

        Ok(OverdueReport {
            as_of,
            marked_late,
            entries: entries.into_iter().map(|(row, _)| row).collect(),
        })
    }
}

/// Classify candidates; the flag says whether the row still needs its Late write
fn build_overdue_rows(candidates: Vec<OverdueCandidate>, as_of: NaiveDate) -> Vec<(OverdueRow, bool)> {
    candidates
        .into_iter()
        .map(|c| {
            let classification = classify(c.status, c.due_date, as_of);
            let row = OverdueRow {
                schedule_id: c.schedule_id,
                loan_id: c.loan_id,
                due_date: c.due_date,
                amount_due: c.amount_due,
                outstanding_balance: c.outstanding_balance,
                status: classification.resulting_status(c.status),
                payment_status: classification.derived_status,
                days_overdue: classification.days_overdue,
                loan_amount: c.loan_amount,
                loan_term: c.loan_term,
                customer_id: c.customer_id,
                full_name: c.full_name,
                contact_number: c.contact_number,
            };
            (row, classification.requires_late_transition)
        })
        .collect()
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LoanTerm;
    use crate::repayment::DerivedStatus;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_period_ranges_end_today() {
        let today = date("2024-03-15");
        assert_eq!(
            resolve_range(ReportPeriod::Daily, None, None, today),
            DateRange { start: today, end: today }
        );
        assert_eq!(
            resolve_range(ReportPeriod::Weekly, None, None, today).start,
            date("2024-03-09")
        );
        assert_eq!(
            resolve_range(ReportPeriod::Monthly, None, None, today).start,
            date("2024-02-15")
        );
    }

    #[test]
    fn test_explicit_range_wins() {
        let range = resolve_range(
            ReportPeriod::Daily,
            Some(date("2024-01-01")),
            Some(date("2024-01-31")),
            date("2024-03-15"),
        );
        assert_eq!(range.start, date("2024-01-01"));
        assert_eq!(range.end, date("2024-01-31"));

        // Only one bound falls back to the period
        let range = resolve_range(ReportPeriod::Daily, Some(date("2024-01-01")), None, date("2024-03-15"));
        assert_eq!(range.start, date("2024-03-15"));

        let swapped = resolve_range(
            ReportPeriod::Daily,
            Some(date("2024-01-31")),
            Some(date("2024-01-01")),
            date("2024-03-15"),
        );
        assert_eq!(swapped.start, date("2024-01-01"));
    }

    fn candidate(due: &str, status: ScheduleStatus) -> OverdueCandidate {
        OverdueCandidate {
            schedule_id: Uuid::new_v4(),
            loan_id: Uuid::new_v4(),
            due_date: date(due),
            amount_due: dec!(100),
            outstanding_balance: dec!(100),
            status,
            loan_amount: dec!(1000),
            loan_term: LoanTerm::Monthly,
            customer_id: Uuid::new_v4(),
            full_name: "Ana Cruz".to_string(),
            contact_number: "0917".to_string(),
        }
    }

    #[test]
    fn test_overdue_rows_report_status_after_transition() {
        let rows = build_overdue_rows(
            vec![
                candidate("2024-01-01", ScheduleStatus::Unpaid),
                candidate("2024-01-05", ScheduleStatus::Late),
            ],
            date("2024-01-11"),
        );

        let (first, needs_late) = &rows[0];
        assert!(*needs_late);
        assert_eq!(first.status, ScheduleStatus::Late);
        assert_eq!(first.payment_status, DerivedStatus::Overdue);
        assert_eq!(first.days_overdue, 10);

        let (second, needs_late) = &rows[1];
        assert!(!*needs_late);
        assert_eq!(second.status, ScheduleStatus::Late);
        assert_eq!(second.payment_status, DerivedStatus::Late);
        assert_eq!(second.days_overdue, 6);
    }
}
