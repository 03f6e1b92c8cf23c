//! Repayment schedule maintenance
//!
//! Schedule rows are written here by administrators and by the Late
//! transition. Balance changes from payments go through the payment service.

use chrono::{NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    CreateScheduleRequest, ScheduleEntry, ScheduleEntryDetail, ScheduleStatus,
    UpdateScheduleRequest,
};
use crate::repayment::ScheduleUpdate;

const SCHEDULE_DETAIL: &str = r#"
    SELECT rs.id, rs.loan_id, rs.due_date, rs.amount_due, rs.outstanding_balance, rs.status,
           l.loan_amount, l.interest_rate, l.customer_id, c.full_name
    FROM repayment_schedule rs
    JOIN loans l ON rs.loan_id = l.id
    JOIN customers c ON l.customer_id = c.id
"#;

#[derive(Clone)]
pub struct ScheduleService {
    db_pool: PgPool,
}

impl ScheduleService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    pub async fn list(&self) -> ApiResult<Vec<ScheduleEntryDetail>> {
        let query = format!("{} ORDER BY rs.due_date ASC, rs.id ASC", SCHEDULE_DETAIL);
        let rows = sqlx::query_as::<_, ScheduleEntryDetail>(&query)
            .fetch_all(&self.db_pool)
            .await?;
        Ok(rows)
    }

    pub async fn list_by_loan(&self, loan_id: Uuid) -> ApiResult<Vec<ScheduleEntry>> {
        let rows = sqlx::query_as::<_, ScheduleEntry>(
            "SELECT * FROM repayment_schedule WHERE loan_id = $1 ORDER BY due_date ASC, id ASC",
        )
        .bind(loan_id)
        .fetch_all(&self.db_pool)
        .await?;
        Ok(rows)
    }

    pub async fn create(&self, request: CreateScheduleRequest) -> ApiResult<ScheduleEntry> {
        request.validate()?;

        let entry = sqlx::query_as::<_, ScheduleEntry>(
            r#"
            INSERT INTO repayment_schedule (id, loan_id, due_date, amount_due, outstanding_balance, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.loan_id)
        .bind(request.due_date)
        .bind(request.amount_due)
        .bind(request.resolved_balance())
        .bind(request.resolved_status())
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                ApiError::not_found("Loan")
            }
            other => other.into(),
        })?;

        tracing::info!(schedule_id = %entry.id, loan_id = %entry.loan_id, due = %entry.due_date, "Schedule entry created");
        Ok(entry)
    }

    pub async fn update(&self, id: Uuid, request: UpdateScheduleRequest) -> ApiResult<ScheduleEntry> {
        request.validate()?;

        let entry = sqlx::query_as::<_, ScheduleEntry>(
            r#"
            UPDATE repayment_schedule
            SET due_date = $1, amount_due = $2, outstanding_balance = $3, status = $4, updated_at = $5
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(request.due_date)
        .bind(request.amount_due)
        .bind(request.outstanding_balance)
        .bind(request.status)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Repayment schedule entry"))?;

        tracing::info!(schedule_id = %id, status = ?entry.status, "Schedule entry updated");
        Ok(entry)
    }

    /// Move the given rows from Unpaid to Late.
    ///
    /// Rows that are no longer Unpaid (paid in the meantime, or already Late)
    /// are left alone. Returns the number of rows changed.
    pub async fn mark_late(&self, ids: &[Uuid]) -> ApiResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            UPDATE repayment_schedule
            SET status = $1, updated_at = $2
            WHERE id = ANY($3) AND status = $4
            "#,
        )
        .bind(ScheduleStatus::Late)
        .bind(Utc::now())
        .bind(ids)
        .bind(ScheduleStatus::Unpaid)
        .execute(&self.db_pool)
        .await?;

        let marked = result.rows_affected();
        if marked > 0 {
            tracing::info!(marked, "Schedule rows marked late");
        }
        Ok(marked)
    }

    /// Unpaid and Late rows due on or before `as_of`, as (id, status, due date).
    ///
    /// Whether a row is overdue, and whether it still needs its Late write, is
    /// left to the classifier.
    pub async fn open_due_by(
        &self,
        as_of: NaiveDate,
    ) -> ApiResult<Vec<(Uuid, ScheduleStatus, NaiveDate)>> {
        let rows: Vec<(Uuid, ScheduleStatus, NaiveDate)> = sqlx::query_as(
            "SELECT id, status, due_date FROM repayment_schedule WHERE status IN ($1, $2) AND due_date <= $3",
        )
        .bind(ScheduleStatus::Unpaid)
        .bind(ScheduleStatus::Late)
        .bind(as_of)
        .fetch_all(&self.db_pool)
        .await?;
        Ok(rows)
    }
}

/// Lock and load a loan's Unpaid and Late rows inside a payment transaction
pub(crate) async fn lock_outstanding(
    tx: &mut Transaction<'_, Postgres>,
    loan_id: Uuid,
) -> Result<Vec<ScheduleEntry>, sqlx::Error> {
    sqlx::query_as::<_, ScheduleEntry>(
        r#"
        SELECT * FROM repayment_schedule
        WHERE loan_id = $1 AND status IN ($2, $3)
        ORDER BY due_date ASC, id ASC
        FOR UPDATE
        "#,
    )
    .bind(loan_id)
    .bind(ScheduleStatus::Unpaid)
    .bind(ScheduleStatus::Late)
    .fetch_all(&mut **tx)
    .await
}

/// Write allocator output inside a payment transaction
pub(crate) async fn apply_updates(
    tx: &mut Transaction<'_, Postgres>,
    updates: &[ScheduleUpdate],
) -> Result<(), sqlx::Error> {
    let now = Utc::now();
    for update in updates {
        sqlx::query(
            "UPDATE repayment_schedule SET outstanding_balance = $1, status = $2, updated_at = $3 WHERE id = $4",
        )
        .bind(update.new_outstanding_balance)
        .bind(update.new_status)
        .bind(now)
        .bind(update.schedule_id)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
