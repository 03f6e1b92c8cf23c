//! Payment recording
//!
//! Recording a payment is one transaction: the loan row is locked, the
//! payment is inserted, the loan's outstanding schedule rows are locked and
//! the allocator's updates are written. Two payments against the same loan
//! therefore apply one after the other, each seeing the other's balances.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    AmendPaymentRequest, Payment, PaymentDetail, RecordPaymentRequest, RecordPaymentResponse,
};
use crate::repayment::{allocate, check_payment_amount, OutstandingEntry};

use super::schedule_service::{apply_updates, lock_outstanding};

const PAYMENT_DETAIL: &str = r#"
    SELECT p.id, p.loan_id, p.customer_id, p.payment_date, p.amount_paid, p.payment_method,
           p.reference_number, p.recorded_by, c.full_name, u.name AS recorded_by_name,
           p.created_at
    FROM payments p
    JOIN customers c ON p.customer_id = c.id
    JOIN users u ON p.recorded_by = u.id
"#;

#[derive(Clone)]
pub struct PaymentService {
    db_pool: PgPool,
}

impl PaymentService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    pub async fn list(&self) -> ApiResult<Vec<PaymentDetail>> {
        let query = format!("{} ORDER BY p.payment_date DESC, p.created_at DESC", PAYMENT_DETAIL);
        let payments = sqlx::query_as::<_, PaymentDetail>(&query)
            .fetch_all(&self.db_pool)
            .await?;
        Ok(payments)
    }

    pub async fn list_by_loan(&self, loan_id: Uuid) -> ApiResult<Vec<PaymentDetail>> {
        let query = format!(
            "{} WHERE p.loan_id = $1 ORDER BY p.payment_date DESC, p.created_at DESC",
            PAYMENT_DETAIL
        );
        let payments = sqlx::query_as::<_, PaymentDetail>(&query)
            .bind(loan_id)
            .fetch_all(&self.db_pool)
            .await?;
        Ok(payments)
    }

    pub async fn get(&self, id: Uuid) -> ApiResult<PaymentDetail> {
        let query = format!("{} WHERE p.id = $1", PAYMENT_DETAIL);
        sqlx::query_as::<_, PaymentDetail>(&query)
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Payment"))
    }

    /// Record a payment and spread it over the loan's outstanding schedule.
    ///
    /// Any amount left after every outstanding row is settled is reported as
    /// `unallocated_amount` and is not credited anywhere.
    pub async fn record(
        &self,
        request: RecordPaymentRequest,
        recorded_by: Uuid,
    ) -> ApiResult<RecordPaymentResponse> {
        check_payment_amount(request.amount_paid)?;

        let mut tx = self.db_pool.begin().await?;

        let loan: Option<(Uuid,)> =
            sqlx::query_as("SELECT customer_id FROM loans WHERE id = $1 FOR UPDATE")
                .bind(request.loan_id)
                .fetch_optional(&mut *tx)
                .await?;
        let (loan_customer,) = loan.ok_or_else(|| ApiError::not_found("Loan"))?;

        let customer_id = match request.customer_id {
            Some(given) if given != loan_customer => {
                return Err(ApiError::BadRequest(
                    "Customer does not match the loan's customer".to_string(),
                ))
            }
            _ => loan_customer,
        };

        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (
                id, loan_id, customer_id, payment_date, amount_paid,
                payment_method, reference_number, recorded_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.loan_id)
        .bind(customer_id)
        .bind(request.payment_date)
        .bind(request.amount_paid)
        .bind(request.payment_method)
        .bind(&request.reference_number)
        .bind(recorded_by)
        .fetch_one(&mut *tx)
        .await?;

        let outstanding: Vec<OutstandingEntry> = lock_outstanding(&mut tx, request.loan_id)
            .await?
            .iter()
            .map(OutstandingEntry::from)
            .collect();

        let allocation = allocate(request.amount_paid, &outstanding)?;
        apply_updates(&mut tx, &allocation.updates).await?;

        tx.commit().await?;

        tracing::info!(
            payment_id = %payment.id,
            loan_id = %payment.loan_id,
            amount = %payment.amount_paid,
            rows_updated = allocation.updates.len(),
            "Payment recorded"
        );
        if allocation.unallocated > Decimal::ZERO {
            tracing::warn!(
                payment_id = %payment.id,
                loan_id = %payment.loan_id,
                unallocated = %allocation.unallocated,
                "Overpayment residual left unallocated"
            );
        }

        Ok(RecordPaymentResponse {
            payment: self.get(payment.id).await?,
            schedule_updates: allocation.updates,
            unallocated_amount: allocation.unallocated,
        })
    }

    /// Correct a payment record. Schedule balances are not re-allocated.
    pub async fn amend(&self, id: Uuid, request: AmendPaymentRequest) -> ApiResult<PaymentDetail> {
        check_payment_amount(request.amount_paid)?;

        let result = sqlx::query(
            r#"
            UPDATE payments
            SET payment_date = $1, amount_paid = $2, payment_method = $3,
                reference_number = $4, updated_at = $5
            WHERE id = $6
            "#,
        )
        .bind(request.payment_date)
        .bind(request.amount_paid)
        .bind(request.payment_method)
        .bind(&request.reference_number)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.db_pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Payment"));
        }

        tracing::warn!(payment_id = %id, amount = %request.amount_paid, "Payment amended without re-allocation");
        self.get(id).await
    }
}
