//! Loan origination and maintenance

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    CreateLoanRequest, ImportSummary, Loan, LoanWithCustomer, UpdateLoanRequest,
};

use super::tabular::{parse_loan_import, to_csv};

const LOAN_WITH_CUSTOMER: &str = r#"
    SELECT l.id, l.customer_id, l.loan_amount, l.interest_rate, l.loan_term,
           l.start_date, l.end_date, l.loan_status, c.full_name, c.contact_number,
           l.created_at, l.updated_at
    FROM loans l
    JOIN customers c ON l.customer_id = c.id
"#;

/// Loan service for managing loan records
#[derive(Clone)]
pub struct LoanService {
    db_pool: PgPool,
}

impl LoanService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// List loans with their customer's name and contact, newest first
    pub async fn list(&self) -> ApiResult<Vec<LoanWithCustomer>> {
        let query = format!("{} ORDER BY l.created_at DESC", LOAN_WITH_CUSTOMER);
        let loans = sqlx::query_as::<_, LoanWithCustomer>(&query)
            .fetch_all(&self.db_pool)
            .await?;
        Ok(loans)
    }

    pub async fn get(&self, id: Uuid) -> ApiResult<LoanWithCustomer> {
        let query = format!("{} WHERE l.id = $1", LOAN_WITH_CUSTOMER);
        sqlx::query_as::<_, LoanWithCustomer>(&query)
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Loan"))
    }

    pub async fn list_by_customer(&self, customer_id: Uuid) -> ApiResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            "SELECT * FROM loans WHERE customer_id = $1 ORDER BY created_at DESC",
        )
        .bind(customer_id)
        .fetch_all(&self.db_pool)
        .await?;
        Ok(loans)
    }

    /// Originate a loan for an existing customer
    pub async fn create(&self, request: CreateLoanRequest) -> ApiResult<LoanWithCustomer> {
        let customer_exists: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM customers WHERE id = $1")
                .bind(request.customer_id)
                .fetch_optional(&self.db_pool)
                .await?;
        if customer_exists.is_none() {
            return Err(ApiError::NotFound(format!(
                "Customer {} not found",
                request.customer_id
            )));
        }

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (
                id, customer_id, loan_amount, interest_rate, loan_term,
                start_date, end_date, loan_status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.customer_id)
        .bind(request.loan_amount)
        .bind(request.interest_rate)
        .bind(request.loan_term)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.loan_status.unwrap_or_default())
        .fetch_one(&self.db_pool)
        .await?;

        tracing::info!(
            loan_id = %loan.id,
            customer_id = %loan.customer_id,
            amount = %loan.loan_amount,
            "Loan created"
        );

        self.get(loan.id).await
    }

    pub async fn update(&self, id: Uuid, request: UpdateLoanRequest) -> ApiResult<LoanWithCustomer> {
        let updated = sqlx::query(
            r#"
            UPDATE loans
            SET loan_amount = $1, interest_rate = $2, loan_term = $3, start_date = $4,
                end_date = $5, loan_status = $6, updated_at = $7
            WHERE id = $8
            "#,
        )
        .bind(request.loan_amount)
        .bind(request.interest_rate)
        .bind(request.loan_term)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.loan_status)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.db_pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(ApiError::not_found("Loan"));
        }

        tracing::info!(loan_id = %id, status = %request.loan_status.as_str(), "Loan updated");
        self.get(id).await
    }

    /// Delete a loan and its schedule. Fails with Conflict once payments exist.
    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM loans WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Loan"));
        }

        tracing::info!(loan_id = %id, "Loan deleted");
        Ok(())
    }

    pub async fn export_csv(&self) -> ApiResult<Vec<u8>> {
        let loans = self.list().await?;
        Ok(to_csv(&loans)?)
    }

    pub async fn import_csv(&self, body: &[u8]) -> ApiResult<ImportSummary> {
        let parsed = parse_loan_import(body, Utc::now().date_naive())?;
        let mut errors = parsed.errors;
        let mut imported = 0;

        for (row_number, request) in parsed.rows {
            match self.create(request).await {
                Ok(_) => imported += 1,
                Err(ApiError::NotFound(message)) => {
                    errors.push(format!("Row {}: {}", row_number, message))
                }
                Err(e) => errors.push(format!("Row {}: {}", row_number, e)),
            }
        }

        tracing::info!(imported, errors = errors.len(), "Loan import finished");
        Ok(ImportSummary::new("loans", imported, errors))
    }
}
