//! Customer records

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{CreateCustomerRequest, Customer, ImportSummary, UpdateCustomerRequest};

use super::tabular::{parse_customer_import, to_csv};

#[derive(Clone)]
pub struct CustomerService {
    db_pool: PgPool,
}

impl CustomerService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// All customers, newest registration first
    pub async fn list(&self) -> ApiResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers ORDER BY date_registered DESC, created_at DESC",
        )
        .fetch_all(&self.db_pool)
        .await?;
        Ok(customers)
    }

    pub async fn get(&self, id: Uuid) -> ApiResult<Customer> {
        sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Customer"))
    }

    pub async fn create(&self, request: CreateCustomerRequest) -> ApiResult<Customer> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (
                id, full_name, contact_number, address, id_type, id_number,
                date_registered, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.full_name)
        .bind(&request.contact_number)
        .bind(&request.address)
        .bind(&request.id_type)
        .bind(&request.id_number)
        .bind(request.date_registered)
        .bind(request.status.unwrap_or_default())
        .fetch_one(&self.db_pool)
        .await?;

        tracing::info!(customer_id = %customer.id, "Customer registered");
        Ok(customer)
    }

    pub async fn update(&self, id: Uuid, request: UpdateCustomerRequest) -> ApiResult<Customer> {
        sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET full_name = $1, contact_number = $2, address = $3, id_type = $4,
                id_number = $5, status = $6, updated_at = $7
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(&request.full_name)
        .bind(&request.contact_number)
        .bind(&request.address)
        .bind(&request.id_type)
        .bind(&request.id_number)
        .bind(request.status)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer"))
    }

    /// Delete a customer. Fails with Conflict while loans or payments reference it.
    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Customer"));
        }

        tracing::info!(customer_id = %id, "Customer deleted");
        Ok(())
    }

    pub async fn export_csv(&self) -> ApiResult<Vec<u8>> {
        let customers = self.list().await?;
        Ok(to_csv(&customers)?)
    }

    /// Create one customer per valid CSV row; bad rows are reported, not fatal
    pub async fn import_csv(&self, body: &[u8]) -> ApiResult<ImportSummary> {
        let parsed = parse_customer_import(body, Utc::now().date_naive())?;
        let mut errors = parsed.errors;
        let mut imported = 0;

        for (row_number, request) in parsed.rows {
            match self.create(request).await {
                Ok(_) => imported += 1,
                Err(e) => errors.push(format!("Row {}: {}", row_number, e)),
            }
        }

        tracing::info!(imported, errors = errors.len(), "Customer import finished");
        Ok(ImportSummary::new("customers", imported, errors))
    }
}
