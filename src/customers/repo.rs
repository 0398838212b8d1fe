use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;

use crate::customers::repo_types::{Customer, CustomerInput};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("nic number {0:?} already exists")]
    DuplicateNic(String),
    #[error("customer {0} does not exist")]
    Missing(i64),
    #[error("customer store unavailable")]
    Unavailable(#[source] sqlx::Error),
}

/// Persistence for customer records.
///
/// `insert` stamps `created_at` and `updated_at` with the same instant;
/// `update` refreshes only `updated_at`. Implementations must reject a
/// second record with an existing NIC number with `StoreError::DuplicateNic`.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Customer>, StoreError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Customer>, StoreError>;
    async fn find_by_nic(&self, nic: &str) -> Result<Option<Customer>, StoreError>;
    async fn exists_by_nic(&self, nic: &str) -> Result<bool, StoreError>;
    async fn exists_by_id(&self, id: i64) -> Result<bool, StoreError>;
    async fn insert(&self, input: &CustomerInput) -> Result<Customer, StoreError>;
    async fn update(&self, id: i64, input: &CustomerInput) -> Result<Customer, StoreError>;
    async fn delete_by_id(&self, id: i64) -> Result<(), StoreError>;
    async fn count(&self) -> Result<i64, StoreError>;

    /// Insert when `id` is `None`, otherwise update the existing row.
    async fn save(&self, id: Option<i64>, input: &CustomerInput) -> Result<Customer, StoreError> {
        match id {
            Some(id) => self.update(id, input).await,
            None => self.insert(input).await,
        }
    }
}

#[derive(Clone)]
pub struct PgCustomerStore {
    db: PgPool,
}

impl PgCustomerStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_write_err(e: sqlx::Error, nic: &str) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::DuplicateNic(nic.to_string())
        }
        _ => StoreError::Unavailable(e),
    }
}

#[async_trait]
impl CustomerStore for PgCustomerStore {
    async fn find_all(&self) -> Result<Vec<Customer>, StoreError> {
        sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, nic_number, date_of_birth, created_at, updated_at
              FROM customers
             ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await
        .map_err(StoreError::Unavailable)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Customer>, StoreError> {
        sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, nic_number, date_of_birth, created_at, updated_at
              FROM customers
             WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(StoreError::Unavailable)
    }

    async fn find_by_nic(&self, nic: &str) -> Result<Option<Customer>, StoreError> {
        sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, nic_number, date_of_birth, created_at, updated_at
              FROM customers
             WHERE nic_number = $1
            "#,
        )
        .bind(nic)
        .fetch_optional(&self.db)
        .await
        .map_err(StoreError::Unavailable)
    }

    async fn exists_by_nic(&self, nic: &str) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM customers WHERE nic_number = $1)",
        )
        .bind(nic)
        .fetch_one(&self.db)
        .await
        .map_err(StoreError::Unavailable)
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM customers WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.db)
            .await
            .map_err(StoreError::Unavailable)
    }

    async fn insert(&self, input: &CustomerInput) -> Result<Customer, StoreError> {
        let now = OffsetDateTime::now_utc();
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (name, nic_number, date_of_birth, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, name, nic_number, date_of_birth, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.nic_number)
        .bind(input.date_of_birth)
        .bind(now)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_write_err(e, &input.nic_number))?;

        debug!(id = customer.id, "customer inserted");
        Ok(customer)
    }

    async fn update(&self, id: i64, input: &CustomerInput) -> Result<Customer, StoreError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
               SET name = $2, nic_number = $3, date_of_birth = $4, updated_at = $5
             WHERE id = $1
            RETURNING id, name, nic_number, date_of_birth, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.nic_number)
        .bind(input.date_of_birth)
        .bind(OffsetDateTime::now_utc())
        .fetch_optional(&self.db)
        .await
        .map_err(|e| map_write_err(e, &input.nic_number))?
        .ok_or(StoreError::Missing(id))?;

        debug!(id, "customer updated");
        Ok(customer)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(StoreError::Unavailable)?;
        Ok(())
    }

    async fn count(&self) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.db)
            .await
            .map_err(StoreError::Unavailable)
    }
}
