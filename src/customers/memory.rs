use std::collections::BTreeMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::repo::{CustomerStore, StoreError};
use super::repo_types::{Customer, CustomerInput};

/// Customer store kept in process memory. Ids start at 1.
#[derive(Default)]
pub struct InMemoryCustomerStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    rows: BTreeMap<i64, Customer>,
    last_id: i64,
}

impl Inner {
    fn nic_taken(&self, nic: &str, except: Option<i64>) -> bool {
        self.rows
            .values()
            .any(|c| c.nic_number == nic && Some(c.id) != except)
    }
}

#[async_trait]
impl CustomerStore for InMemoryCustomerStore {
    async fn find_all(&self) -> Result<Vec<Customer>, StoreError> {
        Ok(self.inner.read().await.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Customer>, StoreError> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn find_by_nic(&self, nic: &str) -> Result<Option<Customer>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.rows.values().find(|c| c.nic_number == nic).cloned())
    }

    async fn exists_by_nic(&self, nic: &str) -> Result<bool, StoreError> {
        Ok(self.inner.read().await.nic_taken(nic, None))
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.inner.read().await.rows.contains_key(&id))
    }

    async fn insert(&self, input: &CustomerInput) -> Result<Customer, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.nic_taken(&input.nic_number, None) {
            return Err(StoreError::DuplicateNic(input.nic_number.clone()));
        }
        inner.last_id += 1;
        let now = OffsetDateTime::now_utc();
        let customer = Customer {
            id: inner.last_id,
            name: input.name.clone(),
            nic_number: input.nic_number.clone(),
            date_of_birth: input.date_of_birth,
            created_at: now,
            updated_at: now,
        };
        inner.rows.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn update(&self, id: i64, input: &CustomerInput) -> Result<Customer, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.rows.contains_key(&id) {
            return Err(StoreError::Missing(id));
        }
        if inner.nic_taken(&input.nic_number, Some(id)) {
            return Err(StoreError::DuplicateNic(input.nic_number.clone()));
        }
        let row = inner.rows.get_mut(&id).ok_or(StoreError::Missing(id))?;
        row.name = input.name.clone();
        row.nic_number = input.nic_number.clone();
        row.date_of_birth = input.date_of_birth;
        row.updated_at = OffsetDateTime::now_utc();
        Ok(row.clone())
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), StoreError> {
        self.inner.write().await.rows.remove(&id);
        Ok(())
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(self.inner.read().await.rows.len() as i64)
    }
}
