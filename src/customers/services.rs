use tracing::{info, warn};

use crate::customers::repo::CustomerStore;
use crate::customers::repo_types::{Customer, CustomerInput};
use crate::error::AppError;

pub async fn list_customers(store: &dyn CustomerStore) -> Result<Vec<Customer>, AppError> {
    Ok(store.find_all().await?)
}

pub async fn get_customer(store: &dyn CustomerStore, id: i64) -> Result<Customer, AppError> {
    store.find_by_id(id).await?.ok_or(AppError::NotFound)
}

pub async fn get_customer_by_nic(store: &dyn CustomerStore, nic: &str) -> Result<Customer, AppError> {
    store.find_by_nic(nic).await?.ok_or(AppError::NotFound)
}

pub async fn count_customers(store: &dyn CustomerStore) -> Result<i64, AppError> {
    Ok(store.count().await?)
}

/// Insert a new customer unless its NIC number is already registered.
///
/// The existence check is a fast path; a concurrent insert that slips past
/// it is still rejected by the store and surfaces as `Conflict`.
pub async fn create_customer(
    store: &dyn CustomerStore,
    input: CustomerInput,
) -> Result<Customer, AppError> {
    if store.exists_by_nic(&input.nic_number).await? {
        warn!(nic = %input.nic_number, "nic already registered");
        return Err(AppError::Conflict);
    }
    let customer = store.save(None, &input).await?;
    info!(id = customer.id, "customer created");
    Ok(customer)
}

/// Replace name, NIC number and date of birth of an existing customer.
pub async fn update_customer(
    store: &dyn CustomerStore,
    id: i64,
    input: CustomerInput,
) -> Result<Customer, AppError> {
    let existing = store.find_by_id(id).await?.ok_or(AppError::NotFound)?;

    if existing.nic_number != input.nic_number && store.exists_by_nic(&input.nic_number).await? {
        warn!(id, nic = %input.nic_number, "nic already registered to another customer");
        return Err(AppError::Conflict);
    }

    let customer = store.save(Some(existing.id), &input).await?;
    info!(id, "customer updated");
    Ok(customer)
}

pub async fn delete_customer(store: &dyn CustomerStore, id: i64) -> Result<(), AppError> {
    if !store.exists_by_id(id).await? {
        return Err(AppError::NotFound);
    }
    store.delete_by_id(id).await?;
    info!(id, "customer deleted");
    Ok(())
}
