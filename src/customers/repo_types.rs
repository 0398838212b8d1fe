use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

pub const NAME_MAX_LEN: usize = 100;
pub const NIC_MAX_LEN: usize = 20;

/// Customer row in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub nic_number: String, // unique across all customers
    #[serde(serialize_with = "iso_date::serialize")]
    pub date_of_birth: Date,
    #[serde(serialize_with = "time::serde::rfc3339::serialize")]
    pub created_at: OffsetDateTime,
    #[serde(serialize_with = "time::serde::rfc3339::serialize")]
    pub updated_at: OffsetDateTime,
}

/// Validated, caller-supplied customer fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerInput {
    pub name: String,
    pub nic_number: String,
    pub date_of_birth: Date,
}
