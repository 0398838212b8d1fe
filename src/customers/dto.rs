use serde::Deserialize;
use time::{macros::format_description, Date};

use crate::customers::repo_types::{CustomerInput, NAME_MAX_LEN, NIC_MAX_LEN};
use crate::error::AppError;

/// Request body for create and update.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRequest {
    pub name: Option<String>,
    pub nic_number: Option<String>,
    pub date_of_birth: Option<String>, // YYYY-MM-DD
}

impl CustomerRequest {
    pub fn validate(self) -> Result<CustomerInput, AppError> {
        let name = required_text("name", self.name, NAME_MAX_LEN)?;
        let nic_number = required_text("nicNumber", self.nic_number, NIC_MAX_LEN)?;

        let raw_dob = self
            .date_of_birth
            .ok_or_else(|| AppError::Validation("dateOfBirth is required".into()))?;
        let date_of_birth = Date::parse(raw_dob.trim(), &format_description!("[year]-[month]-[day]"))
            .map_err(|_| AppError::Validation("dateOfBirth must be YYYY-MM-DD".into()))?;

        Ok(CustomerInput {
            name,
            nic_number,
            date_of_birth,
        })
    }
}

fn required_text(field: &str, value: Option<String>, max_len: usize) -> Result<String, AppError> {
    let value = value.map(|v| v.trim().to_string()).unwrap_or_default();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    if value.chars().count() > max_len {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(value)
}
