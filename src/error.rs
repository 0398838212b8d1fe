//! Service errors and their HTTP status mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::customers::repo::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("customer not found")]
    NotFound,
    #[error("nic number already registered")]
    Conflict,
    #[error("validation: {0}")]
    Validation(String),
    #[error(transparent)]
    Storage(StoreError),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateNic(_) => AppError::Conflict,
            StoreError::Missing(_) => AppError::NotFound,
            other => AppError::Storage(other),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Status code only; details stay in the logs.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Storage(e) => error!(error = %e, detail = ?e, "storage failure"),
            other => warn!(error = %other, %status, "request rejected"),
        }
        status.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_service_errors() {
        assert!(matches!(
            AppError::from(StoreError::DuplicateNic("NIC001".into())),
            AppError::Conflict
        ));
        assert!(matches!(AppError::from(StoreError::Missing(7)), AppError::NotFound));
        assert!(matches!(
            AppError::from(StoreError::Unavailable(sqlx::Error::PoolClosed)),
            AppError::Storage(_)
        ));
    }

    #[test]
    fn statuses() {
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Conflict.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Storage(StoreError::Unavailable(sqlx::Error::PoolClosed)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
