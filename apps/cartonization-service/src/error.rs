//! Error types for the cartonization service.

use cartonization_core::{CoreError, ValidationError};
use cartonization_db::DbError;

/// Application service errors.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] DbError),

    /// The SKU is unknown to the product catalog, or the product is inactive.
    #[error("Product not found for SKU: {sku}")]
    ProductNotFound { sku: String },

    #[error("Carton not found: {id}")]
    CartonNotFound { id: String },

    #[error("No active cartons available")]
    NoActiveCartons,

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Publish failed: {0}")]
    Publish(String),
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Core(CoreError::Validation(err))
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Serialization(err.to_string())
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
