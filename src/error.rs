use crate::domain::ports::PurchaseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CartError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Purchase error: {0}")]
    PurchaseError(#[from] PurchaseError),
}

pub type Result<T> = std::result::Result<T, CartError>;
