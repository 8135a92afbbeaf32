use thiserror::Error;

use crate::domain::SelectionError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Receipt text is empty. Enter text or run OCR again.")]
    EmptyInput,

    #[error("No total found. Check the text or enter the total manually.")]
    NoTotalFound,

    #[error("No prices found in the receipt text.")]
    NoPricesFound,

    #[error("No receipts recorded for month {0}")]
    MonthNotFound(String),

    #[error("Invalid month: {0}")]
    InvalidMonth(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Text recognition failed; the message is shown as reported by the engine.
    #[error("Text recognition failed: {0}")]
    OcrFailure(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<SelectionError> for AppError {
    fn from(err: SelectionError) -> Self {
        match err {
            SelectionError::NoTotalFound => AppError::NoTotalFound,
            SelectionError::NoPricesFound => AppError::NoPricesFound,
        }
    }
}
