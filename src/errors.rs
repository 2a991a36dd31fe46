use std::{fmt, string::FromUtf8Error};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Io(#[from] tokio::io::Error),

    #[error("Unexpected Error: {0}")]
    Custom(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Failed parsing utf8 string: {0}")]
    Utf8(#[from] FromUtf8Error),

    #[error(transparent)]
    Diesel(#[from] diesel::result::Error),

    #[error(transparent)]
    RedisError(#[from] redis::RedisError),

    #[error(transparent)]
    DbPool(#[from] diesel_async::pooled_connection::deadpool::PoolError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("Failed reading CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed reading spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Failed writing spreadsheet: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Invalid upload: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
}

/// Error messages for the API Responses
pub enum ErrorMessages {
    Unexpected,
    DB,
    NotFound,
    Unauthorized,
    Forbidden,
    ImportJobMissing,
}

// Use the ErrorMessages enum to display error messages for the API Responses
impl fmt::Display for ErrorMessages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ErrorMessages::Unexpected => "We encountered an unexpected error while processing the request.",
            ErrorMessages::DB => "An unforeseen database error has occurred. Kindly try again after some time.",
            ErrorMessages::NotFound => "The requested record does not exist.",
            ErrorMessages::Unauthorized => "Missing or invalid authorization header",
            ErrorMessages::Forbidden => "Admin access is required for this action.",
            ErrorMessages::ImportJobMissing => "No import job was found for the given id. Jobs expire one hour after they finish.",
        };
        write!(f, "{message}")
    }
}
