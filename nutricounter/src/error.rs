//! Error types for the NutriCounter core
//!
//! All errors use thiserror for structured error handling.
//! These errors can be serialized to the frontend.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Inference endpoint returned status {status}: {detail}")]
    Inference { status: u16, detail: String },

    #[error("Could not parse inference response: {0}")]
    ParseResponse(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Food log record not found: {0}")]
    RecordNotFound(String),

    #[error("Subscription error: {0}")]
    Subscription(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Whether the inference reply arrived but could not be parsed, as
    /// opposed to the call itself failing. The two classes map to different
    /// user-facing messages.
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            AppError::ParseResponse(_) | AppError::Serialization(_)
        )
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
