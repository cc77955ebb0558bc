use thiserror::Error;

use crate::models::Field;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("{field}: {reason}")]
    Validation { field: Field, reason: String },

    #[error("Already voted on this post")]
    AlreadyVoted,

    #[error("Post not found: {0}")]
    NotFound(String),

    #[error("Remote store error: {0}")]
    Remote(String),
}

impl AppError {
    pub fn validation(field: Field, reason: impl Into<String>) -> Self {
        AppError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Failures the user can retry without changing anything locally.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::Http(_) | AppError::Remote(_) | AppError::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
