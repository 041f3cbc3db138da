/// Public library interface for the mind diary core
///
/// This module exports the diary service and the public types that the CLI,
/// tests and embedding applications use. Everything a caller can invoke on
/// `DiaryService` returns an `AppResult`.

use thiserror::Error;

// Internal modules
mod domain;
mod storage;
mod analytics;
mod provider;
mod security;
mod session;
mod service;
pub mod config;

// Re-export public modules and types
pub use domain::*;
pub use storage::{SqliteStorage, StorageError};
pub use storage::codec::{self, CodecError};
pub use storage::migrations::CURRENT_VERSION as SCHEMA_VERSION;
pub use analytics::{BadgeEngine, MonthlyAnalyzer};
pub use provider::{
    parse_payload, AnalysisProvider, AnalysisRequest, DisabledProvider, GeminiClient, ProviderError,
};
pub use security::PasswordError;
pub use session::{FileSessionStore, MemorySessionStore, SessionState, SessionStore};
pub use service::DiaryService;

/// Errors surfaced by the diary service
///
/// Every kind carries a message for logs; `user_message` gives the text to
/// show an end user.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Storage(#[from] StorageError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(message) => message.clone(),
            AppError::NotFound(_) => "We couldn't find that record.".to_string(),
            AppError::Storage(_) => {
                "Your diary could not be read or saved. Please try again.".to_string()
            }
            AppError::Network(_) => {
                "The analysis service could not be reached. Please try again later.".to_string()
            }
            AppError::Parse(_) => "The analysis result could not be read.".to_string(),
            AppError::Internal(_) => "Something went wrong. Please try again.".to_string(),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation { message } => AppError::Validation(message),
            other => AppError::Validation(other.to_string()),
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Parse(_) | ProviderError::EmptyContent => AppError::Parse(err.to_string()),
            ProviderError::NotConfigured
            | ProviderError::Http(_)
            | ProviderError::Status { .. }
            | ProviderError::Timeout(_) => AppError::Network(err.to_string()),
        }
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::Internal(err.to_string())
    }
}
