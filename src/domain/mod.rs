/// Domain module containing core diary types and their validation rules
///
/// This module defines the core entities (DiaryEntry, AiAnalysis, MonthlySummary,
/// Badge) and the value types they are built from. These types represent the
/// fundamental concepts of the journaling core and carry no storage logic.

pub mod types;
pub mod entry;
pub mod analysis;
pub mod monthly;
pub mod badge;
pub mod streak;
pub mod mind_card;
pub mod profile;

// Re-export public types for easy access
pub use types::*;
pub use entry::*;
pub use analysis::*;
pub use monthly::*;
pub use badge::*;
pub use streak::*;
pub use mind_card::*;
pub use profile::*;

use thiserror::Error;

/// Errors that can occur while building or parsing domain values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid owner identifier: {0}")]
    InvalidOwner(String),

    #[error("Invalid mood: {0}")]
    InvalidMood(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid year-month: {0}")]
    InvalidYearMonth(String),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }
}
