//! # AppError
//!
//! Centralized error handling for the Campus-Board ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;
use uuid::Uuid;

/// The primary error type for all cb-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Topic, Post, Comment, parent comment)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Validation failure (e.g., content too long, too many images)
    #[error("validation error: {0}")]
    Validation(String),

    /// A non-author attempted to mutate someone else's resource
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Unique-constraint violation (duplicate join record or topic name)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (entity store or image store unreachable)
    #[error("dependency failure: {0}")]
    Dependency(String),
}

impl AppError {
    pub fn not_found(entity: &str, id: Uuid) -> Self {
        AppError::NotFound(entity.to_string(), id.to_string())
    }

    /// True when the error came from a unique-constraint violation.
    /// The toggle engine uses this to treat a lost create race as
    /// "already toggled on" instead of a fatal error.
    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::Conflict(_))
    }
}

/// A specialized Result type for Campus-Board logic.
pub type Result<T> = std::result::Result<T, AppError>;
