//! # AppError
//!
//! Centralized error handling for the Magazine Journal.
//! Maps domain-specific failures to actionable error types.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// One rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// The primary error type for all mj-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Issue, User)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Single validation failure (e.g., unknown content type)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Form validation with one entry per rejected field
    #[error("validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    /// Missing or bad credentials or tokens
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Resource already exists (e.g., duplicate e-mail)
    #[error("conflict: {0}")]
    Conflict(String),

    /// A third-party service (AI, music) failed or answered garbage
    #[error("upstream service error: {0}")]
    Upstream(String),

    /// Document generation failed
    #[error("export failed: {0}")]
    Export(String),

    /// Infrastructure failure (e.g., DB down)
    #[error("internal service error: {0}")]
    Internal(String),
}

fn join_fields(errors: &[FieldError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

impl From<anyhow::Error> for AppError {
    /// Plugins may tunnel a domain error through `anyhow`; anything else is internal.
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<AppError>() {
            Ok(app) => app,
            Err(err) => AppError::Internal(format!("{err:#}")),
        }
    }
}

/// A specialized Result type for Magazine Journal logic.
pub type Result<T> = std::result::Result<T, AppError>;
