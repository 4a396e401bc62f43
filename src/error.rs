//! Unified error handling for the genstore crate
//!
//! Domain modules keep their own error types; this module provides a
//! single [`Error`] enum wrapping them for use across module boundaries,
//! plus a coarse [`ErrorCategory`] for handling strategies.

use std::io;
use thiserror::Error;

// Re-export domain-specific errors for convenience
pub use crate::catalog::CatalogError;
pub use crate::notify::NotifyError;
pub use crate::scheduler::SchedulerError;

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout)
    Network,
    /// Parsing and data extraction errors
    Parsing,
    /// Storage and I/O errors
    Storage,
    /// Configuration and validation errors
    Config,
    /// Scheduler and timing errors
    Scheduler,
    /// Other/unknown errors
    Other,
}

/// Unified error type for the genstore crate
#[derive(Error, Debug)]
pub enum Error {
    /// Scheduler and job-control errors
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Catalog fetch and parse errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Update publication errors
    #[error("Notify error: {0}")]
    Notify(#[from] NotifyError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if this error is recoverable (can be retried)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Scheduler(e) => e.is_recoverable(),
            Self::Catalog(e) => e.is_recoverable(),
            Self::Notify(_) => true,
            Self::Io(_) => true,
            Self::Json(_) => false,
            Self::Config(_) => false,
        }
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Scheduler(SchedulerError::IoError { .. }) => ErrorCategory::Storage,
            Self::Scheduler(SchedulerError::SerializationError { .. }) => ErrorCategory::Parsing,
            Self::Scheduler(_) => ErrorCategory::Scheduler,
            Self::Catalog(CatalogError::Http(_)) => ErrorCategory::Network,
            Self::Catalog(CatalogError::Parse(_)) => ErrorCategory::Parsing,
            Self::Catalog(CatalogError::InvalidPattern(_)) => ErrorCategory::Config,
            Self::Catalog(_) => ErrorCategory::Other,
            Self::Notify(NotifyError::Http(_)) => ErrorCategory::Network,
            Self::Notify(NotifyError::InvalidConfig(_)) => ErrorCategory::Config,
            Self::Notify(_) => ErrorCategory::Other,
            Self::Io(_) => ErrorCategory::Storage,
            Self::Json(_) => ErrorCategory::Parsing,
            Self::Config(_) => ErrorCategory::Config,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
