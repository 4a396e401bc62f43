//! Error types for the scheduler module

use std::fmt;

/// Result type for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Scheduler-specific errors
#[derive(Debug)]
pub enum SchedulerError {
    /// Start called on a job whose timer is already armed
    JobAlreadyRunning,

    /// Pause refused because the job callback is executing
    JobIsRunning,

    /// Stop/pause called on a job with no armed timer
    JobNotArmed,

    /// Jobs were restored before a price snapshot existed
    PricesNotLoaded,

    /// Reroll time string did not parse as HH:MM
    InvalidRerollTime {
        value: String,
    },

    /// Scheduler configuration value rejected
    ConfigError {
        field: String,
        reason: String,
    },

    /// Serialization/deserialization error
    SerializationError {
        reason: String,
    },

    /// IO error
    IoError {
        operation: String,
        reason: String,
    },
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JobAlreadyRunning => write!(f, "Job is already running"),
            Self::JobIsRunning => write!(f, "Job is running"),
            Self::JobNotArmed => write!(f, "Job is not running"),
            Self::PricesNotLoaded => write!(f, "Prices must be loaded before jobs"),
            Self::InvalidRerollTime { value } => {
                write!(f, "Invalid reroll time '{}'. Expected HH:MM", value)
            }
            Self::ConfigError { field, reason } => {
                write!(f, "Scheduler config error in '{}': {}", field, reason)
            }
            Self::SerializationError { reason } => {
                write!(f, "Serialization error: {}", reason)
            }
            Self::IoError { operation, reason } => {
                write!(f, "IO error during '{}': {}", operation, reason)
            }
        }
    }
}

impl std::error::Error for SchedulerError {}

impl From<serde_json::Error> for SchedulerError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for SchedulerError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            operation: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl SchedulerError {
    /// Create an invalid reroll time error
    pub fn invalid_reroll_time(value: impl Into<String>) -> Self {
        Self::InvalidRerollTime {
            value: value.into(),
        }
    }

    /// Create a scheduler config error
    pub fn config_error(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigError {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an IO error with context
    pub fn io_error(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::IoError {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::IoError { .. } | Self::SerializationError { .. }
        )
    }
}
