//! # Fiscal Service Errors

use thiserror::Error;
use tributa_core::Timestamp;

/// Errors from the fiscal boundary services.
#[derive(Error, Debug)]
pub enum FiscalError {
    /// An input value failed validation.
    #[error("invalid fiscal input {field}: {reason}")]
    InvalidInput {
        /// Field that failed validation.
        field: String,
        /// Reason the value was rejected.
        reason: String,
    },

    /// Correction window is inverted (end precedes start).
    #[error("correction window ends at {end} before it starts at {start}")]
    InvertedWindow {
        /// Window start.
        start: Timestamp,
        /// Window end.
        end: Timestamp,
    },

    /// No rate is available for the requested index.
    #[error("no rate schedule for index {index}")]
    RateUnavailable {
        /// Index name as requested.
        index: String,
    },

    /// The backing service failed.
    #[error("fiscal service failure: {0}")]
    Service(String),
}

impl FiscalError {
    /// Convenience constructor for field-level validation failures.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
