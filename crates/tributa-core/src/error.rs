//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types shared across the Tributa Stack. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Validation errors name the violating field and the constraint.
//! - Temporal errors include the offending input string.
//! - No error path silently substitutes a default value.

use thiserror::Error;

/// Top-level error type for the foundational crate.
#[derive(Error, Debug)]
pub enum TributaError {
    /// A domain invariant was violated at construction.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Field that failed validation.
        field: String,
        /// Reason the value was rejected.
        reason: String,
    },

    /// Timestamp parsing or normalization failure.
    #[error("temporal error: {0}")]
    Temporal(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TributaError {
    /// Convenience constructor for field-level validation failures.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
