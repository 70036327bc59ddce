//! # Optimizer Errors
//!
//! Typed failures of the compensation optimizer. Validation problems are
//! surfaced immediately and never retried; solver failures (unbounded
//! objective, iteration cap) carry enough context for the caller to
//! decide whether to relax tolerances and retry. The only documented
//! non-error degradation in the stack is the savings-estimate fallback,
//! which lives in `tributa-fiscal` and is flagged in the report rather
//! than raised here.

use thiserror::Error;
use tributa_fiscal::FiscalError;

/// Errors from the compensation optimizer core.
#[derive(Error, Debug)]
pub enum OptimizeError {
    /// Input failed validation; one message per violated rule.
    #[error("validation failed: {}", issues.join("; "))]
    Validation {
        /// Human-readable description of each violated rule.
        issues: Vec<String>,
    },

    /// The linear program admits an unbounded objective.
    #[error("unbounded problem: the objective can increase without limit")]
    Unbounded,

    /// The solver hit its hard iteration cap before converging.
    #[error("iteration cap of {limit} exceeded before convergence")]
    MaxIterations {
        /// The cap that was exceeded.
        limit: usize,
    },

    /// The requested strategy is accepted on the wire but not solvable
    /// by this core.
    #[error("unsupported optimization strategy: {0}")]
    Unsupported(String),

    /// A fiscal boundary service failed in a non-degradable way.
    #[error("fiscal error: {0}")]
    Fiscal(#[from] FiscalError),
}

impl OptimizeError {
    /// Single-issue validation error.
    pub fn validation(issue: impl Into<String>) -> Self {
        Self::Validation {
            issues: vec![issue.into()],
        }
    }
}
