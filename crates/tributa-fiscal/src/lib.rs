//! # tributa-fiscal — Fiscal Boundary Services
//!
//! Traits and reference implementations for the two external services the
//! compensation optimizer consumes: tax calculation and monetary
//! correction. Full fiscal-authority integrations live outside this
//! workspace; the traits here are the seam they plug into.
//!
//! ## Layout
//!
//! - [`traits`] — `TaxCalculator` and `MonetaryCorrector` service traits
//!   plus their input/output types.
//! - [`calculator`] — `TableTaxCalculator`, a deterministic statutory-rate
//!   reference implementation.
//! - [`correction`] — `SelicCorrector`, compound monthly indexation with
//!   late-payment fines.
//! - [`savings`] — `RealSavingsEstimator`, which prices the savings of a
//!   compensation assignment from both services and degrades to a
//!   conservative fixed-percentage estimate when a service fails. The
//!   degraded path is logged and flagged in the result — never silent.
//!
//! ## Crate Policy
//!
//! - Reference implementations are pure: same inputs, same outputs.
//! - No `unwrap()`/`expect()` outside tests.

pub mod calculator;
pub mod correction;
pub mod error;
pub mod savings;
pub mod traits;

pub use calculator::TableTaxCalculator;
pub use correction::{IndexKind, SelicCorrector};
pub use error::FiscalError;
pub use savings::{RealSavingsEstimator, SavingsBasis, SavingsEstimate, SavingsInput};
pub use traits::{
    CorrectionResult, MonetaryCorrector, OperationKind, TaxAssessment, TaxCalculator, TaxLine,
};
