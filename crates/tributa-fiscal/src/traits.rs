//! # Service Traits — Tax Calculation and Monetary Correction
//!
//! The two seams the optimizer's savings estimator plugs into. Production
//! deployments implement these against the fiscal authority's systems;
//! this workspace ships deterministic reference implementations
//! ([`TableTaxCalculator`](crate::calculator::TableTaxCalculator),
//! [`SelicCorrector`](crate::correction::SelicCorrector)) used in tests
//! and as the default wiring.

use serde::{Deserialize, Serialize};

use tributa_core::{TaxKind, TaxpayerId, Timestamp};

use crate::correction::IndexKind;
use crate::error::FiscalError;

/// Kind of taxable operation, determining which taxes apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Sale of goods (ICMS, PIS, COFINS).
    Sale,
    /// Provision of services (ISS, PIS, COFINS).
    Service,
    /// Sale of industrialized products (ICMS, IPI, PIS, COFINS).
    Industrial,
    /// Corporate profit event (IRPJ, CSLL).
    Profit,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sale => write!(f, "sale"),
            Self::Service => write!(f, "service"),
            Self::Industrial => write!(f, "industrial"),
            Self::Profit => write!(f, "profit"),
        }
    }
}

/// One line of a tax assessment: a single tax applied to a base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxLine {
    /// Which tax this line assesses.
    pub kind: TaxKind,
    /// Base amount the rate was applied to.
    pub base: f64,
    /// Statutory rate applied, as a fraction (0.18 = 18%).
    pub rate: f64,
    /// Assessed amount: `base * rate`.
    pub amount: f64,
}

/// Result of a tax calculation: total plus per-tax breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxAssessment {
    /// Sum of all line amounts.
    pub total_tax: f64,
    /// Per-tax breakdown, in canonical [`TaxKind`] order.
    pub breakdown: Vec<TaxLine>,
}

/// Tax calculation service seam.
pub trait TaxCalculator: Send + Sync + std::fmt::Debug {
    /// Assess the taxes due on `base_amount` for an operation of the
    /// given kind by the given taxpayer.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when `base_amount` is not a positive finite number;
    /// `Service` when the backing system fails.
    fn calculate(
        &self,
        operation: OperationKind,
        base_amount: f64,
        taxpayer: &TaxpayerId,
    ) -> Result<TaxAssessment, FiscalError>;
}

/// Result of a monetary correction over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionResult {
    /// Principal restated to the window's end.
    pub corrected_value: f64,
    /// Interest plus late-payment fines accrued over the window.
    pub interest_and_fines: f64,
}

/// Monetary correction service seam.
pub trait MonetaryCorrector: Send + Sync + std::fmt::Debug {
    /// Restate `principal` from `start` to `end` under the given index.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when `principal` is not a positive finite number;
    /// `InvertedWindow` when `end < start`; `RateUnavailable` when the
    /// corrector carries no schedule for `index`.
    fn correct(
        &self,
        principal: f64,
        start: Timestamp,
        end: Timestamp,
        index: IndexKind,
    ) -> Result<CorrectionResult, FiscalError>;
}
