//! # Real-Savings Estimator
//!
//! Prices the savings a compensation assignment realizes, combining the
//! tax calculation and monetary correction services:
//!
//! - **Avoided penalty** — the debit's penalty rate on the compensated
//!   amount.
//! - **Avoided interest and fines** — monetary correction of the amount
//!   over the window from the debit's due date to the credit's maturity
//!   (the delay the taxpayer would incur settling in cash instead).
//!   An empty or inverted window contributes nothing.
//! - **Funding gross-up** — paying in cash requires pre-tax revenue; the
//!   compensated amount avoids the profit taxes on that funding revenue,
//!   `amount * t / (1 - t)` where `t` is the effective profit-tax rate
//!   from the tax calculation service.
//!
//! ## Degraded mode
//!
//! When either service fails, the estimator falls back to a conservative
//! fixed-percentage estimate. The fallback is logged at `warn!` and the
//! returned estimate carries [`SavingsBasis::ConservativeFallback`] so
//! downstream consumers can see the accuracy degradation — it is never a
//! silent substitution.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;
use tributa_core::{TaxpayerId, Timestamp};

use crate::correction::IndexKind;
use crate::error::FiscalError;
use crate::traits::{MonetaryCorrector, OperationKind, TaxCalculator};

/// Conservative fallback: 5% of the compensated amount.
const FALLBACK_RATE: f64 = 0.05;

/// How a savings figure was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavingsBasis {
    /// Full computation through both fiscal services.
    Computed,
    /// A fiscal service failed; the figure is the conservative
    /// fixed-percentage fallback. Accuracy is degraded.
    ConservativeFallback,
}

/// A priced savings figure with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavingsEstimate {
    /// Estimated savings in currency units.
    pub amount: f64,
    /// How the figure was produced.
    pub basis: SavingsBasis,
}

/// Inputs needed to price one assignment's savings.
#[derive(Debug, Clone)]
pub struct SavingsInput {
    /// Amount being compensated.
    pub amount: f64,
    /// Taxpayer owning both sides.
    pub taxpayer: TaxpayerId,
    /// Maturity of the credit being applied.
    pub credit_maturity: Timestamp,
    /// Due date of the debit being offset.
    pub debit_due: Timestamp,
    /// Debit's penalty rate, as a fraction of the amount.
    pub penalty_rate: f64,
}

/// Savings estimator over injected fiscal services.
///
/// Explicitly constructed and passed to consumers — never a process-wide
/// singleton.
#[derive(Debug, Clone)]
pub struct RealSavingsEstimator {
    calculator: Arc<dyn TaxCalculator>,
    corrector: Arc<dyn MonetaryCorrector>,
}

impl RealSavingsEstimator {
    /// Create an estimator over the given services.
    pub fn new(calculator: Arc<dyn TaxCalculator>, corrector: Arc<dyn MonetaryCorrector>) -> Self {
        Self {
            calculator,
            corrector,
        }
    }

    /// Price the savings for one assignment.
    ///
    /// Never fails: service errors degrade to the conservative fallback,
    /// logged and flagged in the result.
    pub fn estimate(&self, input: &SavingsInput) -> SavingsEstimate {
        match self.compute(input) {
            Ok(amount) => SavingsEstimate {
                amount,
                basis: SavingsBasis::Computed,
            },
            Err(err) => {
                warn!(
                    amount = input.amount,
                    taxpayer = %input.taxpayer,
                    error = %err,
                    "savings computation degraded to conservative fallback"
                );
                SavingsEstimate {
                    amount: input.amount * FALLBACK_RATE,
                    basis: SavingsBasis::ConservativeFallback,
                }
            }
        }
    }

    fn compute(&self, input: &SavingsInput) -> Result<f64, FiscalError> {
        if !input.amount.is_finite() || input.amount <= 0.0 {
            return Err(FiscalError::invalid(
                "amount",
                format!("must be positive and finite, got {}", input.amount),
            ));
        }
        if !(0.0..=1.0).contains(&input.penalty_rate) {
            return Err(FiscalError::invalid(
                "penalty_rate",
                format!("must be in [0, 1], got {}", input.penalty_rate),
            ));
        }

        let avoided_penalty = input.amount * input.penalty_rate;

        // Interest window exists only when the credit matures after the
        // debit falls due.
        let avoided_interest = if input.credit_maturity > input.debit_due {
            self.corrector
                .correct(
                    input.amount,
                    input.debit_due,
                    input.credit_maturity,
                    IndexKind::Selic,
                )?
                .interest_and_fines
        } else {
            0.0
        };

        let assessment =
            self.calculator
                .calculate(OperationKind::Profit, input.amount, &input.taxpayer)?;
        let effective_rate = assessment.total_tax / input.amount;
        let gross_up = if effective_rate < 1.0 {
            input.amount * effective_rate / (1.0 - effective_rate)
        } else {
            // Degenerate rate table; the gross-up model does not apply.
            0.0
        };

        Ok(avoided_penalty + avoided_interest + gross_up)
    }
}
