//! # Reference Tax Calculator
//!
//! A deterministic statutory-rate table. Given the same operation kind
//! and base amount it always produces the same assessment — no external
//! state, no discretion. Production deployments replace this with an
//! adapter over the fiscal authority's own calculation engine.

use tributa_core::{TaxKind, TaxpayerId};

use crate::error::FiscalError;
use crate::traits::{OperationKind, TaxAssessment, TaxCalculator, TaxLine};

/// Statutory rates applied by the reference calculator, as fractions.
///
/// Defaults follow the common headline rates: ICMS 18%, IPI 10%,
/// PIS 1.65%, COFINS 7.6%, IRPJ 15%, CSLL 9%, ISS 5%.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    /// Rate per tax kind, indexed by [`TaxKind::all()`] order.
    rates: [(TaxKind, f64); 7],
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            rates: [
                (TaxKind::Icms, 0.18),
                (TaxKind::Ipi, 0.10),
                (TaxKind::Pis, 0.0165),
                (TaxKind::Cofins, 0.076),
                (TaxKind::Irpj, 0.15),
                (TaxKind::Csll, 0.09),
                (TaxKind::Iss, 0.05),
            ],
        }
    }
}

impl RateTable {
    /// Rate for a tax kind.
    pub fn rate(&self, kind: TaxKind) -> f64 {
        // The table is total over TaxKind by construction.
        self.rates
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, r)| *r)
            .unwrap_or(0.0)
    }
}

/// Deterministic table-driven tax calculator.
#[derive(Debug, Clone, Default)]
pub struct TableTaxCalculator {
    table: RateTable,
}

impl TableTaxCalculator {
    /// Create a calculator with the default statutory rates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a calculator with a custom rate table.
    pub fn with_table(table: RateTable) -> Self {
        Self { table }
    }

    /// Taxes incident on an operation kind, exhaustively per kind.
    fn incident_taxes(operation: OperationKind) -> &'static [TaxKind] {
        match operation {
            OperationKind::Sale => &[TaxKind::Icms, TaxKind::Pis, TaxKind::Cofins],
            OperationKind::Service => &[TaxKind::Iss, TaxKind::Pis, TaxKind::Cofins],
            OperationKind::Industrial => {
                &[TaxKind::Icms, TaxKind::Ipi, TaxKind::Pis, TaxKind::Cofins]
            }
            OperationKind::Profit => &[TaxKind::Irpj, TaxKind::Csll],
        }
    }
}

impl TaxCalculator for TableTaxCalculator {
    fn calculate(
        &self,
        operation: OperationKind,
        base_amount: f64,
        _taxpayer: &TaxpayerId,
    ) -> Result<TaxAssessment, FiscalError> {
        if !base_amount.is_finite() || base_amount <= 0.0 {
            return Err(FiscalError::invalid(
                "base_amount",
                format!("must be positive and finite, got {base_amount}"),
            ));
        }

        let breakdown: Vec<TaxLine> = Self::incident_taxes(operation)
            .iter()
            .map(|&kind| {
                let rate = self.table.rate(kind);
                TaxLine {
                    kind,
                    base: base_amount,
                    rate,
                    amount: base_amount * rate,
                }
            })
            .collect();

        let total_tax = breakdown.iter().map(|line| line.amount).sum();

        Ok(TaxAssessment {
            total_tax,
            breakdown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taxpayer() -> TaxpayerId {
        TaxpayerId::new()
    }

    #[test]
    fn sale_assesses_icms_pis_cofins() {
        let calc = TableTaxCalculator::new();
        let assessment = calc
            .calculate(OperationKind::Sale, 1000.0, &taxpayer())
            .unwrap();
        let kinds: Vec<TaxKind> = assessment.breakdown.iter().map(|l| l.kind).collect();
        assert_eq!(kinds, vec![TaxKind::Icms, TaxKind::Pis, TaxKind::Cofins]);
        // 18% + 1.65% + 7.6% of 1000
        assert!((assessment.total_tax - 272.5).abs() < 1e-9);
    }

    #[test]
    fn profit_assesses_irpj_csll() {
        let calc = TableTaxCalculator::new();
        let assessment = calc
            .calculate(OperationKind::Profit, 10_000.0, &taxpayer())
            .unwrap();
        assert_eq!(assessment.breakdown.len(), 2);
        assert!((assessment.total_tax - 2400.0).abs() < 1e-9);
    }

    #[test]
    fn total_equals_sum_of_lines() {
        let calc = TableTaxCalculator::new();
        for op in [
            OperationKind::Sale,
            OperationKind::Service,
            OperationKind::Industrial,
            OperationKind::Profit,
        ] {
            let assessment = calc.calculate(op, 12_345.67, &taxpayer()).unwrap();
            let sum: f64 = assessment.breakdown.iter().map(|l| l.amount).sum();
            assert!(
                (assessment.total_tax - sum).abs() < 1e-9,
                "{op}: total diverges from breakdown"
            );
        }
    }

    #[test]
    fn non_positive_base_rejected() {
        let calc = TableTaxCalculator::new();
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(
                calc.calculate(OperationKind::Sale, bad, &taxpayer()).is_err(),
                "base {bad} should be rejected"
            );
        }
    }

    #[test]
    fn deterministic_for_same_inputs() {
        let calc = TableTaxCalculator::new();
        let tp = taxpayer();
        let a = calc.calculate(OperationKind::Industrial, 500.0, &tp).unwrap();
        let b = calc.calculate(OperationKind::Industrial, 500.0, &tp).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn custom_rate_table_respected() {
        let mut table = RateTable::default();
        table.rates[0] = (TaxKind::Icms, 0.07); // reduced-rate scenario
        let calc = TableTaxCalculator::with_table(table);
        let assessment = calc
            .calculate(OperationKind::Sale, 1000.0, &taxpayer())
            .unwrap();
        let icms = assessment
            .breakdown
            .iter()
            .find(|l| l.kind == TaxKind::Icms)
            .unwrap();
        assert!((icms.amount - 70.0).abs() < 1e-9);
    }
}
