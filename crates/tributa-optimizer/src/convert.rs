//! # Solution Conversion
//!
//! Projects raw solver output back onto the credit/debit universe,
//! prices each selected pair through the savings estimator, and
//! aggregates the result into an [`OptimalSolution`].
//!
//! The bilateral path is a continuous relaxation, so basic variables
//! can take fractional values; selection rounds at 0.5 and the assigned
//! value is re-clamped to `min(available, outstanding)`, which keeps
//! the conservation invariant regardless of rounding.

use tracing::debug;
use tributa_fiscal::{RealSavingsEstimator, SavingsBasis, SavingsInput};

use crate::error::OptimizeError;
use crate::hungarian::AssignmentSolution;
use crate::matrix::{CostMatrix, LpProblem};
use crate::model::{
    CompensationAssignment, OptimalSolution, OptimizationCredit, OptimizationDebit,
};
use crate::simplex::SimplexSolution;

/// LP variable values above this round to a selected pair.
const SELECTION_THRESHOLD: f64 = 0.5;

/// Converts solver output into priced, aggregated solutions.
#[derive(Debug, Clone)]
pub struct SolutionConverter {
    savings: RealSavingsEstimator,
}

impl SolutionConverter {
    pub fn new(savings: RealSavingsEstimator) -> Self {
        Self { savings }
    }

    /// Convert a Simplex solution over the given LP.
    ///
    /// A pair is selected when its variable rounds to 1 and its
    /// objective coefficient is positive (zero-coefficient variables
    /// are constraint-rejected pairs the solver had no reason to avoid).
    pub fn from_lp(
        &self,
        problem: &LpProblem,
        solution: &SimplexSolution,
        credits: &[OptimizationCredit],
        debits: &[OptimizationDebit],
    ) -> Result<OptimalSolution, OptimizeError> {
        let mut assignments = Vec::new();
        for (i, credit) in credits.iter().enumerate() {
            for (j, debit) in debits.iter().enumerate() {
                let idx = LpProblem::variable_index(i, j, problem.n_debits);
                if solution.values[idx] <= SELECTION_THRESHOLD
                    || problem.objective[idx] <= 0.0
                {
                    continue;
                }
                // A fully-consumed side carries nothing to assign.
                if credit.available_value.min(debit.outstanding_value) <= 0.0 {
                    continue;
                }
                let assignment =
                    self.price(credit, debit, problem.pair_compatibility[idx])?;
                assignments.push(assignment);
            }
        }
        debug!(
            selected = assignments.len(),
            objective = solution.objective,
            "converted bilateral solution"
        );
        Ok(aggregate(assignments))
    }

    /// Convert a Hungarian matching over the given cost matrix.
    pub fn from_assignment(
        &self,
        matrix: &CostMatrix,
        solution: &AssignmentSolution,
        credits: &[OptimizationCredit],
        debits: &[OptimizationDebit],
    ) -> Result<OptimalSolution, OptimizeError> {
        let mut assignments = Vec::new();
        for (i, matched) in solution.assigned.iter().enumerate() {
            let Some(j) = matched else {
                continue;
            };
            let compatibility = matrix.pair_compatibility[i][*j];
            if compatibility <= 0.0 {
                continue;
            }
            if credits[i]
                .available_value
                .min(debits[*j].outstanding_value)
                <= 0.0
            {
                continue;
            }
            assignments.push(self.price(&credits[i], &debits[*j], compatibility)?);
        }
        debug!(
            selected = assignments.len(),
            total_cost = solution.total_cost,
            "converted multilateral solution"
        );
        Ok(aggregate(assignments))
    }

    /// Price one selected pair into a checked assignment.
    fn price(
        &self,
        credit: &OptimizationCredit,
        debit: &OptimizationDebit,
        compatibility: f64,
    ) -> Result<CompensationAssignment, OptimizeError> {
        let assigned_value = credit.available_value.min(debit.outstanding_value);
        let estimate = self.savings.estimate(&SavingsInput {
            amount: assigned_value,
            taxpayer: credit.taxpayer,
            credit_maturity: credit.maturity,
            debit_due: debit.due_date,
            penalty_rate: debit.penalty_rate,
        });
        let estimated_risk = 0.5 * (credit.risk + (1.0 - credit.approval_rate));
        let processing_days = 5.0 + 25.0 * (1.0 - credit.liquidity);
        CompensationAssignment::new(
            credit,
            debit,
            assigned_value,
            compatibility,
            estimate.amount,
            estimate.basis,
            estimated_risk,
            processing_days,
        )
    }
}

/// Aggregate an assignment set into a solution.
///
/// Confidence is the mean of per-assignment `compatibility *
/// approval-adjusted risk complement`; risk is value-weighted; duration
/// is the critical path (slowest assignment); score weighs efficiency
/// by confidence.
pub fn aggregate(assignments: Vec<CompensationAssignment>) -> OptimalSolution {
    let total_value: f64 = assignments.iter().map(|a| a.assigned_value).sum();
    let total_savings: f64 = assignments.iter().map(|a| a.estimated_savings).sum();

    let risk_level = if total_value > 0.0 {
        assignments
            .iter()
            .map(|a| a.estimated_risk * a.assigned_value)
            .sum::<f64>()
            / total_value
    } else {
        0.0
    };

    let confidence = if assignments.is_empty() {
        0.0
    } else {
        assignments
            .iter()
            .map(|a| a.compatibility * (1.0 - a.estimated_risk))
            .sum::<f64>()
            / assignments.len() as f64
    };

    let expected_duration_days = assignments
        .iter()
        .map(|a| a.processing_days)
        .fold(0.0, f64::max);

    let efficiency = if total_value > 0.0 {
        total_savings / total_value
    } else {
        0.0
    };
    let score = efficiency * confidence;

    OptimalSolution {
        assignments,
        score,
        total_value,
        total_savings,
        risk_level,
        expected_duration_days,
        confidence,
    }
}

/// Whether any assignment in the solution was priced in degraded mode.
pub fn has_degraded_savings(solution: &OptimalSolution) -> bool {
    solution
        .assignments
        .iter()
        .any(|a| a.savings_basis == SavingsBasis::ConservativeFallback)
}

/// Greedy baseline: pairs ordered by descending compatibility, each
/// credit and debit used at most once. Always feasible, usually worse
/// than the solvers; reported as an alternative for comparison.
pub fn greedy_baseline(
    converter: &SolutionConverter,
    credits: &[OptimizationCredit],
    debits: &[OptimizationDebit],
    pair_compatibility: impl Fn(usize, usize) -> f64,
) -> Result<OptimalSolution, OptimizeError> {
    let mut candidates: Vec<(usize, usize, f64)> = Vec::new();
    for i in 0..credits.len() {
        for j in 0..debits.len() {
            let c = pair_compatibility(i, j);
            if c > 0.0 {
                candidates.push((i, j, c));
            }
        }
    }
    candidates.sort_by(|a, b| {
        b.2.partial_cmp(&a.2)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
            .then(a.1.cmp(&b.1))
    });

    let mut used_credit = vec![false; credits.len()];
    let mut used_debit = vec![false; debits.len()];
    let mut assignments = Vec::new();
    for (i, j, compatibility) in candidates {
        if used_credit[i] || used_debit[j] {
            continue;
        }
        let pair_value = credits[i]
            .available_value
            .min(debits[j].outstanding_value);
        if pair_value <= 0.0 {
            continue;
        }
        used_credit[i] = true;
        used_debit[j] = true;
        assignments.push(converter.price(&credits[i], &debits[j], compatibility)?);
    }
    Ok(aggregate(assignments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use tributa_fiscal::{SelicCorrector, TableTaxCalculator};

    use crate::compat::CompatibilityScorer;
    use crate::simplex::SimplexSolver;
    use crate::testutil::{credit, debit};

    fn converter() -> SolutionConverter {
        SolutionConverter::new(RealSavingsEstimator::new(
            Arc::new(TableTaxCalculator::new()),
            Arc::new(SelicCorrector::new()),
        ))
    }

    #[test]
    fn lp_roundtrip_selects_compatible_pair() {
        let credits = vec![credit("icms", 100_000.0, 100_000.0)];
        let debits = vec![debit("icms", 90_000.0, 90_000.0)];
        let scorer = CompatibilityScorer::with_defaults();
        let lp = LpProblem::build(&credits, &debits, &[], &scorer);
        let sx = SimplexSolver::new().maximize(&lp).unwrap();
        let solution = converter().from_lp(&lp, &sx, &credits, &debits).unwrap();

        assert_eq!(solution.assignments.len(), 1);
        assert!((solution.total_value - 90_000.0).abs() < 1e-9);
        assert!(solution.total_savings > 0.0);
        assert!(solution.score > 0.0);
    }

    #[test]
    fn assigned_value_clamped_to_available_and_outstanding() {
        let credits = vec![credit("icms", 100_000.0, 40_000.0)];
        let debits = vec![debit("icms", 90_000.0, 60_000.0)];
        let scorer = CompatibilityScorer::with_defaults();
        let lp = LpProblem::build(&credits, &debits, &[], &scorer);
        let sx = SimplexSolver::new().maximize(&lp).unwrap();
        let solution = converter().from_lp(&lp, &sx, &credits, &debits).unwrap();
        assert!((solution.assignments[0].assigned_value - 40_000.0).abs() < 1e-9);
    }

    #[test]
    fn zero_coefficient_pairs_never_selected() {
        // Same kind but the scorer is irrelevant here: force rejection
        // via a risk constraint so the coefficient is zero.
        let mut c = credit("icms", 100.0, 100.0);
        c.risk = 0.9;
        let credits = vec![c];
        let debits = vec![debit("icms", 100.0, 100.0)];
        let cap = crate::model::Constraint {
            kind: crate::model::ConstraintKind::Risk,
            op: crate::model::ConstraintOp::Le,
            priority: 1,
            value: serde_json::json!(0.5),
        };
        let scorer = CompatibilityScorer::with_defaults();
        let lp = LpProblem::build(&credits, &debits, &[cap], &scorer);
        let sx = SimplexSolver::new().maximize(&lp).unwrap();
        let solution = converter().from_lp(&lp, &sx, &credits, &debits).unwrap();
        assert!(solution.assignments.is_empty());
        assert_eq!(solution.total_value, 0.0);
    }

    #[test]
    fn assignment_conversion_skips_padding() {
        let credits = vec![credit("icms", 100.0, 100.0)];
        let debits = vec![debit("icms", 80.0, 80.0), debit("icms", 50.0, 50.0)];
        let scorer = CompatibilityScorer::with_defaults();
        let matrix = CostMatrix::build(&credits, &debits, &[], &scorer);
        let matching = crate::hungarian::HungarianSolver::new().solve(&matrix);
        let solution = converter()
            .from_assignment(&matrix, &matching, &credits, &debits)
            .unwrap();
        assert_eq!(solution.assignments.len(), 1);
    }

    #[test]
    fn aggregate_empty_is_zero_safe() {
        let solution = aggregate(Vec::new());
        assert_eq!(solution.total_value, 0.0);
        assert_eq!(solution.score, 0.0);
        assert_eq!(solution.confidence, 0.0);
        let metrics = crate::model::SolutionMetrics::from_solution(&solution);
        assert_eq!(metrics.efficiency, 0.0);
    }

    #[test]
    fn duration_is_critical_path() {
        let mut fast = credit("icms", 100.0, 100.0);
        fast.liquidity = 1.0; // 5 days
        let mut slow = credit("icms", 100.0, 100.0);
        slow.liquidity = 0.0; // 30 days
        let credits = vec![fast, slow];
        let debits = vec![debit("icms", 100.0, 100.0), debit("icms", 100.0, 100.0)];
        let scorer = CompatibilityScorer::with_defaults();
        let matrix = CostMatrix::build(&credits, &debits, &[], &scorer);
        let matching = crate::hungarian::HungarianSolver::new().solve(&matrix);
        let solution = converter()
            .from_assignment(&matrix, &matching, &credits, &debits)
            .unwrap();
        assert_eq!(solution.assignments.len(), 2);
        assert!((solution.expected_duration_days - 30.0).abs() < 1e-9);
    }

    #[test]
    fn greedy_uses_each_side_once() {
        let credits = vec![credit("icms", 100.0, 100.0), credit("icms", 100.0, 100.0)];
        let debits = vec![debit("icms", 100.0, 100.0)];
        let solution = greedy_baseline(&converter(), &credits, &debits, |_, _| 1.0).unwrap();
        assert_eq!(solution.assignments.len(), 1);
    }

    proptest! {
        /// Conservation: no assignment ever exceeds what either side can
        /// carry, for any positive availability/outstanding combination.
        #[test]
        fn conservation_holds_for_any_positive_pair(
            available in 1.0f64..100_000.0,
            outstanding in 1.0f64..100_000.0,
        ) {
            let credits = vec![credit("icms", 100_000.0, available)];
            let debits = vec![debit("icms", 100_000.0, outstanding)];
            let scorer = CompatibilityScorer::with_defaults();
            let lp = LpProblem::build(&credits, &debits, &[], &scorer);
            let sx = SimplexSolver::new().maximize(&lp).unwrap();
            let solution = converter().from_lp(&lp, &sx, &credits, &debits).unwrap();
            for a in &solution.assignments {
                prop_assert!(a.assigned_value <= available.min(outstanding) + 1e-9);
                prop_assert!(a.assigned_value > 0.0);
            }
        }
    }

    #[test]
    fn greedy_prefers_higher_compatibility() {
        let credits = vec![credit("icms", 100.0, 100.0)];
        let debits = vec![debit("icms", 100.0, 100.0), debit("icms", 100.0, 100.0)];
        let solution =
            greedy_baseline(&converter(), &credits, &debits, |_, j| {
                if j == 1 {
                    0.9
                } else {
                    0.4
                }
            })
            .unwrap();
        assert_eq!(solution.assignments.len(), 1);
        assert_eq!(solution.assignments[0].debit, debits[1].id);
    }
}
