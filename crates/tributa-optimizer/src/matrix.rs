//! # Objective and Cost Matrix Building
//!
//! Turns a credit/debit universe into solver input:
//!
//! - [`LpProblem`] — the bilateral linear program. One decision variable
//!   per (credit, debit) pair, flattened row-major; ≤-constraints keep
//!   each credit used at most once and each debit compensated at most
//!   once. This is a continuous relaxation of the underlying 0/1
//!   assignment problem; the converter rounds basic values post hoc and
//!   re-clamps assigned values, so rounding can never over-assign.
//! - [`CostMatrix`] — the multilateral assignment input. Savings are
//!   inverted into costs (the Hungarian solver minimizes), incompatible
//!   pairs get a forbidding sentinel cost, and the matrix is padded to
//!   square with zero-cost filler so every row and column has a slot.

use crate::compat::CompatibilityScorer;
use crate::model::{Constraint, OptimizationCredit, OptimizationDebit};

/// Sentinel cost forbidding a pairing in the assignment matrix.
pub const FORBIDDEN_COST: f64 = 1e12;

/// Scaling applied to objective coefficients to keep the tableau
/// well-conditioned for currency-sized values.
pub const OBJECTIVE_SCALING: f64 = 1e-3;

/// The bilateral linear program: maximize `objective . x` subject to
/// `constraint_rows * x <= constraint_values`, `0 <= x <= 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct LpProblem {
    /// Objective coefficients, one per (credit, debit) variable.
    pub objective: Vec<f64>,
    /// Constraint matrix rows (credit rows first, then debit rows).
    pub constraint_rows: Vec<Vec<f64>>,
    /// Right-hand sides (all 1.0: used/compensated at most once).
    pub constraint_values: Vec<f64>,
    /// Compatibility score per variable, for the converter.
    pub pair_compatibility: Vec<f64>,
    /// Number of credits.
    pub n_credits: usize,
    /// Number of debits.
    pub n_debits: usize,
}

impl LpProblem {
    /// Flattened row-major variable index of pair (i, j).
    pub fn variable_index(i: usize, j: usize, n_debits: usize) -> usize {
        i * n_debits + j
    }

    /// Build the LP from the candidate universe.
    ///
    /// Pairs rejected by any constraint get a zero objective coefficient
    /// and zero recorded compatibility; the solver gains nothing from
    /// selecting them and the converter skips them.
    pub fn build(
        credits: &[OptimizationCredit],
        debits: &[OptimizationDebit],
        constraints: &[Constraint],
        scorer: &CompatibilityScorer,
    ) -> Self {
        let n_credits = credits.len();
        let n_debits = debits.len();
        let n_vars = n_credits * n_debits;

        let mut objective = vec![0.0; n_vars];
        let mut pair_compatibility = vec![0.0; n_vars];

        for (i, credit) in credits.iter().enumerate() {
            for (j, debit) in debits.iter().enumerate() {
                if !constraints.iter().all(|c| c.admits(credit, debit)) {
                    continue;
                }
                let compatibility = scorer.score(credit, debit);
                let idx = Self::variable_index(i, j, n_debits);
                pair_compatibility[idx] = compatibility;
                objective[idx] =
                    credit.value.min(debit.value) * compatibility * OBJECTIVE_SCALING;
            }
        }

        // Structural rows: each credit used at most once, each debit
        // compensated at most once.
        let mut constraint_rows = Vec::with_capacity(n_credits + n_debits);
        for i in 0..n_credits {
            let mut row = vec![0.0; n_vars];
            for j in 0..n_debits {
                row[Self::variable_index(i, j, n_debits)] = 1.0;
            }
            constraint_rows.push(row);
        }
        for j in 0..n_debits {
            let mut row = vec![0.0; n_vars];
            for i in 0..n_credits {
                row[Self::variable_index(i, j, n_debits)] = 1.0;
            }
            constraint_rows.push(row);
        }
        let constraint_values = vec![1.0; n_credits + n_debits];

        Self {
            objective,
            constraint_rows,
            constraint_values,
            pair_compatibility,
            n_credits,
            n_debits,
        }
    }

    /// Number of decision variables.
    pub fn n_variables(&self) -> usize {
        self.objective.len()
    }
}

/// Padded square cost matrix for the assignment solver.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    /// Square cost matrix of dimension `size`.
    pub costs: Vec<Vec<f64>>,
    /// Compatibility score per real (credit, debit) cell.
    pub pair_compatibility: Vec<Vec<f64>>,
    /// Real row count (credits).
    pub n_credits: usize,
    /// Real column count (debits).
    pub n_debits: usize,
    /// Padded dimension: `max(n_credits, n_debits)`.
    pub size: usize,
}

impl CostMatrix {
    /// Build the cost matrix: `cost = 1 / (compatibility * pair_value)`
    /// for admissible pairs, the forbidding sentinel otherwise, padded
    /// to square with zero-cost filler.
    pub fn build(
        credits: &[OptimizationCredit],
        debits: &[OptimizationDebit],
        constraints: &[Constraint],
        scorer: &CompatibilityScorer,
    ) -> Self {
        let n_credits = credits.len();
        let n_debits = debits.len();
        let size = n_credits.max(n_debits);

        let mut costs = vec![vec![0.0; size]; size];
        let mut pair_compatibility = vec![vec![0.0; n_debits]; n_credits];

        for (i, credit) in credits.iter().enumerate() {
            for (j, debit) in debits.iter().enumerate() {
                let admitted = constraints.iter().all(|c| c.admits(credit, debit));
                let compatibility = if admitted {
                    scorer.score(credit, debit)
                } else {
                    0.0
                };
                pair_compatibility[i][j] = compatibility;

                let pair_value = credit.value.min(debit.value);
                costs[i][j] = if compatibility > 0.0 && pair_value > 0.0 {
                    1.0 / (compatibility * pair_value)
                } else {
                    FORBIDDEN_COST
                };
            }
        }

        Self {
            costs,
            pair_compatibility,
            n_credits,
            n_debits,
            size,
        }
    }

    /// Whether a real cell carries the forbidding sentinel.
    pub fn is_forbidden(&self, i: usize, j: usize) -> bool {
        self.costs[i][j] >= FORBIDDEN_COST
    }
}
