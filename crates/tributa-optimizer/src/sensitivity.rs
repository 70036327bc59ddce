//! # Sensitivity Analysis
//!
//! Measures how stable the bilateral optimum is under drift in the pair
//! valuations. Two perturbed copies of the LP are re-solved: one with
//! every objective coefficient shifted down 10%, one shifted up 10%,
//! with the sign alternating per variable so the drift is adversarial
//! rather than a uniform rescale (a uniform rescale would move the
//! objective without ever changing the optimal basis).
//!
//! Stability is `1 - relative_spread`, clamped to [0, 1]: 1.0 means the
//! optimum barely moves under drift, 0.0 means the spread is as large
//! as the base objective itself.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::OptimizeError;
use crate::matrix::LpProblem;
use crate::simplex::SimplexSolver;

/// Relative perturbation applied to objective coefficients.
pub const PERTURBATION: f64 = 0.10;

/// Stability of an optimum under pair-valuation drift.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityReport {
    /// Objective of the unperturbed problem.
    pub base_objective: f64,
    /// Objective under the downward-leaning perturbation.
    pub objective_low: f64,
    /// Objective under the upward-leaning perturbation.
    pub objective_high: f64,
    /// `1 - spread / base`, clamped to [0, 1].
    pub stability: f64,
}

impl SensitivityReport {
    /// Report for a degenerate (empty or zero-valued) problem.
    pub fn trivial() -> Self {
        Self {
            base_objective: 0.0,
            objective_low: 0.0,
            objective_high: 0.0,
            stability: 1.0,
        }
    }
}

/// Sensitivity analyzer over the bilateral solver.
#[derive(Debug, Clone, Default)]
pub struct SensitivityAnalyzer {
    solver: SimplexSolver,
}

impl SensitivityAnalyzer {
    pub fn new() -> Self {
        Self {
            solver: SimplexSolver::new(),
        }
    }

    /// Analyze the problem around a known base objective.
    ///
    /// Both perturbed problems share the base problem's constraint
    /// structure, so feasibility is unaffected; only the valuations
    /// drift.
    pub fn analyze(
        &self,
        problem: &LpProblem,
        base_objective: f64,
    ) -> Result<SensitivityReport, OptimizeError> {
        if base_objective <= 0.0 || problem.n_variables() == 0 {
            return Ok(SensitivityReport::trivial());
        }

        let low = self.solve_perturbed(problem, -PERTURBATION)?;
        let high = self.solve_perturbed(problem, PERTURBATION)?;

        let spread = (high - low).abs();
        let stability = (1.0 - spread / base_objective).clamp(0.0, 1.0);
        debug!(base_objective, low, high, stability, "sensitivity analyzed");

        Ok(SensitivityReport {
            base_objective,
            objective_low: low,
            objective_high: high,
            stability,
        })
    }

    /// Re-solve with the leaning perturbation: every coefficient moves
    /// by `lean`, with the sign flipped on odd variables to break any
    /// uniform rescale.
    fn solve_perturbed(&self, problem: &LpProblem, lean: f64) -> Result<f64, OptimizeError> {
        let mut perturbed = problem.clone();
        for (idx, coeff) in perturbed.objective.iter_mut().enumerate() {
            let direction = if idx % 2 == 0 { 1.0 } else { -1.0 };
            *coeff *= 1.0 + lean * direction;
        }
        Ok(self.solver.maximize(&perturbed)?.objective)
    }
}
