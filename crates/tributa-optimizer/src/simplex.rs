//! # Dense-Tableau Simplex
//!
//! Maximizing Simplex over a dense tableau with slack variables, used
//! for the bilateral compensation program. The problems this solves are
//! small (structural rows only, one per credit and one per debit), so a
//! dense tableau with Gauss-Jordan pivoting is the right tool; no
//! sparse machinery, no Bland's rule beyond the deterministic
//! most-negative-column pick.
//!
//! ## Invariants
//!
//! - Pivot selection is deterministic: the entering column is the most
//!   negative reduced cost (ties broken by lowest index), the leaving
//!   row is the minimum positive ratio (ties broken by lowest index).
//!   Identical input always yields an identical solution.
//! - Iterations are hard-capped; the solver returns a typed error
//!   rather than spinning on a degenerate cycle.
//! - An entering column with no positive entry means the objective is
//!   unbounded, reported as a typed error, never as a huge number.

use crate::error::OptimizeError;
use crate::matrix::LpProblem;

/// Hard cap on pivot iterations.
pub const MAX_PIVOTS: usize = 1000;

/// Default reduced-cost tolerance: columns above the negated tolerance
/// count as optimal.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Phase of a Simplex run over the tableau.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverState {
    /// Tableau built, slack basis installed, no pivots yet.
    Initializing,
    /// Pivoting.
    Iterating,
    /// No negative reduced cost remains.
    Optimal,
    /// An entering column had no positive entry.
    Unbounded,
    /// The pivot cap was hit before convergence.
    MaxIterationsExceeded,
}

/// Result of a successful Simplex run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplexSolution {
    /// Optimal objective value.
    pub objective: f64,
    /// Value of each original decision variable at the optimum.
    pub values: Vec<f64>,
    /// Pivot iterations performed.
    pub iterations: usize,
    /// Terminal state; always [`SolverState::Optimal`] on success.
    pub state: SolverState,
}

/// Maximizing Simplex solver over `A x <= b`, `x >= 0`.
#[derive(Debug, Clone)]
pub struct SimplexSolver {
    /// Iteration cap; defaults to [`MAX_PIVOTS`].
    pub max_iterations: usize,
    /// Numeric tolerance for the optimality and ratio tests; defaults
    /// to [`DEFAULT_TOLERANCE`].
    pub tolerance: f64,
}

impl Default for SimplexSolver {
    fn default() -> Self {
        Self {
            max_iterations: MAX_PIVOTS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl SimplexSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cap(max_iterations: usize) -> Self {
        Self {
            max_iterations,
            ..Self::default()
        }
    }

    /// Solver with both knobs set; a non-positive or non-finite
    /// tolerance falls back to the default.
    pub fn with_limits(max_iterations: usize, tolerance: f64) -> Self {
        let tolerance = if tolerance.is_finite() && tolerance > 0.0 {
            tolerance
        } else {
            DEFAULT_TOLERANCE
        };
        Self {
            max_iterations,
            tolerance,
        }
    }

    /// Maximize the problem's objective.
    ///
    /// All right-hand sides must be non-negative (the structural rows
    /// built by [`LpProblem::build`] always are), so the initial slack
    /// basis is feasible and no phase-one is needed.
    pub fn maximize(&self, problem: &LpProblem) -> Result<SimplexSolution, OptimizeError> {
        let n_vars = problem.n_variables();
        let n_rows = problem.constraint_rows.len();
        if n_vars == 0 || n_rows == 0 {
            return Ok(SimplexSolution {
                objective: 0.0,
                values: vec![0.0; n_vars],
                iterations: 0,
                state: SolverState::Optimal,
            });
        }
        let mut state = SolverState::Initializing;

        // Tableau layout: one row per constraint plus the objective row
        // at the bottom. Columns: original variables, slack variables,
        // right-hand side.
        let width = n_vars + n_rows + 1;
        let mut tableau = vec![vec![0.0; width]; n_rows + 1];
        for (r, row) in problem.constraint_rows.iter().enumerate() {
            tableau[r][..n_vars].copy_from_slice(row);
            tableau[r][n_vars + r] = 1.0; // slack
            tableau[r][width - 1] = problem.constraint_values[r];
        }
        // Maximization: objective coefficients enter negated.
        for (c, &coeff) in problem.objective.iter().enumerate() {
            tableau[n_rows][c] = -coeff;
        }

        // Which variable is basic in each row; starts as the slacks.
        let mut basis: Vec<usize> = (n_vars..n_vars + n_rows).collect();

        let mut iterations = 0;
        while matches!(state, SolverState::Initializing | SolverState::Iterating) {
            // Entering column: most negative reduced cost.
            let mut pivot_col = None;
            let mut most_negative = -self.tolerance;
            for c in 0..width - 1 {
                if tableau[n_rows][c] < most_negative {
                    most_negative = tableau[n_rows][c];
                    pivot_col = Some(c);
                }
            }
            let Some(pivot_col) = pivot_col else {
                state = SolverState::Optimal;
                continue;
            };

            // Leaving row: minimum positive ratio rhs / entry.
            let mut pivot_row = None;
            let mut best_ratio = f64::INFINITY;
            for r in 0..n_rows {
                let entry = tableau[r][pivot_col];
                if entry > self.tolerance {
                    let ratio = tableau[r][width - 1] / entry;
                    if ratio < best_ratio {
                        best_ratio = ratio;
                        pivot_row = Some(r);
                    }
                }
            }
            let Some(pivot_row) = pivot_row else {
                state = SolverState::Unbounded;
                continue;
            };

            iterations += 1;
            if iterations > self.max_iterations {
                state = SolverState::MaxIterationsExceeded;
                continue;
            }

            self.pivot(&mut tableau, pivot_row, pivot_col);
            basis[pivot_row] = pivot_col;
            state = SolverState::Iterating;
        }

        match state {
            SolverState::Unbounded => return Err(OptimizeError::Unbounded),
            SolverState::MaxIterationsExceeded => {
                return Err(OptimizeError::MaxIterations {
                    limit: self.max_iterations,
                });
            }
            _ => {}
        }

        // Read the solution off the basis.
        let mut values = vec![0.0; n_vars];
        for (r, &var) in basis.iter().enumerate() {
            if var < n_vars {
                values[var] = tableau[r][width - 1];
            }
        }
        let objective = tableau[n_rows][width - 1];

        Ok(SimplexSolution {
            objective,
            values,
            iterations,
            state,
        })
    }

    /// Gauss-Jordan pivot: normalize the pivot row, eliminate the pivot
    /// column from every other row.
    fn pivot(&self, tableau: &mut [Vec<f64>], pivot_row: usize, pivot_col: usize) {
        let width = tableau[0].len();
        let pivot = tableau[pivot_row][pivot_col];
        for c in 0..width {
            tableau[pivot_row][c] /= pivot;
        }
        for r in 0..tableau.len() {
            if r == pivot_row {
                continue;
            }
            let factor = tableau[r][pivot_col];
            if factor.abs() <= f64::EPSILON {
                continue;
            }
            for c in 0..width {
                tableau[r][c] -= factor * tableau[pivot_row][c];
            }
        }
    }
}
