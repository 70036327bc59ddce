//! # Hungarian Assignment Solver
//!
//! O(n³) minimum-cost assignment over the padded square matrix built by
//! [`CostMatrix::build`](crate::matrix::CostMatrix::build). The
//! implementation maintains dual potentials for rows and columns and
//! grows an augmenting chain of tight edges per row, which is the
//! shortest-path formulation of the classical algorithm.
//!
//! ## Invariants
//!
//! - The matching over the padded matrix is perfect; the reported
//!   assignment drops padding rows/columns and forbidden cells, so it
//!   may be partial over the real universe.
//! - `total_cost` sums only real, admissible cells.
//! - Everything is deterministic: no randomness, no iteration-order
//!   dependence beyond the fixed scan order.

use crate::matrix::{CostMatrix, FORBIDDEN_COST};

/// Result of an assignment run over the real (unpadded) universe.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentSolution {
    /// For each credit, the matched debit column, or `None` when the
    /// credit was matched to padding or a forbidden cell.
    pub assigned: Vec<Option<usize>>,
    /// Sum of the costs of real matched cells.
    pub total_cost: f64,
}

impl AssignmentSolution {
    /// Number of real matches.
    pub fn n_matched(&self) -> usize {
        self.assigned.iter().filter(|a| a.is_some()).count()
    }
}

/// Minimum-cost assignment solver.
#[derive(Debug, Clone, Default)]
pub struct HungarianSolver;

impl HungarianSolver {
    pub fn new() -> Self {
        Self
    }

    /// Solve the assignment problem for the given cost matrix.
    ///
    /// Runs over the padded square matrix, then projects the perfect
    /// matching back onto real rows and columns.
    pub fn solve(&self, matrix: &CostMatrix) -> AssignmentSolution {
        let n = matrix.size;
        if n == 0 {
            return AssignmentSolution {
                assigned: Vec::new(),
                total_cost: 0.0,
            };
        }

        // 1-indexed potentials and matching; index 0 is the virtual
        // start of each augmenting chain.
        let mut u = vec![0.0_f64; n + 1];
        let mut v = vec![0.0_f64; n + 1];
        let mut p = vec![0_usize; n + 1]; // p[j] = row matched to column j
        let mut way = vec![0_usize; n + 1];

        for i in 1..=n {
            p[0] = i;
            let mut j0 = 0_usize;
            let mut minv = vec![f64::INFINITY; n + 1];
            let mut used = vec![false; n + 1];

            // Grow the alternating tree until a free column is reached.
            loop {
                used[j0] = true;
                let i0 = p[j0];
                let mut delta = f64::INFINITY;
                let mut j1 = 0_usize;
                for j in 1..=n {
                    if used[j] {
                        continue;
                    }
                    let reduced = matrix.costs[i0 - 1][j - 1] - u[i0] - v[j];
                    if reduced < minv[j] {
                        minv[j] = reduced;
                        way[j] = j0;
                    }
                    if minv[j] < delta {
                        delta = minv[j];
                        j1 = j;
                    }
                }
                for j in 0..=n {
                    if used[j] {
                        u[p[j]] += delta;
                        v[j] -= delta;
                    } else {
                        minv[j] -= delta;
                    }
                }
                j0 = j1;
                if p[j0] == 0 {
                    break;
                }
            }

            // Flip the chain to augment the matching.
            loop {
                let j1 = way[j0];
                p[j0] = p[j1];
                j0 = j1;
                if j0 == 0 {
                    break;
                }
            }
        }

        // Project the perfect matching onto the real universe.
        let mut assigned = vec![None; matrix.n_credits];
        let mut total_cost = 0.0;
        for j in 1..=n {
            let i = p[j] - 1;
            let col = j - 1;
            if i >= matrix.n_credits || col >= matrix.n_debits {
                continue; // padding
            }
            if matrix.costs[i][col] >= FORBIDDEN_COST {
                continue;
            }
            assigned[i] = Some(col);
            total_cost += matrix.costs[i][col];
        }

        AssignmentSolution {
            assigned,
            total_cost,
        }
    }
}
