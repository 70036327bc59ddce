//! # tributa-optimizer
//!
//! Credit/debit compensation optimizer of the Tributa Stack. Takes a
//! universe of tax credits and outstanding debits, scores pairwise
//! compatibility, and finds the assignment that maximizes compensated
//! value and realized savings:
//!
//! - [`compat`] — weighted compatibility scoring with the shared
//!   cross-kind table and the legal restriction vocabulary.
//! - [`matrix`] — LP and cost-matrix construction from the candidate
//!   universe.
//! - [`simplex`] — dense-tableau Simplex for the bilateral strategy.
//! - [`hungarian`] — minimum-cost assignment for the multilateral
//!   strategy.
//! - [`convert`] — projection of solver output into priced, checked
//!   assignments and aggregated solutions.
//! - [`sensitivity`] — stability of the optimum under valuation drift.
//! - [`engine`] — validation, strategy dispatch, report assembly and
//!   the append-only report cache.
//!
//! Savings are priced through the `tributa-fiscal` service seams; the
//! engine takes them by injection and never reaches for globals.

pub mod compat;
pub mod convert;
pub mod engine;
pub mod error;
pub mod hungarian;
pub mod matrix;
pub mod model;
pub mod sensitivity;
pub mod simplex;

pub use compat::{CompatibilityScorer, CompatibilityWeights, CrossKindTable};
pub use convert::SolutionConverter;
pub use engine::CompensationOptimizer;
pub use error::OptimizeError;
pub use hungarian::{AssignmentSolution, HungarianSolver};
pub use matrix::{CostMatrix, LpProblem};
pub use model::{
    CompensationAssignment, Constraint, ConstraintKind, ConstraintOp, OptimalSolution,
    OptimizationCredit, OptimizationDebit, OptimizationParameters, OptimizationReport,
    OptimizationRequest, OptimizationStrategy, ReportValidation, SolutionMetrics, SolverTrace,
};
pub use sensitivity::{SensitivityAnalyzer, SensitivityReport};
pub use simplex::{SimplexSolution, SimplexSolver, SolverState};
