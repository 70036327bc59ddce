//! # Optimization Data Model
//!
//! Input and output types of the compensation optimizer: credits, debits,
//! constraints, assignments, solutions, and the per-run report.
//!
//! ## Invariants
//!
//! - `available_value <= value` for credits; `outstanding_value <= value`
//!   for debits.
//! - An assignment's value never exceeds
//!   `min(credit.available_value, debit.outstanding_value)` — enforced by
//!   the checked constructor, not by caller discipline.
//! - Assignments and reports are immutable once produced; re-optimization
//!   produces new record sets, never mutations.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use tributa_core::{CreditId, DebitId, Jurisdiction, OptimizationId, TaxKind, TaxpayerId, Timestamp};
use tributa_fiscal::SavingsBasis;

use crate::error::OptimizeError;
use crate::sensitivity::SensitivityReport;

// ---------------------------------------------------------------------------
// Credits and Debits
// ---------------------------------------------------------------------------

/// A tax credit balance available to offset debits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationCredit {
    /// Unique credit identifier.
    pub id: CreditId,
    /// Taxpayer holding the credit.
    pub taxpayer: TaxpayerId,
    /// Tax kind the credit originates from.
    pub kind: TaxKind,
    /// Levying authority.
    pub jurisdiction: Jurisdiction,
    /// Nominal value of the credit.
    pub value: f64,
    /// Unused portion still available for compensation.
    pub available_value: f64,
    /// Date the credit expires.
    pub maturity: Timestamp,
    /// Risk level in [0, 1] (0 = riskless).
    pub risk: f64,
    /// Liquidity score in [0, 1] (1 = immediately usable).
    pub liquidity: f64,
    /// Legal restriction tags (see the compatibility scorer for the
    /// recognized vocabulary).
    pub legal_restrictions: Vec<String>,
    /// Per-credit cross-kind compatibility overrides (target tax kind →
    /// score in [0, 1]). Consulted by the scorer before the shared
    /// cross-kind table; same-kind pairs always score 1.0 regardless.
    #[serde(default)]
    pub compatibility_overrides: HashMap<TaxKind, f64>,
    /// Historical utilization rate in [0, 1].
    pub utilization_rate: f64,
    /// Historical approval rate for compensations of this credit in [0, 1].
    pub approval_rate: f64,
}

/// An outstanding tax obligation to be offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationDebit {
    /// Unique debit identifier.
    pub id: DebitId,
    /// Taxpayer owing the debit.
    pub taxpayer: TaxpayerId,
    /// Tax kind owed.
    pub kind: TaxKind,
    /// Levying authority.
    pub jurisdiction: Jurisdiction,
    /// Nominal value of the obligation.
    pub value: f64,
    /// Portion still outstanding.
    pub outstanding_value: f64,
    /// Date the obligation falls due.
    pub due_date: Timestamp,
    /// Urgency level in [0, 1].
    pub urgency: f64,
    /// Penalty rate on late payment, as a fraction.
    pub penalty_rate: f64,
    /// Monthly interest rate on late payment, as a fraction.
    pub interest_rate: f64,
    /// Legal restriction tags.
    pub legal_restrictions: Vec<String>,
}

impl OptimizationDebit {
    /// A fully compensated debit is closed.
    pub fn is_closed(&self) -> bool {
        self.outstanding_value <= 0.0
    }
}

// ---------------------------------------------------------------------------
// Constraints
// ---------------------------------------------------------------------------

/// Dimension a constraint applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    /// Bounds the pair value `min(available, outstanding)`.
    Value,
    /// Bounds the compensation window in days (|maturity - due date|).
    Time,
    /// Restricts the credit's tax kind.
    Type,
    /// Restricts the credit's jurisdiction code.
    Jurisdiction,
    /// Bounds the credit's risk level.
    Risk,
    /// Restricts legal restriction tags present on either side.
    Legal,
}

/// Comparison operator of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintOp {
    Eq,
    Lt,
    Gt,
    Le,
    Ge,
    In,
    NotIn,
}

/// A typed predicate filtering candidate (credit, debit) pairs.
///
/// Numeric kinds (`Value`, `Time`, `Risk`) expect a JSON number and the
/// ordering operators; categorical kinds (`Type`, `Jurisdiction`,
/// `Legal`) expect a JSON string for `Eq` or an array of strings for
/// `In`/`NotIn`. Shape is checked up front by
/// [`OptimizationRequest::validate`]; a malformed constraint is a
/// validation error, never a silently-ignored filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Dimension the predicate applies to.
    pub kind: ConstraintKind,
    /// Comparison operator.
    pub op: ConstraintOp,
    /// Priority for reporting (higher = more important). Filtering is
    /// unconditional regardless of priority.
    pub priority: u8,
    /// Operand; shape depends on `kind` and `op`.
    pub value: serde_json::Value,
}

impl Constraint {
    /// Check the constraint's operand shape. Returns the violated-rule
    /// description when malformed.
    pub fn check_shape(&self) -> Result<(), String> {
        match self.kind {
            ConstraintKind::Value | ConstraintKind::Time | ConstraintKind::Risk => {
                if !matches!(
                    self.op,
                    ConstraintOp::Eq
                        | ConstraintOp::Lt
                        | ConstraintOp::Gt
                        | ConstraintOp::Le
                        | ConstraintOp::Ge
                ) {
                    return Err(format!(
                        "constraint on {:?} requires an ordering operator",
                        self.kind
                    ));
                }
                if self.value.as_f64().is_none() {
                    return Err(format!(
                        "constraint on {:?} requires a numeric operand",
                        self.kind
                    ));
                }
            }
            ConstraintKind::Type | ConstraintKind::Jurisdiction | ConstraintKind::Legal => {
                match self.op {
                    ConstraintOp::Eq => {
                        if self.value.as_str().is_none() {
                            return Err(format!(
                                "constraint on {:?} with eq requires a string operand",
                                self.kind
                            ));
                        }
                    }
                    ConstraintOp::In | ConstraintOp::NotIn => {
                        let ok = self
                            .value
                            .as_array()
                            .is_some_and(|a| a.iter().all(|v| v.is_string()));
                        if !ok {
                            return Err(format!(
                                "constraint on {:?} with in/not_in requires an array of strings",
                                self.kind
                            ));
                        }
                    }
                    _ => {
                        return Err(format!(
                            "constraint on {:?} supports eq, in, not_in",
                            self.kind
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Whether the constraint admits a candidate pair. Assumes
    /// [`check_shape`](Self::check_shape) already passed; a malformed
    /// operand conservatively rejects the pair.
    pub fn admits(&self, credit: &OptimizationCredit, debit: &OptimizationDebit) -> bool {
        match self.kind {
            ConstraintKind::Value => {
                let pair_value = credit.available_value.min(debit.outstanding_value);
                self.compare_numeric(pair_value)
            }
            ConstraintKind::Time => {
                let window = credit.maturity.days_until(&debit.due_date).abs() as f64;
                self.compare_numeric(window)
            }
            ConstraintKind::Risk => self.compare_numeric(credit.risk),
            ConstraintKind::Type => self.compare_categorical(&[credit.kind.as_str()]),
            ConstraintKind::Jurisdiction => {
                self.compare_categorical(&[credit.jurisdiction.code.as_str()])
            }
            ConstraintKind::Legal => {
                let tags: Vec<&str> = credit
                    .legal_restrictions
                    .iter()
                    .chain(debit.legal_restrictions.iter())
                    .map(String::as_str)
                    .collect();
                self.compare_categorical(&tags)
            }
        }
    }

    fn compare_numeric(&self, observed: f64) -> bool {
        let Some(bound) = self.value.as_f64() else {
            return false;
        };
        match self.op {
            ConstraintOp::Eq => (observed - bound).abs() < f64::EPSILON,
            ConstraintOp::Lt => observed < bound,
            ConstraintOp::Gt => observed > bound,
            ConstraintOp::Le => observed <= bound,
            ConstraintOp::Ge => observed >= bound,
            ConstraintOp::In | ConstraintOp::NotIn => false,
        }
    }

    fn compare_categorical(&self, observed: &[&str]) -> bool {
        match self.op {
            ConstraintOp::Eq => self
                .value
                .as_str()
                .is_some_and(|want| observed.contains(&want)),
            ConstraintOp::In => self.value.as_array().is_some_and(|allowed| {
                observed.iter().any(|o| {
                    allowed
                        .iter()
                        .any(|v| v.as_str().is_some_and(|s| s == *o))
                })
            }),
            ConstraintOp::NotIn => self.value.as_array().is_some_and(|denied| {
                observed.iter().all(|o| {
                    !denied
                        .iter()
                        .any(|v| v.as_str().is_some_and(|s| s == *o))
                })
            }),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Assignments and Solutions
// ---------------------------------------------------------------------------

/// A committed pairing of one credit to one debit. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompensationAssignment {
    /// Credit being applied.
    pub credit: CreditId,
    /// Debit being offset.
    pub debit: DebitId,
    /// Value compensated; at most `min(available, outstanding)`.
    pub assigned_value: f64,
    /// Compatibility score of the pair in [0, 1].
    pub compatibility: f64,
    /// Estimated savings realized by the assignment.
    pub estimated_savings: f64,
    /// How the savings figure was produced.
    pub savings_basis: SavingsBasis,
    /// Estimated risk of the assignment in [0, 1].
    pub estimated_risk: f64,
    /// Estimated processing time in days.
    pub processing_days: f64,
}

impl CompensationAssignment {
    /// Checked constructor enforcing the conservation invariant.
    ///
    /// # Errors
    ///
    /// Validation error when `assigned_value` exceeds
    /// `min(credit.available_value, debit.outstanding_value)` or is not
    /// positive.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        credit: &OptimizationCredit,
        debit: &OptimizationDebit,
        assigned_value: f64,
        compatibility: f64,
        estimated_savings: f64,
        savings_basis: SavingsBasis,
        estimated_risk: f64,
        processing_days: f64,
    ) -> Result<Self, OptimizeError> {
        let ceiling = credit.available_value.min(debit.outstanding_value);
        if !(assigned_value > 0.0) {
            return Err(OptimizeError::validation(format!(
                "assignment {} -> {} has non-positive value {assigned_value}",
                credit.id, debit.id
            )));
        }
        if assigned_value > ceiling {
            return Err(OptimizeError::validation(format!(
                "assignment {} -> {} over-assigns: {assigned_value} > {ceiling}",
                credit.id, debit.id
            )));
        }
        Ok(Self {
            credit: credit.id,
            debit: debit.id,
            assigned_value,
            compatibility,
            estimated_savings,
            savings_basis,
            estimated_risk,
            processing_days,
        })
    }
}

/// One complete solution: an assignment set with aggregate figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalSolution {
    /// The assignments, in solver output order.
    pub assignments: Vec<CompensationAssignment>,
    /// Aggregate solution score (efficiency weighted by confidence).
    pub score: f64,
    /// Total compensated value.
    pub total_value: f64,
    /// Total estimated savings.
    pub total_savings: f64,
    /// Value-weighted average assignment risk in [0, 1].
    pub risk_level: f64,
    /// Expected duration in days (critical path over assignments).
    pub expected_duration_days: f64,
    /// Confidence in [0, 1], from compatibility and approval history.
    pub confidence: f64,
}

/// Derived solution metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolutionMetrics {
    /// `total_savings / total_value` (0 when nothing was compensated).
    pub efficiency: f64,
    /// The solution's risk level.
    pub risk_score: f64,
    /// `1 / expected_duration_days` (1 for an instantaneous solution).
    pub speed_score: f64,
    /// The solution's confidence.
    pub feasibility_score: f64,
}

impl SolutionMetrics {
    /// Derive metrics from a solution.
    pub fn from_solution(solution: &OptimalSolution) -> Self {
        let efficiency = if solution.total_value > 0.0 {
            solution.total_savings / solution.total_value
        } else {
            0.0
        };
        let speed_score = if solution.expected_duration_days > 0.0 {
            1.0 / solution.expected_duration_days
        } else {
            1.0
        };
        Self {
            efficiency,
            risk_score: solution.risk_level,
            speed_score,
            feasibility_score: solution.confidence,
        }
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Solving strategy requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationStrategy {
    /// Continuous LP relaxation solved with Simplex.
    Bilateral,
    /// Minimum-cost assignment solved with the Hungarian method.
    Multilateral,
    /// Cycle detection across taxpayers. Accepted on the wire; not
    /// solvable by this core (typed `Unsupported` error).
    Circular,
    /// Runs both bilateral and multilateral, keeps the better solution.
    Hybrid,
}

impl std::fmt::Display for OptimizationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bilateral => write!(f, "bilateral"),
            Self::Multilateral => write!(f, "multilateral"),
            Self::Circular => write!(f, "circular"),
            Self::Hybrid => write!(f, "hybrid"),
        }
    }
}

/// Tunable parameters of one optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationParameters {
    /// Simplex iteration cap; clamped to the hard cap of 1000.
    pub max_iterations: usize,
    /// Numeric tolerance for the Simplex optimality and ratio tests.
    /// Non-positive or non-finite values fall back to the solver default.
    pub tolerance: f64,
    /// Pairs whose credit risk exceeds this are excluded.
    pub risk_tolerance: f64,
    /// Pairs whose compensation window exceeds this many days are excluded.
    pub time_horizon_days: i64,
    /// Solutions below this efficiency are rejected with a validation error.
    pub minimum_efficiency: f64,
}

impl Default for OptimizationParameters {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-9,
            risk_tolerance: 1.0,
            time_horizon_days: 3650,
            minimum_efficiency: 0.0,
        }
    }
}

/// One optimization request: the caller-facing input contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    /// Requested solving strategy.
    pub strategy: OptimizationStrategy,
    /// Credits available for compensation.
    pub credits: Vec<OptimizationCredit>,
    /// Debits to be offset.
    pub debits: Vec<OptimizationDebit>,
    /// Candidate-pair filters.
    pub constraints: Vec<Constraint>,
    /// Run parameters.
    pub parameters: OptimizationParameters,
}

impl OptimizationRequest {
    /// Validate the request, collecting every violated rule.
    ///
    /// Fails fast before any solver runs: empty credit/debit lists,
    /// non-positive or inconsistent values, out-of-range unit-interval
    /// fields, and malformed constraints are all rejected here.
    pub fn validate(&self) -> Result<(), OptimizeError> {
        let mut issues = Vec::new();

        if self.credits.is_empty() {
            issues.push("credits list is empty".to_string());
        }
        if self.debits.is_empty() {
            issues.push("debits list is empty".to_string());
        }

        for credit in &self.credits {
            if !credit.value.is_finite() || credit.value <= 0.0 {
                issues.push(format!("{}: non-positive value {}", credit.id, credit.value));
            }
            if credit.available_value < 0.0 || credit.available_value > credit.value {
                issues.push(format!(
                    "{}: available {} outside [0, {}]",
                    credit.id, credit.available_value, credit.value
                ));
            }
            for (field, v) in [
                ("risk", credit.risk),
                ("liquidity", credit.liquidity),
                ("utilization_rate", credit.utilization_rate),
                ("approval_rate", credit.approval_rate),
            ] {
                if !(0.0..=1.0).contains(&v) {
                    issues.push(format!("{}: {field} {v} outside [0, 1]", credit.id));
                }
            }
            for (kind, score) in &credit.compatibility_overrides {
                if !(0.0..=1.0).contains(score) {
                    issues.push(format!(
                        "{}: compatibility override for {kind} is {score}, outside [0, 1]",
                        credit.id
                    ));
                }
            }
        }

        for debit in &self.debits {
            if !debit.value.is_finite() || debit.value <= 0.0 {
                issues.push(format!("{}: non-positive value {}", debit.id, debit.value));
            }
            if debit.outstanding_value < 0.0 || debit.outstanding_value > debit.value {
                issues.push(format!(
                    "{}: outstanding {} outside [0, {}]",
                    debit.id, debit.outstanding_value, debit.value
                ));
            }
            if !(0.0..=1.0).contains(&debit.urgency) {
                issues.push(format!("{}: urgency {} outside [0, 1]", debit.id, debit.urgency));
            }
            if !(0.0..=1.0).contains(&debit.penalty_rate) {
                issues.push(format!(
                    "{}: penalty_rate {} outside [0, 1]",
                    debit.id, debit.penalty_rate
                ));
            }
        }

        for (i, constraint) in self.constraints.iter().enumerate() {
            if let Err(reason) = constraint.check_shape() {
                issues.push(format!("constraints[{i}]: {reason}"));
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(OptimizeError::Validation { issues })
        }
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// How the solver converged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverTrace {
    /// Algorithm that produced the optimal solution.
    pub algorithm: String,
    /// Iterations the solver performed.
    pub iterations: usize,
    /// Wall-clock convergence time in milliseconds.
    pub elapsed_ms: u64,
}

/// Validation status of a produced report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportValidation {
    /// All figures fully computed.
    Passed,
    /// At least one savings figure used the conservative fallback;
    /// accuracy is degraded.
    DegradedSavings,
}

/// The complete output of one optimization run. Append-only cached by
/// [`id`](Self::id); never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    /// Unique identifier of this run.
    pub id: OptimizationId,
    /// Strategy that was requested.
    pub strategy: OptimizationStrategy,
    /// The best solution found.
    pub optimal: OptimalSolution,
    /// Alternative solutions, best first.
    pub alternatives: Vec<OptimalSolution>,
    /// Metrics derived from the optimal solution.
    pub metrics: SolutionMetrics,
    /// Solver convergence trace.
    pub trace: SolverTrace,
    /// Sensitivity of the optimum to pair-valuation drift.
    pub sensitivity: SensitivityReport,
    /// Whether any figure was produced in degraded mode.
    pub validation: ReportValidation,
}
