//! # Compensation Optimization Engine
//!
//! Front door of the optimizer: validates a request, dispatches it to
//! the strategy's solver chain, and assembles the immutable
//! [`OptimizationReport`]. Reports are cached by run id in an
//! append-only map; re-optimization always produces a fresh report
//! under a fresh id.
//!
//! All collaborators are injected at construction. There is no global
//! engine instance; callers own the engine and its service wiring.

use std::time::Instant;

use dashmap::DashMap;
use tracing::{info, warn};

use tributa_core::OptimizationId;

use crate::compat::CompatibilityScorer;
use crate::convert::{greedy_baseline, has_degraded_savings, SolutionConverter};
use crate::error::OptimizeError;
use crate::hungarian::HungarianSolver;
use crate::matrix::{CostMatrix, LpProblem};
use crate::model::{
    Constraint, ConstraintKind, ConstraintOp, OptimalSolution, OptimizationReport,
    OptimizationRequest, OptimizationStrategy, ReportValidation, SolutionMetrics, SolverTrace,
};
use crate::sensitivity::{SensitivityAnalyzer, SensitivityReport};
use crate::simplex::{SimplexSolver, MAX_PIVOTS};

/// One solver chain's outcome, before report assembly.
struct StrategyOutcome {
    solution: OptimalSolution,
    algorithm: &'static str,
    iterations: usize,
}

/// The compensation optimizer.
#[derive(Debug)]
pub struct CompensationOptimizer {
    scorer: CompatibilityScorer,
    converter: SolutionConverter,
    reports: DashMap<OptimizationId, OptimizationReport>,
}

impl CompensationOptimizer {
    /// Build an engine over the given scorer and converter.
    pub fn new(scorer: CompatibilityScorer, converter: SolutionConverter) -> Self {
        Self {
            scorer,
            converter,
            reports: DashMap::new(),
        }
    }

    /// Run one optimization end to end.
    ///
    /// # Errors
    ///
    /// - `Validation` when the request fails its input contract, or the
    ///   produced solution falls below the requested minimum efficiency.
    /// - `Unsupported` for the circular strategy.
    /// - `Unbounded` / `MaxIterations` when a solver fails.
    pub fn optimize(
        &self,
        request: &OptimizationRequest,
    ) -> Result<OptimizationReport, OptimizeError> {
        request.validate()?;

        let id = OptimizationId::new();
        let started = Instant::now();
        info!(
            %id,
            strategy = %request.strategy,
            credits = request.credits.len(),
            debits = request.debits.len(),
            "optimization started"
        );

        // Run parameters become unconditional pair filters alongside the
        // caller's constraints.
        let constraints = self.effective_constraints(request);

        let lp = LpProblem::build(
            &request.credits,
            &request.debits,
            &constraints,
            &self.scorer,
        );

        let mut alternatives = Vec::new();
        let outcome = match request.strategy {
            OptimizationStrategy::Bilateral => self.run_bilateral(request, &lp)?,
            OptimizationStrategy::Multilateral => {
                self.run_multilateral(request, &constraints)?
            }
            OptimizationStrategy::Hybrid => {
                let bilateral = self.run_bilateral(request, &lp)?;
                let multilateral = self.run_multilateral(request, &constraints)?;
                if bilateral.solution.total_savings >= multilateral.solution.total_savings {
                    alternatives.push(multilateral.solution);
                    bilateral
                } else {
                    alternatives.push(bilateral.solution);
                    multilateral
                }
            }
            OptimizationStrategy::Circular => {
                return Err(OptimizeError::Unsupported(
                    "circular compensation chains".to_string(),
                ));
            }
        };

        // The greedy baseline always ships as the last alternative.
        let baseline = greedy_baseline(
            &self.converter,
            &request.credits,
            &request.debits,
            |i, j| lp.pair_compatibility[LpProblem::variable_index(i, j, lp.n_debits)],
        )?;
        alternatives.push(baseline);
        alternatives.sort_by(|a, b| {
            b.total_savings
                .partial_cmp(&a.total_savings)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let metrics = SolutionMetrics::from_solution(&outcome.solution);
        if metrics.efficiency < request.parameters.minimum_efficiency {
            return Err(OptimizeError::validation(format!(
                "solution efficiency {:.4} below required minimum {:.4}",
                metrics.efficiency, request.parameters.minimum_efficiency
            )));
        }

        let sensitivity = self.sensitivity(&lp)?;

        let validation = if has_degraded_savings(&outcome.solution) {
            warn!(%id, "report carries conservatively estimated savings");
            ReportValidation::DegradedSavings
        } else {
            ReportValidation::Passed
        };

        let report = OptimizationReport {
            id,
            strategy: request.strategy,
            metrics,
            trace: SolverTrace {
                algorithm: outcome.algorithm.to_string(),
                iterations: outcome.iterations,
                elapsed_ms: started.elapsed().as_millis() as u64,
            },
            optimal: outcome.solution,
            alternatives,
            sensitivity,
            validation,
        };
        info!(
            %id,
            total_value = report.optimal.total_value,
            total_savings = report.optimal.total_savings,
            elapsed_ms = report.trace.elapsed_ms,
            "optimization finished"
        );
        self.reports.insert(id, report.clone());
        Ok(report)
    }

    /// Fetch a cached report by run id.
    pub fn report(&self, id: &OptimizationId) -> Option<OptimizationReport> {
        self.reports.get(id).map(|r| r.value().clone())
    }

    /// Number of cached reports.
    pub fn report_count(&self) -> usize {
        self.reports.len()
    }

    fn run_bilateral(
        &self,
        request: &OptimizationRequest,
        lp: &LpProblem,
    ) -> Result<StrategyOutcome, OptimizeError> {
        let cap = request.parameters.max_iterations.min(MAX_PIVOTS);
        let solved = SimplexSolver::with_limits(cap, request.parameters.tolerance).maximize(lp)?;
        let solution =
            self.converter
                .from_lp(lp, &solved, &request.credits, &request.debits)?;
        Ok(StrategyOutcome {
            solution,
            algorithm: "simplex",
            iterations: solved.iterations,
        })
    }

    fn run_multilateral(
        &self,
        request: &OptimizationRequest,
        constraints: &[Constraint],
    ) -> Result<StrategyOutcome, OptimizeError> {
        let matrix = CostMatrix::build(
            &request.credits,
            &request.debits,
            constraints,
            &self.scorer,
        );
        let matching = HungarianSolver::new().solve(&matrix);
        let solution = self.converter.from_assignment(
            &matrix,
            &matching,
            &request.credits,
            &request.debits,
        )?;
        Ok(StrategyOutcome {
            solution,
            algorithm: "hungarian",
            // One augmenting phase per row of the padded matrix.
            iterations: matrix.size,
        })
    }

    fn sensitivity(&self, lp: &LpProblem) -> Result<SensitivityReport, OptimizeError> {
        let base = SimplexSolver::new().maximize(lp)?.objective;
        SensitivityAnalyzer::new().analyze(lp, base)
    }

    /// Caller constraints plus the run parameters expressed as filters.
    fn effective_constraints(&self, request: &OptimizationRequest) -> Vec<Constraint> {
        let mut constraints = request.constraints.clone();
        if request.parameters.risk_tolerance < 1.0 {
            constraints.push(Constraint {
                kind: ConstraintKind::Risk,
                op: ConstraintOp::Le,
                priority: 0,
                value: serde_json::json!(request.parameters.risk_tolerance),
            });
        }
        constraints.push(Constraint {
            kind: ConstraintKind::Time,
            op: ConstraintOp::Le,
            priority: 0,
            value: serde_json::json!(request.parameters.time_horizon_days),
        });
        constraints
    }
}
