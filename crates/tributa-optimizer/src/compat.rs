//! # Compatibility Scoring
//!
//! Scores how well one credit can offset one debit, in [0, 1]. The score
//! is a weighted sum of four independent sub-scores: tax kind,
//! jurisdiction, legal restrictions, and maturity/due-date ordering.
//!
//! ## Invariants
//!
//! - Weights sum to exactly 1.0 — enforced at construction, so the
//!   weighted sum of [0, 1] sub-scores cannot leave [0, 1]; the final
//!   clamp is belt only.
//! - Scoring never fails: an unrecognized restriction tag or degenerate
//!   input scores conservatively (incompatible), it does not error.
//!
//! ## Legal restriction vocabulary
//!
//! - `no_cross_kind` — conflicts when the pair's tax kinds differ.
//! - `no_cross_jurisdiction` — conflicts when the authorities differ.
//! - `excludes:<kind>` — conflicts when the other side is that tax kind.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tributa_core::TaxKind;

use crate::error::OptimizeError;
use crate::model::{OptimizationCredit, OptimizationDebit};

/// Sub-score for a cross-kind pairing when the table has no entry.
const DEFAULT_CROSS_KIND: f64 = 0.5;
/// Sub-score for a cross-jurisdiction pairing.
const CROSS_JURISDICTION: f64 = 0.7;
/// Sub-score when the credit matures after the debit falls due.
const LATE_MATURITY: f64 = 0.3;

/// Weights of the four compatibility sub-scores. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityWeights {
    /// Weight of the tax-kind sub-score.
    pub tax: f64,
    /// Weight of the jurisdiction sub-score.
    pub jurisdiction: f64,
    /// Weight of the legal sub-score.
    pub legal: f64,
    /// Weight of the time sub-score.
    pub time: f64,
}

impl Default for CompatibilityWeights {
    fn default() -> Self {
        Self {
            tax: 0.4,
            jurisdiction: 0.3,
            legal: 0.2,
            time: 0.1,
        }
    }
}

impl CompatibilityWeights {
    /// Validate that the weights are non-negative and sum to 1.0.
    pub fn validated(self) -> Result<Self, OptimizeError> {
        let components = [self.tax, self.jurisdiction, self.legal, self.time];
        if components.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(OptimizeError::validation(
                "compatibility weights must be non-negative and finite",
            ));
        }
        let sum: f64 = components.iter().sum();
        if (sum - 1.0).abs() > 1e-9 {
            return Err(OptimizeError::validation(format!(
                "compatibility weights must sum to 1.0, got {sum}"
            )));
        }
        Ok(self)
    }

    /// Sum of the four weights.
    pub fn sum(&self) -> f64 {
        self.tax + self.jurisdiction + self.legal + self.time
    }
}

/// Process-wide, read-mostly table of cross-kind compatibility scores.
///
/// Initialized once at startup and shared by reference; concurrent
/// optimization runs read it, administrative updates are rare. Explicitly
/// constructed and injected — not a global.
#[derive(Debug, Default)]
pub struct CrossKindTable {
    scores: RwLock<HashMap<(TaxKind, TaxKind), f64>>,
}

impl CrossKindTable {
    /// Empty table; every cross-kind pair scores the default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Score for offsetting a debit of `debit_kind` with a credit of
    /// `credit_kind`. Same-kind pairs always score 1.0.
    pub fn score(&self, credit_kind: TaxKind, debit_kind: TaxKind) -> f64 {
        if credit_kind == debit_kind {
            return 1.0;
        }
        self.scores
            .read()
            .get(&(credit_kind, debit_kind))
            .copied()
            .unwrap_or(DEFAULT_CROSS_KIND)
    }

    /// Set the score for a cross-kind pair, clamped to [0, 1].
    pub fn set(&self, credit_kind: TaxKind, debit_kind: TaxKind, score: f64) {
        self.scores
            .write()
            .insert((credit_kind, debit_kind), score.clamp(0.0, 1.0));
    }
}

/// The compatibility scorer: weights plus the shared cross-kind table.
#[derive(Debug, Clone)]
pub struct CompatibilityScorer {
    weights: CompatibilityWeights,
    table: Arc<CrossKindTable>,
}

impl CompatibilityScorer {
    /// Create a scorer with validated weights and a shared table.
    pub fn new(
        weights: CompatibilityWeights,
        table: Arc<CrossKindTable>,
    ) -> Result<Self, OptimizeError> {
        Ok(Self {
            weights: weights.validated()?,
            table,
        })
    }

    /// Scorer with default weights and an empty table.
    pub fn with_defaults() -> Self {
        Self {
            weights: CompatibilityWeights::default(),
            table: Arc::new(CrossKindTable::new()),
        }
    }

    /// The scorer's weights.
    pub fn weights(&self) -> &CompatibilityWeights {
        &self.weights
    }

    /// Compatibility of a (credit, debit) pair, in [0, 1].
    ///
    /// Cross-kind resolution order: the credit's own override map, then
    /// the shared table, then the default. Same-kind pairs always score
    /// 1.0 on the tax component.
    pub fn score(&self, credit: &OptimizationCredit, debit: &OptimizationDebit) -> f64 {
        let tax = if credit.kind == debit.kind {
            1.0
        } else if let Some(&overridden) = credit.compatibility_overrides.get(&debit.kind) {
            overridden.clamp(0.0, 1.0)
        } else {
            self.table.score(credit.kind, debit.kind)
        };
        let jurisdiction = if credit.jurisdiction.same_authority(&debit.jurisdiction) {
            1.0
        } else {
            CROSS_JURISDICTION
        };
        let legal = if legal_conflict(credit, debit) { 0.0 } else { 1.0 };
        let time = if credit.maturity >= debit.due_date {
            1.0
        } else {
            LATE_MATURITY
        };

        let score = self.weights.tax * tax
            + self.weights.jurisdiction * jurisdiction
            + self.weights.legal * legal
            + self.weights.time * time;
        score.clamp(0.0, 1.0)
    }
}

/// Whether the restriction lists mutually exclude the pairing.
fn legal_conflict(credit: &OptimizationCredit, debit: &OptimizationDebit) -> bool {
    let cross_kind = credit.kind != debit.kind;
    let cross_jurisdiction = !credit.jurisdiction.same_authority(&debit.jurisdiction);

    let credit_blocks = credit.legal_restrictions.iter().any(|tag| {
        (tag == "no_cross_kind" && cross_kind)
            || (tag == "no_cross_jurisdiction" && cross_jurisdiction)
            || tag
                .strip_prefix("excludes:")
                .is_some_and(|k| k == debit.kind.as_str())
    });
    let debit_blocks = debit.legal_restrictions.iter().any(|tag| {
        (tag == "no_cross_kind" && cross_kind)
            || (tag == "no_cross_jurisdiction" && cross_jurisdiction)
            || tag
                .strip_prefix("excludes:")
                .is_some_and(|k| k == credit.kind.as_str())
    });

    credit_blocks || debit_blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{credit, debit, ts};
    use proptest::prelude::*;

    #[test]
    fn default_weights_sum_to_one() {
        let w = CompatibilityWeights::default();
        assert!((w.sum() - 1.0).abs() < 1e-12);
        assert!(w.validated().is_ok());
    }

    #[test]
    fn weights_not_summing_to_one_rejected() {
        let w = CompatibilityWeights {
            tax: 0.5,
            jurisdiction: 0.3,
            legal: 0.2,
            time: 0.1,
        };
        assert!(w.validated().is_err());
    }

    #[test]
    fn negative_weight_rejected() {
        let w = CompatibilityWeights {
            tax: 1.2,
            jurisdiction: -0.2,
            legal: 0.0,
            time: 0.0,
        };
        assert!(w.validated().is_err());
    }

    #[test]
    fn perfect_pair_scores_one() {
        let scorer = CompatibilityScorer::with_defaults();
        let c = credit("icms", 1000.0, 1000.0);
        let d = debit("icms", 900.0, 900.0);
        // Same kind, same jurisdiction, no restrictions, maturity after due.
        assert!((scorer.score(&c, &d) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cross_kind_applies_default_half() {
        let scorer = CompatibilityScorer::with_defaults();
        let c = credit("ipi", 1000.0, 1000.0);
        let d = debit("pis", 900.0, 900.0);
        // tax 0.4*0.5, rest full: 0.2 + 0.3 + 0.2 + 0.1 = 0.8
        assert!((scorer.score(&c, &d) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn cross_kind_table_overrides_default() {
        let table = Arc::new(CrossKindTable::new());
        table.set(TaxKind::Ipi, TaxKind::Pis, 0.9);
        let scorer =
            CompatibilityScorer::new(CompatibilityWeights::default(), table).unwrap();
        let c = credit("ipi", 1000.0, 1000.0);
        let d = debit("pis", 900.0, 900.0);
        assert!((scorer.score(&c, &d) - (0.4 * 0.9 + 0.6)).abs() < 1e-12);
    }

    #[test]
    fn per_credit_override_beats_shared_table() {
        let table = Arc::new(CrossKindTable::new());
        table.set(TaxKind::Ipi, TaxKind::Pis, 0.9);
        let scorer =
            CompatibilityScorer::new(CompatibilityWeights::default(), table).unwrap();
        let mut c = credit("ipi", 1000.0, 1000.0);
        c.compatibility_overrides.insert(TaxKind::Pis, 0.2);
        let d = debit("pis", 900.0, 900.0);
        // The credit's own map wins over the shared 0.9 entry.
        assert!((scorer.score(&c, &d) - (0.4 * 0.2 + 0.6)).abs() < 1e-12);
    }

    #[test]
    fn same_kind_pair_ignores_overrides() {
        let scorer = CompatibilityScorer::with_defaults();
        let mut c = credit("icms", 1000.0, 1000.0);
        c.compatibility_overrides.insert(TaxKind::Icms, 0.1);
        let d = debit("icms", 900.0, 900.0);
        assert!((scorer.score(&c, &d) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cross_jurisdiction_penalized() {
        let scorer = CompatibilityScorer::with_defaults();
        let c = credit("icms", 1000.0, 1000.0);
        let mut d = debit("icms", 900.0, 900.0);
        d.jurisdiction = tributa_core::Jurisdiction::state("rj");
        // jurisdiction 0.3*0.7 instead of 0.3.
        assert!((scorer.score(&c, &d) - 0.91).abs() < 1e-12);
    }

    #[test]
    fn late_maturity_penalized() {
        let scorer = CompatibilityScorer::with_defaults();
        let mut c = credit("icms", 1000.0, 1000.0);
        let mut d = debit("icms", 900.0, 900.0);
        c.maturity = ts("2026-01-01T00:00:00Z");
        d.due_date = ts("2026-06-01T00:00:00Z"); // due after maturity
        // time 0.1*0.3 instead of 0.1.
        assert!((scorer.score(&c, &d) - 0.93).abs() < 1e-12);
    }

    #[test]
    fn legal_exclusion_zeroes_legal_component() {
        let scorer = CompatibilityScorer::with_defaults();
        let mut c = credit("icms", 1000.0, 1000.0);
        c.legal_restrictions = vec!["excludes:iss".to_string()];
        let d = debit("iss", 900.0, 900.0);
        // cross-kind 0.4*0.5 + jurisdiction 0.3 + legal 0 + time 0.1
        assert!((scorer.score(&c, &d) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn no_cross_kind_tag_blocks_only_cross_kind_pairs() {
        let scorer = CompatibilityScorer::with_defaults();
        let mut c = credit("icms", 1000.0, 1000.0);
        c.legal_restrictions = vec!["no_cross_kind".to_string()];
        let same = debit("icms", 900.0, 900.0);
        let other = debit("ipi", 900.0, 900.0);
        assert!((scorer.score(&c, &same) - 1.0).abs() < 1e-12);
        assert!(scorer.score(&c, &other) < scorer.score(&c, &same));
    }

    #[test]
    fn restriction_on_debit_side_also_blocks() {
        let scorer = CompatibilityScorer::with_defaults();
        let c = credit("icms", 1000.0, 1000.0);
        let mut d = debit("ipi", 900.0, 900.0);
        d.legal_restrictions = vec!["excludes:icms".to_string()];
        // Legal component zeroed.
        let score = scorer.score(&c, &d);
        assert!((score - (0.4 * 0.5 + 0.3 + 0.1)).abs() < 1e-12);
    }

    #[test]
    fn unrecognized_tag_is_ignored_not_an_error() {
        let scorer = CompatibilityScorer::with_defaults();
        let mut c = credit("icms", 1000.0, 1000.0);
        c.legal_restrictions = vec!["per_decreto_123".to_string()];
        let d = debit("icms", 900.0, 900.0);
        assert!((scorer.score(&c, &d) - 1.0).abs() < 1e-12);
    }

    proptest! {
        /// Score bounds hold for every pair the model can express.
        #[test]
        fn score_always_in_unit_interval(
            credit_kind in 0usize..7,
            debit_kind in 0usize..7,
            same_jurisdiction in any::<bool>(),
            maturity_first in any::<bool>(),
            restricted in any::<bool>(),
        ) {
            let kinds = TaxKind::all();
            let scorer = CompatibilityScorer::with_defaults();
            let mut c = credit(kinds[credit_kind].as_str(), 1000.0, 1000.0);
            let mut d = debit(kinds[debit_kind].as_str(), 900.0, 900.0);
            if !same_jurisdiction {
                d.jurisdiction = tributa_core::Jurisdiction::state("rj");
            }
            if !maturity_first {
                c.maturity = ts("2026-01-01T00:00:00Z");
                d.due_date = ts("2026-06-01T00:00:00Z");
            }
            if restricted {
                c.legal_restrictions = vec!["no_cross_kind".to_string()];
            }
            let score = scorer.score(&c, &d);
            prop_assert!((0.0..=1.0).contains(&score), "score {score} out of bounds");
        }
    }
}
