//! # Monetary Correction — Reference Corrector
//!
//! Restates a principal across a time window under a monetary index and
//! accrues late-payment interest and fines. The reference implementation
//! compounds a flat monthly rate per index; production deployments adapt
//! the fiscal authority's published monthly schedules behind the same
//! [`MonetaryCorrector`] trait.
//!
//! ## Fine rule
//!
//! Late-payment fine accrues at 0.33% per day of delay, capped at 20% of
//! the principal. Interest is the compounded index over the window.

use serde::{Deserialize, Serialize};
use tributa_core::Timestamp;

use crate::error::FiscalError;
use crate::traits::{CorrectionResult, MonetaryCorrector};

/// Daily late-payment fine rate.
const FINE_DAILY_RATE: f64 = 0.0033;
/// Fine cap as a fraction of principal.
const FINE_CAP: f64 = 0.20;

/// Monetary index used for correction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    /// Central bank policy rate (Selic).
    Selic,
    /// Broad consumer price index (IPCA).
    Ipca,
    /// Fixed monthly rate supplied by the caller, as a fraction.
    Fixed(f64),
}

impl std::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Selic => write!(f, "selic"),
            Self::Ipca => write!(f, "ipca"),
            Self::Fixed(rate) => write!(f, "fixed({rate})"),
        }
    }
}

/// Reference corrector with flat monthly rates per index.
#[derive(Debug, Clone, PartialEq)]
pub struct SelicCorrector {
    /// Monthly Selic rate, as a fraction.
    pub selic_monthly: f64,
    /// Monthly IPCA rate, as a fraction.
    pub ipca_monthly: f64,
}

impl Default for SelicCorrector {
    fn default() -> Self {
        // Flat approximations of the recent published schedules.
        Self {
            selic_monthly: 0.0093,
            ipca_monthly: 0.0045,
        }
    }
}

impl SelicCorrector {
    /// Create a corrector with the default flat monthly rates.
    pub fn new() -> Self {
        Self::default()
    }

    fn monthly_rate(&self, index: IndexKind) -> Result<f64, FiscalError> {
        let rate = match index {
            IndexKind::Selic => self.selic_monthly,
            IndexKind::Ipca => self.ipca_monthly,
            IndexKind::Fixed(rate) => rate,
        };
        if !rate.is_finite() || rate < 0.0 {
            return Err(FiscalError::RateUnavailable {
                index: index.to_string(),
            });
        }
        Ok(rate)
    }
}

impl MonetaryCorrector for SelicCorrector {
    fn correct(
        &self,
        principal: f64,
        start: Timestamp,
        end: Timestamp,
        index: IndexKind,
    ) -> Result<CorrectionResult, FiscalError> {
        if !principal.is_finite() || principal <= 0.0 {
            return Err(FiscalError::invalid(
                "principal",
                format!("must be positive and finite, got {principal}"),
            ));
        }
        let days = start.days_until(&end);
        if days < 0 {
            return Err(FiscalError::InvertedWindow { start, end });
        }

        let monthly = self.monthly_rate(index)?;
        let months = days as f64 / 30.0;
        let corrected_value = principal * (1.0 + monthly).powf(months);

        let fine = principal * (FINE_DAILY_RATE * days as f64).min(FINE_CAP);
        let interest_and_fines = (corrected_value - principal) + fine;

        Ok(CorrectionResult {
            corrected_value,
            interest_and_fines,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    #[test]
    fn zero_window_is_identity() {
        let c = SelicCorrector::new();
        let t = ts("2026-01-01T00:00:00Z");
        let r = c.correct(1000.0, t, t, IndexKind::Selic).unwrap();
        assert!((r.corrected_value - 1000.0).abs() < 1e-9);
        assert!((r.interest_and_fines - 0.0).abs() < 1e-9);
    }

    #[test]
    fn one_month_compounds_once() {
        let c = SelicCorrector::new();
        let r = c
            .correct(
                1000.0,
                ts("2026-01-01T00:00:00Z"),
                ts("2026-01-31T00:00:00Z"),
                IndexKind::Selic,
            )
            .unwrap();
        // 30 days = one compounding month.
        assert!((r.corrected_value - 1000.0 * 1.0093).abs() < 1e-6);
    }

    #[test]
    fn fine_caps_at_twenty_percent() {
        let c = SelicCorrector::new();
        // 365 days of delay: uncapped fine would be 0.33%/day * 365 > 100%.
        let r = c
            .correct(
                1000.0,
                ts("2025-01-01T00:00:00Z"),
                ts("2026-01-01T00:00:00Z"),
                IndexKind::Fixed(0.0),
            )
            .unwrap();
        // Zero index isolates the fine component.
        assert!((r.interest_and_fines - 200.0).abs() < 1e-6);
    }

    #[test]
    fn inverted_window_rejected() {
        let c = SelicCorrector::new();
        let err = c
            .correct(
                1000.0,
                ts("2026-02-01T00:00:00Z"),
                ts("2026-01-01T00:00:00Z"),
                IndexKind::Selic,
            )
            .unwrap_err();
        assert!(matches!(err, FiscalError::InvertedWindow { .. }));
    }

    #[test]
    fn non_positive_principal_rejected() {
        let c = SelicCorrector::new();
        let t = ts("2026-01-01T00:00:00Z");
        for bad in [0.0, -5.0, f64::NAN] {
            assert!(c.correct(bad, t, t, IndexKind::Selic).is_err());
        }
    }

    #[test]
    fn negative_fixed_rate_rejected() {
        let c = SelicCorrector::new();
        let t = ts("2026-01-01T00:00:00Z");
        let err = c
            .correct(100.0, t, t, IndexKind::Fixed(-0.01))
            .unwrap_err();
        assert!(matches!(err, FiscalError::RateUnavailable { .. }));
    }

    #[test]
    fn ipca_runs_below_selic() {
        let c = SelicCorrector::new();
        let start = ts("2026-01-01T00:00:00Z");
        let end = ts("2026-07-01T00:00:00Z");
        let selic = c.correct(1000.0, start, end, IndexKind::Selic).unwrap();
        let ipca = c.correct(1000.0, start, end, IndexKind::Ipca).unwrap();
        assert!(selic.corrected_value > ipca.corrected_value);
    }

    proptest::proptest! {
        /// A longer delay never accrues less interest and fines.
        #[test]
        fn accrual_monotone_in_window_length(days in 0i64..2000, extra in 1i64..500) {
            let c = SelicCorrector::new();
            let start = ts("2020-01-01T00:00:00Z");
            let shorter = Timestamp::from_utc(
                *start.as_datetime() + chrono::Duration::days(days),
            );
            let longer = Timestamp::from_utc(
                *start.as_datetime() + chrono::Duration::days(days + extra),
            );
            let a = c.correct(1000.0, start, shorter, IndexKind::Selic).unwrap();
            let b = c.correct(1000.0, start, longer, IndexKind::Selic).unwrap();
            proptest::prop_assert!(b.interest_and_fines >= a.interest_and_fines);
        }
    }

    #[test]
    fn index_kind_serde_roundtrip() {
        for index in [IndexKind::Selic, IndexKind::Ipca, IndexKind::Fixed(0.01)] {
            let json = serde_json::to_string(&index).unwrap();
            let back: IndexKind = serde_json::from_str(&json).unwrap();
            assert_eq!(index, back);
        }
    }
}
