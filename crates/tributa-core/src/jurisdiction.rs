//! # Jurisdiction Model
//!
//! A jurisdiction is the fiscal authority a credit or debit belongs to:
//! the Union, one of the states, or a municipality. The compensation
//! scorer penalizes cross-jurisdiction pairings, so equality and
//! same-sphere checks live here rather than being re-derived ad hoc.

use serde::{Deserialize, Serialize};

use crate::tax::TaxSphere;

/// A fiscal jurisdiction: sphere plus authority code.
///
/// Codes follow the convention `br` for the Union, `br-sp` for a state,
/// `br-sp-sao-paulo` for a municipality. Comparison for compatibility
/// scoring is exact-code equality; sphere agreement is exposed separately
/// for coarser checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Jurisdiction {
    /// Fiscal sphere of the levying authority.
    pub sphere: TaxSphere,
    /// Authority code (e.g., "br", "br-sp", "br-rj-rio-de-janeiro").
    pub code: String,
}

impl Jurisdiction {
    /// The federal jurisdiction (the Union).
    pub fn federal() -> Self {
        Self {
            sphere: TaxSphere::Federal,
            code: "br".to_string(),
        }
    }

    /// A state jurisdiction from its two-letter code (e.g., "sp").
    pub fn state(uf: &str) -> Self {
        Self {
            sphere: TaxSphere::State,
            code: format!("br-{}", uf.to_lowercase()),
        }
    }

    /// A municipal jurisdiction from state and municipality codes.
    pub fn municipal(uf: &str, municipality: &str) -> Self {
        Self {
            sphere: TaxSphere::Municipal,
            code: format!("br-{}-{}", uf.to_lowercase(), municipality.to_lowercase()),
        }
    }

    /// Whether two jurisdictions are the same authority.
    pub fn same_authority(&self, other: &Jurisdiction) -> bool {
        self.code == other.code
    }

    /// Whether two jurisdictions are in the same fiscal sphere.
    pub fn same_sphere(&self, other: &Jurisdiction) -> bool {
        self.sphere == other.sphere
    }

    /// Root prefix of the code (first segment, e.g., "br").
    pub fn root(&self) -> &str {
        self.code.split('-').next().unwrap_or(&self.code)
    }
}

impl std::fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.sphere, self.code)
    }
}
