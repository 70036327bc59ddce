//! # Tax Kinds and Fiscal Spheres
//!
//! Exhaustive enumeration of the Brazilian tax kinds handled by the
//! compensation engine, and the fiscal sphere (federal, state, municipal)
//! each one belongs to.
//!
//! ## Invariants
//!
//! - One definition of the tax universe. Rate tables and the
//!   compatibility scorer `match` on [`TaxKind`] exhaustively — adding a
//!   kind is a compile error until every consumer handles it.
//! - Cross-sphere compensation is legally restricted; `sphere()` is the
//!   basis for the jurisdiction sub-score.

use serde::{Deserialize, Serialize};

/// Fiscal sphere a tax is levied in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxSphere {
    /// Union-level taxes (IPI, PIS, COFINS, IRPJ, CSLL).
    Federal,
    /// State-level taxes (ICMS).
    State,
    /// Municipal taxes (ISS).
    Municipal,
}

impl std::fmt::Display for TaxSphere {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Federal => write!(f, "federal"),
            Self::State => write!(f, "state"),
            Self::Municipal => write!(f, "municipal"),
        }
    }
}

/// Exhaustive enumeration of tax kinds eligible for credit/debit
/// compensation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TaxKind {
    /// State VAT on goods and some services.
    Icms,
    /// Federal excise tax on industrialized products.
    Ipi,
    /// Federal social contribution on gross revenue (PIS/PASEP).
    Pis,
    /// Federal social contribution for social security financing.
    Cofins,
    /// Federal corporate income tax.
    Irpj,
    /// Federal social contribution on net profit.
    Csll,
    /// Municipal tax on services.
    Iss,
}

impl TaxKind {
    /// All tax kinds, in canonical order.
    pub fn all() -> &'static [TaxKind] {
        &[
            Self::Icms,
            Self::Ipi,
            Self::Pis,
            Self::Cofins,
            Self::Irpj,
            Self::Csll,
            Self::Iss,
        ]
    }

    /// The fiscal sphere this tax is levied in.
    pub fn sphere(self) -> TaxSphere {
        match self {
            Self::Icms => TaxSphere::State,
            Self::Iss => TaxSphere::Municipal,
            Self::Ipi | Self::Pis | Self::Cofins | Self::Irpj | Self::Csll => TaxSphere::Federal,
        }
    }

    /// Canonical snake_case name, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Icms => "icms",
            Self::Ipi => "ipi",
            Self::Pis => "pis",
            Self::Cofins => "cofins",
            Self::Irpj => "irpj",
            Self::Csll => "csll",
            Self::Iss => "iss",
        }
    }
}

impl std::fmt::Display for TaxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_covers_every_kind() {
        // 7 kinds; `all()` must list each exactly once.
        let kinds = TaxKind::all();
        assert_eq!(kinds.len(), 7);
        let unique: std::collections::BTreeSet<_> = kinds.iter().collect();
        assert_eq!(unique.len(), kinds.len());
    }

    #[test]
    fn sphere_classification() {
        assert_eq!(TaxKind::Icms.sphere(), TaxSphere::State);
        assert_eq!(TaxKind::Iss.sphere(), TaxSphere::Municipal);
        for kind in [
            TaxKind::Ipi,
            TaxKind::Pis,
            TaxKind::Cofins,
            TaxKind::Irpj,
            TaxKind::Csll,
        ] {
            assert_eq!(kind.sphere(), TaxSphere::Federal, "{kind} should be federal");
        }
    }

    #[test]
    fn display_matches_serde_representation() {
        for &kind in TaxKind::all() {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }

    #[test]
    fn serde_roundtrip() {
        for &kind in TaxKind::all() {
            let json = serde_json::to_string(&kind).unwrap();
            let back: TaxKind = serde_json::from_str(&json).unwrap();
            assert_eq!(kind, back);
        }
    }

    #[test]
    fn sphere_display() {
        assert_eq!(TaxSphere::Federal.to_string(), "federal");
        assert_eq!(TaxSphere::State.to_string(), "state");
        assert_eq!(TaxSphere::Municipal.to_string(), "municipal");
    }
}
