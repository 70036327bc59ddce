//! # Domain Identity Newtypes
//!
//! Newtype wrappers for all domain identifiers in the Tributa Stack.
//! These prevent accidental identifier confusion — you cannot pass
//! a `CreditId` where a `DebitId` is expected, so an assignment can
//! never silently swap its two sides.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tax credit available for compensation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CreditId(pub Uuid);

/// Unique identifier for an outstanding tax debit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DebitId(pub Uuid);

/// Unique identifier for a taxpayer (company or individual).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxpayerId(pub Uuid);

/// Unique identifier for one optimization run. Keys the append-only
/// report cache; generated fresh per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptimizationId(pub Uuid);

macro_rules! uuid_id_impl {
    ($ty:ident, $prefix:literal) => {
        impl $ty {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

uuid_id_impl!(CreditId, "credit");
uuid_id_impl!(DebitId, "debit");
uuid_id_impl!(TaxpayerId, "taxpayer");
uuid_id_impl!(OptimizationId, "optimization");
