//! # tributa-core — Foundational Types for the Tributa Stack
//!
//! This crate is the bedrock of the Tributa Stack. It defines the core
//! type-system primitives shared by the fiscal services and the
//! compensation optimizer. Every other crate in the workspace depends on
//! `tributa-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `CreditId`, `DebitId`,
//!    `TaxpayerId`, `OptimizationId` — all newtypes over `Uuid`. No bare
//!    strings for identifiers: you cannot pass a credit identifier where a
//!    debit identifier is expected.
//!
//! 2. **Single `TaxKind` enum.** One definition of the tax universe,
//!    exhaustive `match` everywhere. Adding a tax kind forces every
//!    consumer (rate tables, compatibility scoring) to handle it.
//!
//! 3. **UTC-only timestamps.** The `Timestamp` type enforces UTC with Z
//!    suffix and seconds precision. Maturity/due-date ordering is the
//!    basis of time-compatibility scoring and must be unambiguous.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `tributa-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement `Serialize`/`Deserialize`.

pub mod error;
pub mod identity;
pub mod jurisdiction;
pub mod tax;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use error::TributaError;
pub use identity::{CreditId, DebitId, OptimizationId, TaxpayerId};
pub use jurisdiction::Jurisdiction;
pub use tax::{TaxKind, TaxSphere};
pub use temporal::Timestamp;
