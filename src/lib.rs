//! # loan-ledger
//!
//! Loan bookkeeping with a deterministic fixed-rate amortization engine.
//!
//! Users own loans; each loan carries a principal, an annual rate and a
//! term in months. The engine turns those three numbers into a
//! month-by-month schedule, rounding every step to the cent so that
//! results reproduce exactly across runs.
//!
//! ## Architecture
//!
//! - **amortization** — Loan terms, installment math, schedule building
//! - **core** — Identifiers and the loan record that caches its schedule
//! - **registry** — Repository traits, in-memory store, loan service, book files
//! - **simulation** — Random loan-book generation

pub mod amortization;
pub mod core;
pub mod registry;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::amortization::schedule::{AmortizationEngine, Schedule, ScheduleEntry};
    pub use crate::amortization::terms::{LoanTerms, TermsError};
    pub use crate::core::loan::{Loan, LoanId, LoanMetadata};
    pub use crate::core::user::UserId;
    pub use crate::registry::book::BookFile;
    pub use crate::registry::service::{LoanRequest, LoanService, ServiceError};
    pub use crate::registry::store::{InMemoryRegistry, LoanRepository, UserRepository};
}
