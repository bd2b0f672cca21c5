use crate::amortization::schedule::{AmortizationEngine, Schedule, ScheduleEntry};
use crate::amortization::terms::LoanTerms;
use crate::core::user::UserId;
use chrono::{DateTime, Utc};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use uuid::Uuid;

/// Unique identifier for a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(Uuid);

impl LoanId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for LoanId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for LoanId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Flat view of a loan's identity and terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanMetadata {
    pub loan_id: LoanId,
    pub user_id: UserId,
    pub amount: Decimal,
    pub annual_interest_rate: Decimal,
    pub loan_term: u32,
}

/// A loan record: owner, immutable terms, and the lazily built schedule.
///
/// The schedule is computed on first access and kept for the lifetime of
/// the record. Ownership can change; terms cannot, so the cached schedule
/// never goes stale.
///
/// # Examples
///
/// ```
/// use loan_ledger::amortization::terms::LoanTerms;
/// use loan_ledger::core::loan::Loan;
/// use loan_ledger::core::user::UserId;
/// use rust_decimal_macros::dec;
///
/// let terms = LoanTerms::new(dec!(10_000), dec!(10), 10).unwrap();
/// let loan = Loan::new(UserId::generate(), terms);
///
/// assert!(!loan.is_schedule_cached());
/// let month_one = loan.month_summary(1).unwrap();
/// assert_eq!(month_one.aggregate_interest_paid, dec!(83.33));
/// assert!(loan.is_schedule_cached());
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Loan {
    id: LoanId,
    owner: UserId,
    terms: LoanTerms,
    created_at: DateTime<Utc>,
    #[serde(skip)]
    schedule: OnceLock<Schedule>,
}

impl Loan {
    /// Create a loan with a freshly generated id.
    pub fn new(owner: UserId, terms: LoanTerms) -> Self {
        Self::with_id(LoanId::generate(), owner, terms)
    }

    /// Create a loan with a specific id (seed files, determinism in tests).
    pub fn with_id(id: LoanId, owner: UserId, terms: LoanTerms) -> Self {
        Self {
            id,
            owner,
            terms,
            created_at: Utc::now(),
            schedule: OnceLock::new(),
        }
    }

    pub fn id(&self) -> LoanId {
        self.id
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The full schedule, built at most once per record.
    pub fn schedule(&self) -> &Schedule {
        if let Some(schedule) = self.schedule.get() {
            debug!("schedule cache hit for loan {}", self.id);
            return schedule;
        }
        self.schedule
            .get_or_init(|| AmortizationEngine::build_schedule(&self.terms))
    }

    pub fn is_schedule_cached(&self) -> bool {
        self.schedule.get().is_some()
    }

    /// Summary for a 1-based month; builds the schedule first if needed.
    pub fn month_summary(&self, month: i64) -> Option<&ScheduleEntry> {
        AmortizationEngine::month_summary(self.schedule(), month)
    }

    /// Hand the loan to another user. Terms and schedule are untouched.
    pub fn transfer_to(&mut self, owner: UserId) {
        self.owner = owner;
    }

    pub fn metadata(&self) -> LoanMetadata {
        LoanMetadata {
            loan_id: self.id,
            user_id: self.owner,
            amount: self.terms.principal(),
            annual_interest_rate: self.terms.annual_rate_percent(),
            loan_term: self.terms.term_months(),
        }
    }
}
