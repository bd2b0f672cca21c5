use crate::amortization::payment::{compute_monthly_payment, monthly_rate, MAX_TERM_MONTHS};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors arising from invalid loan terms.
///
/// Terms are checked before any arithmetic runs, so a bad input is always
/// reported here rather than surfacing as a division by zero or a panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TermsError {
    #[error("loan amount must be a positive number, got {0}")]
    NonPositivePrincipal(Decimal),
    #[error("interest rate must be a positive number, got {0}")]
    NonPositiveRate(Decimal),
    #[error("loan term must be a positive number of months, got {0}")]
    NonPositiveTerm(i64),
    #[error("loan term of {0} months exceeds the maximum of {max}", max = MAX_TERM_MONTHS)]
    TermTooLong(i64),
    #[error("loan terms exceed the representable decimal range")]
    Overflow,
}

/// The three numeric parameters of a fixed-rate, fully amortizing loan.
///
/// `LoanTerms` can only be obtained through validation, and the flat
/// monthly installment is computed once at that point. Terms are immutable
/// afterwards, which is what lets a loan cache its schedule forever.
///
/// # Examples
///
/// ```
/// use loan_ledger::amortization::terms::LoanTerms;
/// use rust_decimal_macros::dec;
///
/// let terms = LoanTerms::new(dec!(10_000), dec!(10), 10).unwrap();
/// assert_eq!(terms.term_months(), 10);
/// assert!(LoanTerms::new(dec!(0), dec!(10), 10).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TermsRecord", into = "TermsRecord")]
pub struct LoanTerms {
    principal: Decimal,
    annual_rate_percent: Decimal,
    term_months: u32,
    monthly_payment: Decimal,
}

/// Wire shape of [`LoanTerms`]; deserialization goes through validation.
#[derive(Serialize, Deserialize)]
struct TermsRecord {
    principal: Decimal,
    annual_rate_percent: Decimal,
    term_months: i64,
}

impl LoanTerms {
    /// Validate the terms and compute their installment.
    ///
    /// `term_months` is signed so that negative terms coming from callers
    /// are rejected with a typed error instead of wrapping.
    pub fn new(
        principal: Decimal,
        annual_rate_percent: Decimal,
        term_months: i64,
    ) -> Result<Self, TermsError> {
        let monthly_payment = compute_monthly_payment(principal, annual_rate_percent, term_months)?;
        let term_months =
            u32::try_from(term_months).map_err(|_| TermsError::TermTooLong(term_months))?;

        // The running totals of a schedule never exceed installment * term.
        monthly_payment
            .checked_mul(Decimal::from(term_months))
            .ok_or(TermsError::Overflow)?;

        Ok(Self {
            principal,
            annual_rate_percent,
            term_months,
            monthly_payment,
        })
    }

    pub fn principal(&self) -> Decimal {
        self.principal
    }

    pub fn annual_rate_percent(&self) -> Decimal {
        self.annual_rate_percent
    }

    pub fn term_months(&self) -> u32 {
        self.term_months
    }

    /// Periodic rate as a fraction, e.g. `0.0083…` for 10% a year.
    pub fn monthly_rate(&self) -> Decimal {
        monthly_rate(self.annual_rate_percent)
    }

    /// The unrounded flat installment.
    pub fn monthly_payment(&self) -> Decimal {
        self.monthly_payment
    }
}

impl TryFrom<TermsRecord> for LoanTerms {
    type Error = TermsError;

    fn try_from(record: TermsRecord) -> Result<Self, Self::Error> {
        Self::new(record.principal, record.annual_rate_percent, record.term_months)
    }
}

impl From<LoanTerms> for TermsRecord {
    fn from(terms: LoanTerms) -> Self {
        Self {
            principal: terms.principal,
            annual_rate_percent: terms.annual_rate_percent,
            term_months: i64::from(terms.term_months),
        }
    }
}
