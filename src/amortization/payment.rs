use crate::amortization::terms::TermsError;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

/// Decimal places kept for every currency amount.
pub const CURRENCY_SCALE: u32 = 2;

/// Periodic rates below this are treated as interest-free.
///
/// The installment formula has a removable singularity at a zero rate;
/// its limit is straight-line repayment of `principal / term`.
pub const RATE_EPSILON: Decimal = dec!(0.000000001);

/// Longest supported term: 100 years of monthly installments.
pub const MAX_TERM_MONTHS: u32 = 1200;

const PERCENT: Decimal = dec!(100);
const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Outcome of applying one installment to a balance.
///
/// All three amounts are already rounded to [`CURRENCY_SCALE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentStep {
    pub remaining_balance: Decimal,
    pub principal_portion: Decimal,
    pub interest_portion: Decimal,
}

/// Round an amount to currency precision (banker's rounding).
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp(CURRENCY_SCALE)
}

/// Convert an annual percentage into a monthly fraction.
pub fn monthly_rate(annual_rate_percent: Decimal) -> Decimal {
    annual_rate_percent / PERCENT / MONTHS_PER_YEAR
}

pub(crate) fn validate(
    principal: Decimal,
    annual_rate_percent: Decimal,
    term_months: i64,
) -> Result<(), TermsError> {
    if principal <= Decimal::ZERO {
        return Err(TermsError::NonPositivePrincipal(principal));
    }
    if annual_rate_percent <= Decimal::ZERO {
        return Err(TermsError::NonPositiveRate(annual_rate_percent));
    }
    if term_months < 1 {
        return Err(TermsError::NonPositiveTerm(term_months));
    }
    if term_months > i64::from(MAX_TERM_MONTHS) {
        return Err(TermsError::TermTooLong(term_months));
    }
    Ok(())
}

/// Compute the flat installment of a fully amortizing loan.
///
/// `payment = principal * r / (1 - (1 + r)^-n)` with `r` the monthly rate.
/// The result is not rounded; rounding happens per step while the
/// schedule is built.
///
/// # Examples
///
/// ```
/// use loan_ledger::amortization::payment::compute_monthly_payment;
/// use rust_decimal_macros::dec;
///
/// let payment = compute_monthly_payment(dec!(10_000), dec!(10), 10).unwrap();
/// assert_eq!(payment.round_dp(2), dec!(1046.40));
/// ```
pub fn compute_monthly_payment(
    principal: Decimal,
    annual_rate_percent: Decimal,
    term_months: i64,
) -> Result<Decimal, TermsError> {
    validate(principal, annual_rate_percent, term_months)?;

    let rate = monthly_rate(annual_rate_percent);
    let periods = Decimal::from(term_months);

    if rate < RATE_EPSILON {
        return Ok(principal / periods);
    }

    // A growth factor past the decimal range discounts to zero.
    let discount = match (Decimal::ONE + rate).checked_powu(term_months.unsigned_abs()) {
        Some(growth) => Decimal::ONE / growth,
        None => Decimal::ZERO,
    };

    principal
        .checked_mul(rate)
        .and_then(|interest| interest.checked_div(Decimal::ONE - discount))
        .ok_or(TermsError::Overflow)
}

/// Apply a single installment to `remaining_balance`.
///
/// Interest accrues on the balance carried in, the rest of the payment
/// reduces principal. Each component is rounded immediately, so the next
/// period compounds on the rounded balance.
pub fn apply_one_payment(
    remaining_balance: Decimal,
    monthly_rate: Decimal,
    monthly_payment: Decimal,
) -> PaymentStep {
    let interest = remaining_balance * monthly_rate;
    let principal = monthly_payment - interest;
    let balance = remaining_balance - principal;

    PaymentStep {
        remaining_balance: round_currency(balance),
        principal_portion: round_currency(principal),
        interest_portion: round_currency(interest),
    }
}
