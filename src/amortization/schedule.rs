use crate::amortization::payment::apply_one_payment;
use crate::amortization::terms::LoanTerms;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One month of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// 1-based month number.
    pub month: u32,
    /// Balance left after this month's payment. May end at `-0.01` or so
    /// in the final month because of per-step rounding.
    pub remaining_balance: Decimal,
    /// Rounded principal portion plus rounded interest portion.
    pub monthly_payment: Decimal,
    pub aggregate_principal_paid: Decimal,
    pub aggregate_interest_paid: Decimal,
}

/// Month-by-month repayment plan for one set of [`LoanTerms`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    entries: Vec<ScheduleEntry>,
}

impl Schedule {
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for a 1-based `month`, or `None` outside `[1, term]`.
    pub fn month(&self, month: i64) -> Option<&ScheduleEntry> {
        let index = usize::try_from(month.checked_sub(1)?).ok()?;
        self.entries.get(index)
    }

    pub fn final_entry(&self) -> Option<&ScheduleEntry> {
        self.entries.last()
    }

    /// Sum of every monthly payment.
    pub fn total_paid(&self) -> Decimal {
        self.entries.iter().map(|e| e.monthly_payment).sum()
    }

    /// Interest paid over the life of the loan.
    pub fn total_interest(&self) -> Decimal {
        self.final_entry()
            .map(|e| e.aggregate_interest_paid)
            .unwrap_or(Decimal::ZERO)
    }
}

/// The amortization engine.
///
/// Turns validated [`LoanTerms`] into a deterministic schedule and answers
/// point queries against it. Caching belongs to the owning loan record;
/// the engine itself holds no state.
pub struct AmortizationEngine;

impl AmortizationEngine {
    /// Build the full schedule for `terms`.
    ///
    /// # Algorithm
    ///
    /// 1. Start with the balance at the principal and no interest paid.
    /// 2. For each month, apply one installment with per-step rounding.
    /// 3. Aggregate principal is `principal - balance`; aggregate interest
    ///    is the running sum of rounded interest portions.
    ///
    /// Exactly `term_months` entries are produced. The loop does not stop
    /// early when the balance touches zero, so the final balance carries
    /// whatever rounding drift accumulated.
    pub fn build_schedule(terms: &LoanTerms) -> Schedule {
        let principal = terms.principal();
        let rate = terms.monthly_rate();
        let payment = terms.monthly_payment();

        let mut remaining = principal;
        let mut aggregate_interest = Decimal::ZERO;
        let mut entries = Vec::with_capacity(terms.term_months() as usize);

        for month in 1..=terms.term_months() {
            let step = apply_one_payment(remaining, rate, payment);
            remaining = step.remaining_balance;
            aggregate_interest += step.interest_portion;

            entries.push(ScheduleEntry {
                month,
                remaining_balance: remaining,
                monthly_payment: step.principal_portion + step.interest_portion,
                aggregate_principal_paid: principal - remaining,
                aggregate_interest_paid: aggregate_interest,
            });
        }

        debug!(
            "built {}-month schedule for principal {} at {}%: final balance {}",
            entries.len(),
            principal,
            terms.annual_rate_percent(),
            remaining
        );

        Schedule { entries }
    }

    /// Look up a single month. Out-of-range months are an expected query
    /// outcome and yield `None`.
    pub fn month_summary(schedule: &Schedule, month: i64) -> Option<&ScheduleEntry> {
        schedule.month(month)
    }
}

impl std::fmt::Display for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Amortization Schedule ===")?;
        writeln!(
            f,
            "{:>5}  {:>14}  {:>12}  {:>16}  {:>15}",
            "Month", "Balance", "Payment", "Principal Paid", "Interest Paid"
        )?;
        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }
        writeln!(f, "\nTotal Paid:     {}", self.total_paid())?;
        writeln!(f, "Total Interest: {}", self.total_interest())?;
        Ok(())
    }
}

impl std::fmt::Display for ScheduleEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:>5}  {:>14}  {:>12}  {:>16}  {:>15}",
            self.month,
            self.remaining_balance,
            self.monthly_payment,
            self.aggregate_principal_paid,
            self.aggregate_interest_paid
        )
    }
}
