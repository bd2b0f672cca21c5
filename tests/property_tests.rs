use loan_ledger::amortization::schedule::AmortizationEngine;
use loan_ledger::amortization::terms::LoanTerms;
use loan_ledger::core::loan::Loan;
use loan_ledger::core::user::UserId;
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Principal between 100.00 and 1,000,000.00.
fn arb_principal() -> impl Strategy<Value = Decimal> {
    (10_000i64..=100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Annual rate between 0.10% and 12.00%.
fn arb_rate() -> impl Strategy<Value = Decimal> {
    (10i64..=1_200i64).prop_map(|bps| Decimal::new(bps, 2))
}

/// Term between one month and thirty years.
fn arb_term() -> impl Strategy<Value = i64> {
    1i64..=360i64
}

fn arb_terms() -> impl Strategy<Value = LoanTerms> {
    (arb_principal(), arb_rate(), arb_term())
        .prop_map(|(p, r, n)| LoanTerms::new(p, r, n).expect("generated terms are valid"))
}

/// Accumulated rounding allowance: one cent per period.
fn tolerance(terms: &LoanTerms) -> Decimal {
    Decimal::new(i64::from(terms.term_months()), 2)
}

proptest! {
    // ===================================================================
    // One entry per month, numbered 1..=term.
    // ===================================================================
    #[test]
    fn schedule_has_one_entry_per_month(terms in arb_terms()) {
        let schedule = AmortizationEngine::build_schedule(&terms);
        prop_assert_eq!(schedule.len(), terms.term_months() as usize);
        for (i, entry) in schedule.entries().iter().enumerate() {
            prop_assert_eq!(entry.month as usize, i + 1);
        }
    }

    // ===================================================================
    // Principal paid never goes backwards.
    // ===================================================================
    #[test]
    fn aggregate_principal_is_non_decreasing(terms in arb_terms()) {
        let schedule = AmortizationEngine::build_schedule(&terms);
        for pair in schedule.entries().windows(2) {
            prop_assert!(
                pair[1].aggregate_principal_paid >= pair[0].aggregate_principal_paid,
                "month {} principal {} < month {} principal {}",
                pair[1].month,
                pair[1].aggregate_principal_paid,
                pair[0].month,
                pair[0].aggregate_principal_paid
            );
        }
    }

    // ===================================================================
    // The loan is repaid to within the rounding allowance.
    // ===================================================================
    #[test]
    fn final_principal_matches_loan(terms in arb_terms()) {
        let schedule = AmortizationEngine::build_schedule(&terms);
        let last = schedule.final_entry().unwrap();
        let drift = (last.aggregate_principal_paid - terms.principal()).abs();
        prop_assert!(
            drift <= tolerance(&terms),
            "drift {} exceeds {}",
            drift,
            tolerance(&terms)
        );
    }

    // ===================================================================
    // Everything paid is principal plus interest.
    // ===================================================================
    #[test]
    fn payments_reconcile_with_principal_and_interest(terms in arb_terms()) {
        let schedule = AmortizationEngine::build_schedule(&terms);
        let expected = terms.principal() + schedule.total_interest();
        let gap = (schedule.total_paid() - expected).abs();
        prop_assert!(gap <= tolerance(&terms), "gap {} exceeds {}", gap, tolerance(&terms));
    }

    // ===================================================================
    // Month lookups are bounded to [1, term].
    // ===================================================================
    #[test]
    fn month_summary_is_bounded(terms in arb_terms()) {
        let schedule = AmortizationEngine::build_schedule(&terms);
        let term = i64::from(terms.term_months());

        prop_assert!(AmortizationEngine::month_summary(&schedule, 0).is_none());
        prop_assert!(AmortizationEngine::month_summary(&schedule, term + 1).is_none());
        for month in 1..=term {
            let entry = AmortizationEngine::month_summary(&schedule, month);
            prop_assert_eq!(entry.map(|e| i64::from(e.month)), Some(month));
        }
    }

    // ===================================================================
    // Same terms, same schedule; the cached copy matches a fresh build.
    // ===================================================================
    #[test]
    fn schedule_is_deterministic(terms in arb_terms()) {
        let first = AmortizationEngine::build_schedule(&terms);
        let second = AmortizationEngine::build_schedule(&terms);
        prop_assert_eq!(&first, &second);

        let loan = Loan::new(UserId::generate(), terms);
        prop_assert_eq!(loan.schedule(), &first);
    }

    // ===================================================================
    // Every amount is carried at currency precision.
    // ===================================================================
    #[test]
    fn amounts_are_rounded_to_cents(terms in arb_terms()) {
        let schedule = AmortizationEngine::build_schedule(&terms);
        for entry in schedule.entries() {
            prop_assert_eq!(entry.remaining_balance, entry.remaining_balance.round_dp(2));
            prop_assert_eq!(entry.monthly_payment, entry.monthly_payment.round_dp(2));
            prop_assert_eq!(entry.aggregate_interest_paid, entry.aggregate_interest_paid.round_dp(2));
        }
    }
}
