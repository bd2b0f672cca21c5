//! Reference amortization walk-through.
//!
//! Opens a 10,000 loan at 10% over 10 months, prints its schedule, then
//! transfers it to a second user and shows that the cached schedule is
//! reused.

use loan_ledger::prelude::*;
use rust_decimal_macros::dec;

fn main() {
    println!("━━━ Reference Loan ━━━\n");

    let mut service = LoanService::new();
    let alice = service.create_user();
    let bob = service.create_user();

    let loan = service
        .create_loan(&LoanRequest {
            user_id: alice.to_string(),
            amount: dec!(10_000),
            annual_interest_rate: dec!(10),
            loan_term: 10,
        })
        .expect("reference terms are valid");

    let schedule = service.schedule(&loan.loan_id).expect("loan was just created");
    println!("{}", schedule);

    println!("━━━ Month 3 ━━━\n");
    let month = service
        .month_summary(&loan.loan_id, 3)
        .expect("month 3 is within the term");
    println!("{}\n", month);

    println!("━━━ Transfer ━━━\n");
    service
        .transfer_loan(&loan.loan_id, bob)
        .expect("both user and loan exist");
    let cached = service
        .loan(&loan.loan_id)
        .map(Loan::is_schedule_cached)
        .unwrap_or(false);
    let owned = |user: &UserId| service.loans_for_user(user).map(|l| l.len()).unwrap_or(0);
    println!("Alice now owns {} loans", owned(&alice));
    println!("Bob now owns   {} loans", owned(&bob));
    println!("Schedule still cached after transfer: {}", cached);

    match service.month_summary(&loan.loan_id, 11) {
        Ok(entry) => println!("Unexpected month 11: {}", entry),
        Err(e) => println!("Month 11 lookup: {}", e),
    }
}
