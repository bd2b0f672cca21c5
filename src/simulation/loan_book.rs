//! Random loan-book generation.
//!
//! Produces plausible books of users and loans for benchmarks, the
//! `generate` CLI command, and load testing of the amortization engine.

use crate::amortization::terms::LoanTerms;
use crate::core::loan::LoanId;
use crate::core::user::UserId;
use crate::registry::book::{BookFile, BookLoan, BookTransfer};
use crate::registry::service::LoanRequest;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Configuration for generating a random loan book.
#[derive(Debug, Clone)]
pub struct BookConfig {
    /// Number of users in the book.
    pub user_count: usize,
    /// Number of loans spread across those users.
    pub loan_count: usize,
    /// Number of ownership transfers applied after creation.
    pub transfer_count: usize,
    pub min_principal: Decimal,
    pub max_principal: Decimal,
    /// Annual rate bounds, in percent.
    pub min_rate: Decimal,
    pub max_rate: Decimal,
    /// Term bounds, in months.
    pub min_term: u32,
    pub max_term: u32,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            user_count: 10,
            loan_count: 50,
            transfer_count: 5,
            min_principal: Decimal::from(1_000),
            max_principal: Decimal::from(500_000),
            min_rate: Decimal::ONE,
            max_rate: Decimal::from(15),
            min_term: 12,
            max_term: 360,
        }
    }
}

/// Draw a value with `scale` decimal places from `[min, max]`.
fn random_decimal<R: Rng>(rng: &mut R, min: Decimal, max: Decimal, scale: u32) -> Decimal {
    let factor = Decimal::from(10u64.pow(scale));
    let lo = (min * factor).ceil().to_i64().unwrap_or(0);
    let hi = (max * factor).floor().to_i64().unwrap_or(lo).max(lo);
    Decimal::new(rng.gen_range(lo..=hi), scale)
}

fn random_terms<R: Rng>(rng: &mut R, config: &BookConfig) -> Option<LoanTerms> {
    let principal = random_decimal(rng, config.min_principal, config.max_principal, 2);
    let rate = random_decimal(rng, config.min_rate, config.max_rate, 2);
    let term = rng.gen_range(config.min_term..=config.max_term.max(config.min_term));
    LoanTerms::new(principal, rate, i64::from(term)).ok()
}

/// Generate `loan_count` random, valid loan terms.
///
/// Draws that fail validation (e.g. a zero lower bound) are skipped, so
/// the result can be shorter than requested.
pub fn generate_random_terms(config: &BookConfig) -> Vec<LoanTerms> {
    let mut rng = rand::thread_rng();
    (0..config.loan_count)
        .filter_map(|_| random_terms(&mut rng, config))
        .collect()
}

/// Generate a random book of users, loans and transfers.
pub fn generate_random_book(config: &BookConfig) -> BookFile {
    let mut rng = rand::thread_rng();

    let users: Vec<UserId> = (0..config.user_count.max(1))
        .map(|_| UserId::generate())
        .collect();

    let mut loans = Vec::with_capacity(config.loan_count);
    for _ in 0..config.loan_count {
        let Some(terms) = random_terms(&mut rng, config) else {
            continue;
        };
        let owner = users[rng.gen_range(0..users.len())];
        loans.push(BookLoan {
            id: Some(LoanId::generate()),
            request: LoanRequest {
                user_id: owner.to_string(),
                amount: terms.principal(),
                annual_interest_rate: terms.annual_rate_percent(),
                loan_term: i64::from(terms.term_months()),
            },
        });
    }

    let mut transfers = Vec::new();
    if !loans.is_empty() {
        for _ in 0..config.transfer_count {
            let loan = &loans[rng.gen_range(0..loans.len())];
            if let Some(loan_id) = loan.id {
                transfers.push(BookTransfer {
                    loan_id,
                    user_id: users[rng.gen_range(0..users.len())],
                });
            }
        }
    }

    BookFile {
        users,
        loans,
        transfers,
    }
}
