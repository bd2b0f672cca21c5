//! loan-ledger CLI
//!
//! Compute amortization schedules and inspect loan books from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Full schedule for a loan
//! loan-ledger schedule --principal 10000 --rate 10 --term 10
//!
//! # A single month, as JSON
//! loan-ledger summary --principal 10000 --rate 10 --term 10 --month 3 --format json
//!
//! # Load a book of users and loans
//! loan-ledger book --input book.json
//!
//! # Generate a random book for testing
//! loan-ledger generate --users 5 --loans 20
//! ```

use loan_ledger::amortization::payment::round_currency;
use loan_ledger::amortization::schedule::AmortizationEngine;
use loan_ledger::amortization::terms::LoanTerms;
use loan_ledger::core::loan::LoanMetadata;
use loan_ledger::registry::book::BookFile;
use loan_ledger::registry::service::LoanService;
use loan_ledger::simulation::loan_book::{generate_random_book, BookConfig};
use rust_decimal::Decimal;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"loan-ledger — loan bookkeeping and amortization schedules

USAGE:
    loan-ledger <COMMAND> [OPTIONS]

COMMANDS:
    schedule    Print the full amortization schedule for a loan
    summary     Print a single month of the schedule
    book        Load a JSON loan book and list every user's loans
    generate    Generate a random loan book (for testing)
    help        Show this message

OPTIONS (schedule, summary):
    --principal <AMOUNT>  Loan amount
    --rate <PERCENT>      Annual interest rate in percent
    --term <MONTHS>       Term in months (1 to 1200)
    --month <N>           Month to show (summary only)
    --format <FORMAT>     Output format: text (default) or json

OPTIONS (book):
    --input <FILE>        Path to JSON book file
    --format <FORMAT>     Output format: text (default) or json

OPTIONS (generate):
    --users <N>           Number of users (default: 10)
    --loans <N>           Number of loans (default: 50)
    --transfers <N>       Number of ownership transfers (default: 5)
    --output <FILE>       Write to file instead of stdout

Set RUST_LOG=debug for diagnostic logging.

EXAMPLES:
    loan-ledger schedule --principal 10000 --rate 10 --term 10
    loan-ledger summary --principal 250000 --rate 5 --term 360 --month 12
    loan-ledger book --input book.json --format json
    loan-ledger generate --users 3 --loans 8 --output book.json"#
    );
}

/// JSON output schema for one loan in a book listing.
#[derive(serde::Serialize)]
struct LoanOutput {
    #[serde(flatten)]
    metadata: LoanMetadata,
    monthly_payment: Decimal,
    total_interest: Decimal,
}

#[derive(serde::Serialize)]
struct UserOutput {
    user_id: String,
    loans: Vec<LoanOutput>,
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}

fn value_after(args: &[String], i: usize, flag: &str, expected: &str) -> String {
    args.get(i)
        .cloned()
        .unwrap_or_else(|| fail(format!("{} requires {}", flag, expected)))
}

fn parse_or_exit<T: std::str::FromStr>(raw: &str, what: &str) -> T
where
    T::Err: std::fmt::Display,
{
    raw.parse()
        .unwrap_or_else(|e| fail(format!("Invalid {} '{}': {}", what, raw, e)))
}

fn parse_format(raw: String) -> String {
    if raw == "text" || raw == "json" {
        raw
    } else {
        fail(format!("--format must be 'text' or 'json', got '{}'", raw))
    }
}

/// Flags shared by `schedule` and `summary`.
struct TermsArgs {
    terms: LoanTerms,
    month: Option<i64>,
    format: String,
}

fn parse_terms_args(args: &[String]) -> TermsArgs {
    let mut principal = None;
    let mut rate = None;
    let mut term = None;
    let mut month = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--principal" => {
                i += 1;
                let raw = value_after(args, i, "--principal", "an amount");
                principal = Some(parse_or_exit::<Decimal>(&raw, "principal"));
            }
            "--rate" => {
                i += 1;
                let raw = value_after(args, i, "--rate", "a percentage");
                rate = Some(parse_or_exit::<Decimal>(&raw, "rate"));
            }
            "--term" => {
                i += 1;
                let raw = value_after(args, i, "--term", "a number of months");
                term = Some(parse_or_exit::<i64>(&raw, "term"));
            }
            "--month" => {
                i += 1;
                let raw = value_after(args, i, "--month", "a month number");
                month = Some(parse_or_exit::<i64>(&raw, "month"));
            }
            "--format" => {
                i += 1;
                format = parse_format(value_after(args, i, "--format", "'text' or 'json'"));
            }
            _ => fail(format!("Unknown option: {}", args[i])),
        }
        i += 1;
    }

    let (principal, rate, term) = match (principal, rate, term) {
        (Some(p), Some(r), Some(t)) => (p, r, t),
        _ => fail("Error: --principal, --rate and --term are required"),
    };

    let terms = LoanTerms::new(principal, rate, term)
        .unwrap_or_else(|e| fail(format!("Invalid loan terms: {}", e)));

    TermsArgs {
        terms,
        month,
        format,
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| fail(format!("Error serializing output: {}", e)))
}

fn cmd_schedule(args: &[String]) {
    let parsed = parse_terms_args(args);
    if parsed.month.is_some() {
        fail("--month is only valid for the summary command");
    }

    let schedule = AmortizationEngine::build_schedule(&parsed.terms);

    if parsed.format == "json" {
        println!("{}", to_json(&schedule));
    } else {
        println!(
            "Installment: {}",
            round_currency(parsed.terms.monthly_payment())
        );
        println!("{}", schedule);
    }
}

fn cmd_summary(args: &[String]) {
    let parsed = parse_terms_args(args);
    let month = parsed
        .month
        .unwrap_or_else(|| fail("Error: --month <N> is required"));

    let schedule = AmortizationEngine::build_schedule(&parsed.terms);
    let entry = AmortizationEngine::month_summary(&schedule, month).unwrap_or_else(|| {
        fail(format!(
            "Month {} does not exist in a {}-month loan",
            month,
            parsed.terms.term_months()
        ))
    });

    if parsed.format == "json" {
        println!("{}", to_json(entry));
    } else {
        println!("Month:                  {}", entry.month);
        println!("Remaining balance:      {}", entry.remaining_balance);
        println!("Monthly payment:        {}", entry.monthly_payment);
        println!("Principal paid to date: {}", entry.aggregate_principal_paid);
        println!("Interest paid to date:  {}", entry.aggregate_interest_paid);
    }
}

fn load_book(path: &str) -> BookFile {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("Error reading file '{}': {}", path, e)));

    serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "users": ["e0e95d7f-cf4b-4ed0-b1d3-ea73d6879be2"],
  "loans": [
    {{ "user_id": "e0e95d7f-cf4b-4ed0-b1d3-ea73d6879be2", "amount": "10000", "annual_interest_rate": "10", "loan_term": 10 }}
  ],
  "transfers": []
}}"#
        );
        process::exit(1);
    })
}

fn cmd_book(args: &[String]) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(value_after(args, i, "--input", "a file path"));
            }
            "--format" => {
                i += 1;
                format = parse_format(value_after(args, i, "--format", "'text' or 'json'"));
            }
            _ => fail(format!("Unknown option: {}", args[i])),
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| fail("Error: --input <FILE> is required"));
    let book = load_book(&path);
    let service = LoanService::from_book(&book)
        .unwrap_or_else(|e| fail(format!("Error loading book '{}': {}", path, e)));

    let mut output = Vec::new();
    for user in service.users() {
        let mut loans = Vec::new();
        for metadata in service.loans_for_user(&user).unwrap_or_default() {
            let Ok(loan) = service.loan(&metadata.loan_id) else {
                continue;
            };
            loans.push(LoanOutput {
                monthly_payment: round_currency(loan.terms().monthly_payment()),
                total_interest: loan.schedule().total_interest(),
                metadata,
            });
        }
        output.push(UserOutput {
            user_id: user.to_string(),
            loans,
        });
    }

    if format == "json" {
        println!("{}", to_json(&output));
        return;
    }

    for user in &output {
        println!("User {}", user.user_id);
        if user.loans.is_empty() {
            println!("  (no loans)");
        }
        for loan in &user.loans {
            let m = &loan.metadata;
            println!(
                "  Loan {}: {} at {}% over {} months, installment {}, total interest {}",
                m.loan_id,
                m.amount,
                m.annual_interest_rate,
                m.loan_term,
                loan.monthly_payment,
                loan.total_interest
            );
        }
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = BookConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--users" => {
                i += 1;
                config.user_count =
                    parse_or_exit(&value_after(args, i, "--users", "a number"), "user count");
            }
            "--loans" => {
                i += 1;
                config.loan_count =
                    parse_or_exit(&value_after(args, i, "--loans", "a number"), "loan count");
            }
            "--transfers" => {
                i += 1;
                config.transfer_count = parse_or_exit(
                    &value_after(args, i, "--transfers", "a number"),
                    "transfer count",
                );
            }
            "--output" => {
                i += 1;
                output_path = Some(value_after(args, i, "--output", "a file path"));
            }
            _ => fail(format!("Unknown option: {}", args[i])),
        }
        i += 1;
    }

    let book = generate_random_book(&config);
    let json = to_json(&book);

    if let Some(path) = output_path {
        fs::write(&path, &json)
            .unwrap_or_else(|e| fail(format!("Error writing to '{}': {}", path, e)));
        eprintln!(
            "Generated {} loans across {} users → {}",
            book.loans.len(),
            book.users.len(),
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "schedule" => cmd_schedule(rest),
        "summary" => cmd_summary(rest),
        "book" => cmd_book(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
