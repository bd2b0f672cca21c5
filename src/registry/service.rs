use crate::amortization::schedule::{Schedule, ScheduleEntry};
use crate::amortization::terms::{LoanTerms, TermsError};
use crate::core::loan::{Loan, LoanId, LoanMetadata};
use crate::core::user::UserId;
use crate::registry::store::{InMemoryRegistry, LoanRepository, UserRepository};
use log::{info, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by [`LoanService`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("invalid user id '{0}'")]
    InvalidUserId(String),
    #[error("user {0} not found")]
    UserNotFound(UserId),
    #[error("loan {0} not found")]
    LoanNotFound(LoanId),
    #[error("loan {0} already exists")]
    DuplicateLoan(LoanId),
    #[error(transparent)]
    InvalidTerms(#[from] TermsError),
    #[error("month {month} does not exist in loan {loan}")]
    MonthOutOfRange { loan: LoanId, month: i64 },
}

/// An unvalidated request to open a loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub user_id: String,
    pub amount: Decimal,
    pub annual_interest_rate: Decimal,
    pub loan_term: i64,
}

/// Loan bookkeeping on top of a user and loan repository.
///
/// # Examples
///
/// ```
/// use loan_ledger::registry::service::{LoanRequest, LoanService};
/// use rust_decimal_macros::dec;
///
/// let mut service = LoanService::new();
/// let user = service.create_user();
/// let loan = service
///     .create_loan(&LoanRequest {
///         user_id: user.to_string(),
///         amount: dec!(10_000),
///         annual_interest_rate: dec!(10),
///         loan_term: 10,
///     })
///     .unwrap();
///
/// let summary = service.month_summary(&loan.loan_id, 1).unwrap();
/// assert_eq!(summary.remaining_balance, dec!(9036.93));
/// ```
#[derive(Debug, Clone, Default)]
pub struct LoanService<R = InMemoryRegistry> {
    repository: R,
}

impl LoanService<InMemoryRegistry> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: UserRepository + LoanRepository> LoanService<R> {
    pub fn with_repository(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Register a new user with a generated id.
    pub fn create_user(&mut self) -> UserId {
        let id = UserId::generate();
        self.repository.insert_user(id);
        info!("created user {}", id);
        id
    }

    /// Register a user with a known id. Returns `false` if already known.
    pub fn register_user(&mut self, id: UserId) -> bool {
        let inserted = self.repository.insert_user(id);
        if inserted {
            info!("registered user {}", id);
        }
        inserted
    }

    pub fn users(&self) -> Vec<UserId> {
        self.repository.user_ids()
    }

    /// Validate a request and open a loan with a generated id.
    ///
    /// The owning user is checked before the terms.
    pub fn create_loan(&mut self, request: &LoanRequest) -> Result<LoanMetadata, ServiceError> {
        self.create_loan_with_id(LoanId::generate(), request)
    }

    /// Like [`LoanService::create_loan`] but with a caller-chosen id.
    pub fn create_loan_with_id(
        &mut self,
        id: LoanId,
        request: &LoanRequest,
    ) -> Result<LoanMetadata, ServiceError> {
        let result = self.validate_request(id, request);
        let (owner, terms) = match result {
            Ok(validated) => validated,
            Err(e) => {
                warn!("rejected loan request for user '{}': {}", request.user_id, e);
                return Err(e);
            }
        };

        let loan = Loan::with_id(id, owner, terms);
        let metadata = loan.metadata();
        self.repository.put(loan);
        info!(
            "created loan {} for user {}: {} at {}% over {} months",
            metadata.loan_id,
            metadata.user_id,
            metadata.amount,
            metadata.annual_interest_rate,
            metadata.loan_term
        );
        Ok(metadata)
    }

    fn validate_request(
        &self,
        id: LoanId,
        request: &LoanRequest,
    ) -> Result<(UserId, LoanTerms), ServiceError> {
        let owner: UserId = request
            .user_id
            .parse()
            .map_err(|_| ServiceError::InvalidUserId(request.user_id.clone()))?;
        if !self.repository.contains_user(&owner) {
            return Err(ServiceError::UserNotFound(owner));
        }
        if self.repository.get(&id).is_some() {
            return Err(ServiceError::DuplicateLoan(id));
        }
        let terms = LoanTerms::new(request.amount, request.annual_interest_rate, request.loan_term)?;
        Ok((owner, terms))
    }

    pub fn loan(&self, id: &LoanId) -> Result<&Loan, ServiceError> {
        self.repository
            .get(id)
            .ok_or(ServiceError::LoanNotFound(*id))
    }

    pub fn loan_metadata(&self, id: &LoanId) -> Result<LoanMetadata, ServiceError> {
        self.loan(id).map(Loan::metadata)
    }

    /// Metadata for every loan the user currently owns.
    pub fn loans_for_user(&self, user: &UserId) -> Result<Vec<LoanMetadata>, ServiceError> {
        if !self.repository.contains_user(user) {
            return Err(ServiceError::UserNotFound(*user));
        }
        Ok(self
            .repository
            .list_by_owner(user)
            .into_iter()
            .map(Loan::metadata)
            .collect())
    }

    pub fn schedule(&self, id: &LoanId) -> Result<&Schedule, ServiceError> {
        self.loan(id).map(Loan::schedule)
    }

    pub fn month_summary(&self, id: &LoanId, month: i64) -> Result<&ScheduleEntry, ServiceError> {
        self.loan(id)?
            .month_summary(month)
            .ok_or(ServiceError::MonthOutOfRange { loan: *id, month })
    }

    /// Move a loan to another user. The target user is checked first.
    pub fn transfer_loan(&mut self, id: &LoanId, to: UserId) -> Result<LoanMetadata, ServiceError> {
        if !self.repository.contains_user(&to) {
            warn!("transfer of loan {} rejected: user {} not found", id, to);
            return Err(ServiceError::UserNotFound(to));
        }
        let loan = self
            .repository
            .get_mut(id)
            .ok_or(ServiceError::LoanNotFound(*id))?;
        let from = loan.owner();
        loan.transfer_to(to);
        info!("transferred loan {} from user {} to user {}", id, from, to);
        Ok(loan.metadata())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::payment::MAX_TERM_MONTHS;
    use rust_decimal_macros::dec;

    fn request_for(user: UserId) -> LoanRequest {
        LoanRequest {
            user_id: user.to_string(),
            amount: dec!(10_000),
            annual_interest_rate: dec!(10),
            loan_term: 10,
        }
    }

    #[test]
    fn test_create_loan() {
        let mut service = LoanService::new();
        let user = service.create_user();
        let meta = service.create_loan(&request_for(user)).unwrap();

        assert_eq!(meta.user_id, user);
        assert_eq!(meta.amount, dec!(10_000));
        assert_eq!(service.loan_metadata(&meta.loan_id).unwrap(), meta);
    }

    #[test]
    fn test_create_loan_unknown_user() {
        let mut service = LoanService::new();
        let stranger = UserId::generate();
        assert_eq!(
            service.create_loan(&request_for(stranger)),
            Err(ServiceError::UserNotFound(stranger))
        );
    }

    #[test]
    fn test_create_loan_bad_user_id() {
        let mut service = LoanService::new();
        let mut request = request_for(UserId::generate());
        request.user_id = "nobody".to_string();
        assert_eq!(
            service.create_loan(&request),
            Err(ServiceError::InvalidUserId("nobody".to_string()))
        );
    }

    #[test]
    fn test_user_checked_before_terms() {
        let mut service = LoanService::new();
        let stranger = UserId::generate();
        let mut request = request_for(stranger);
        request.amount = dec!(0);
        assert_eq!(
            service.create_loan(&request),
            Err(ServiceError::UserNotFound(stranger))
        );
    }

    #[test]
    fn test_create_loan_invalid_terms() {
        let mut service = LoanService::new();
        let user = service.create_user();

        let mut request = request_for(user);
        request.loan_term = -1;
        assert_eq!(
            service.create_loan(&request),
            Err(ServiceError::InvalidTerms(TermsError::NonPositiveTerm(-1)))
        );

        let mut request = request_for(user);
        request.annual_interest_rate = dec!(0);
        assert!(matches!(
            service.create_loan(&request),
            Err(ServiceError::InvalidTerms(TermsError::NonPositiveRate(_)))
        ));
        assert!(service.loans_for_user(&user).unwrap().is_empty());
    }

    #[test]
    fn test_create_loan_term_too_long() {
        let mut service = LoanService::new();
        let user = service.create_user();

        let mut request = request_for(user);
        request.loan_term = i64::from(u32::MAX);
        assert_eq!(
            service.create_loan(&request),
            Err(ServiceError::InvalidTerms(TermsError::TermTooLong(
                i64::from(u32::MAX)
            )))
        );

        request.loan_term = i64::from(MAX_TERM_MONTHS);
        let meta = service.create_loan(&request).unwrap();
        assert_eq!(
            service.month_summary(&meta.loan_id, 1200).unwrap().month,
            1200
        );
    }

    #[test]
    fn test_duplicate_loan_id() {
        let mut service = LoanService::new();
        let user = service.create_user();
        let id = LoanId::generate();
        service.create_loan_with_id(id, &request_for(user)).unwrap();
        assert_eq!(
            service.create_loan_with_id(id, &request_for(user)),
            Err(ServiceError::DuplicateLoan(id))
        );
    }

    #[test]
    fn test_month_summary_out_of_range() {
        let mut service = LoanService::new();
        let user = service.create_user();
        let meta = service.create_loan(&request_for(user)).unwrap();

        assert_eq!(
            service.month_summary(&meta.loan_id, 11),
            Err(ServiceError::MonthOutOfRange {
                loan: meta.loan_id,
                month: 11
            })
        );
        assert_eq!(
            service.month_summary(&meta.loan_id, 10).unwrap().month,
            10
        );
    }

    #[test]
    fn test_unknown_loan() {
        let service = LoanService::new();
        let id = LoanId::generate();
        assert_eq!(service.schedule(&id), Err(ServiceError::LoanNotFound(id)));
        assert_eq!(
            service.month_summary(&id, 1),
            Err(ServiceError::LoanNotFound(id))
        );
    }

    #[test]
    fn test_transfer_loan() {
        let mut service = LoanService::new();
        let alice = service.create_user();
        let bob = service.create_user();
        let meta = service.create_loan(&request_for(alice)).unwrap();

        let moved = service.transfer_loan(&meta.loan_id, bob).unwrap();
        assert_eq!(moved.user_id, bob);
        assert!(service.loans_for_user(&alice).unwrap().is_empty());
        assert_eq!(service.loans_for_user(&bob).unwrap(), vec![moved]);
    }

    #[test]
    fn test_transfer_checks_user_first() {
        let mut service = LoanService::new();
        let stranger = UserId::generate();
        let missing = LoanId::generate();
        assert_eq!(
            service.transfer_loan(&missing, stranger),
            Err(ServiceError::UserNotFound(stranger))
        );

        let user = service.create_user();
        assert_eq!(
            service.transfer_loan(&missing, user),
            Err(ServiceError::LoanNotFound(missing))
        );
    }

    #[test]
    fn test_loans_for_unknown_user() {
        let service = LoanService::new();
        let stranger = UserId::generate();
        assert_eq!(
            service.loans_for_user(&stranger),
            Err(ServiceError::UserNotFound(stranger))
        );
    }
}
