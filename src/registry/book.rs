use crate::amortization::terms::LoanTerms;
use crate::core::loan::{LoanId, LoanMetadata};
use crate::core::user::UserId;
use crate::registry::service::{LoanRequest, LoanService, ServiceError};
use crate::registry::store::{InMemoryRegistry, LoanRepository, UserRepository};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A loan entry in a book file. Without an `id` one is generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLoan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<LoanId>,
    #[serde(flatten)]
    pub request: LoanRequest,
}

/// An ownership transfer applied after all loans are created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookTransfer {
    pub loan_id: LoanId,
    pub user_id: UserId,
}

/// JSON schema for a serialized loan book.
///
/// ```json
/// {
///   "users": ["e0e95d7f-cf4b-4ed0-b1d3-ea73d6879be2"],
///   "loans": [
///     { "user_id": "e0e95d7f-cf4b-4ed0-b1d3-ea73d6879be2",
///       "amount": "10000", "annual_interest_rate": "10", "loan_term": 10 }
///   ],
///   "transfers": []
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookFile {
    #[serde(default)]
    pub users: Vec<UserId>,
    #[serde(default)]
    pub loans: Vec<BookLoan>,
    #[serde(default)]
    pub transfers: Vec<BookTransfer>,
}

impl<R: UserRepository + LoanRepository> LoanService<R> {
    /// Replay a book into this service: users, then loans, then transfers.
    ///
    /// The whole book is checked first; if any entry would be rejected the
    /// service is left untouched and that entry's error is returned.
    pub fn apply_book(&mut self, book: &BookFile) -> Result<Vec<LoanMetadata>, ServiceError> {
        self.check_book(book)?;

        for user in &book.users {
            self.register_user(*user);
        }

        let mut created = Vec::with_capacity(book.loans.len());
        for loan in &book.loans {
            let id = loan.id.unwrap_or_else(LoanId::generate);
            created.push(self.create_loan_with_id(id, &loan.request)?);
        }

        for transfer in &book.transfers {
            self.transfer_loan(&transfer.loan_id, transfer.user_id)?;
        }

        Ok(created)
    }

    /// Run every check `apply_book` would, against this service plus the
    /// entries earlier in the book, without changing anything.
    pub fn check_book(&self, book: &BookFile) -> Result<(), ServiceError> {
        let repository = self.repository();
        let book_users: HashSet<&UserId> = book.users.iter().collect();
        let known_user = |id: &UserId| book_users.contains(id) || repository.contains_user(id);

        let mut book_loans: HashSet<LoanId> = HashSet::new();
        for loan in &book.loans {
            let request = &loan.request;
            let owner: UserId = request
                .user_id
                .parse()
                .map_err(|_| ServiceError::InvalidUserId(request.user_id.clone()))?;
            if !known_user(&owner) {
                return Err(ServiceError::UserNotFound(owner));
            }
            if let Some(id) = loan.id {
                if repository.get(&id).is_some() || !book_loans.insert(id) {
                    return Err(ServiceError::DuplicateLoan(id));
                }
            }
            LoanTerms::new(request.amount, request.annual_interest_rate, request.loan_term)?;
        }

        for transfer in &book.transfers {
            if !known_user(&transfer.user_id) {
                return Err(ServiceError::UserNotFound(transfer.user_id));
            }
            let loan_id = transfer.loan_id;
            if !book_loans.contains(&loan_id) && repository.get(&loan_id).is_none() {
                return Err(ServiceError::LoanNotFound(loan_id));
            }
        }
        Ok(())
    }
}

impl LoanService<InMemoryRegistry> {
    /// Build an in-memory service from a book.
    pub fn from_book(book: &BookFile) -> Result<Self, ServiceError> {
        let mut service = Self::new();
        service.apply_book(book)?;
        Ok(service)
    }
}
