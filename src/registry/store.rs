use crate::core::loan::{Loan, LoanId};
use crate::core::user::UserId;
use std::collections::{HashMap, HashSet};

/// Storage for the set of known users.
pub trait UserRepository {
    fn contains_user(&self, id: &UserId) -> bool;

    /// Register a user. Returns `false` if it was already present.
    fn insert_user(&mut self, id: UserId) -> bool;

    /// All users, oldest registration first.
    fn user_ids(&self) -> Vec<UserId>;
}

/// Storage for loan records, keyed by [`LoanId`].
pub trait LoanRepository {
    fn get(&self, id: &LoanId) -> Option<&Loan>;

    fn get_mut(&mut self, id: &LoanId) -> Option<&mut Loan>;

    /// Insert or replace a loan, returning the previous record if any.
    fn put(&mut self, loan: Loan) -> Option<Loan>;

    /// Loans currently owned by `owner`, oldest first.
    fn list_by_owner(&self, owner: &UserId) -> Vec<&Loan>;
}

/// Process-local registry of users and loans.
///
/// Ownership is read from each loan record, so a transfer shows up in
/// [`LoanRepository::list_by_owner`] without any index maintenance.
/// Listings follow insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    users: HashSet<UserId>,
    user_order: Vec<UserId>,
    loans: HashMap<LoanId, Loan>,
    loan_order: Vec<LoanId>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn loan_count(&self) -> usize {
        self.loans.len()
    }
}

impl UserRepository for InMemoryRegistry {
    fn contains_user(&self, id: &UserId) -> bool {
        self.users.contains(id)
    }

    fn insert_user(&mut self, id: UserId) -> bool {
        if !self.users.insert(id) {
            return false;
        }
        self.user_order.push(id);
        true
    }

    fn user_ids(&self) -> Vec<UserId> {
        self.user_order.clone()
    }
}

impl LoanRepository for InMemoryRegistry {
    fn get(&self, id: &LoanId) -> Option<&Loan> {
        self.loans.get(id)
    }

    fn get_mut(&mut self, id: &LoanId) -> Option<&mut Loan> {
        self.loans.get_mut(id)
    }

    fn put(&mut self, loan: Loan) -> Option<Loan> {
        let id = loan.id();
        let previous = self.loans.insert(id, loan);
        // A replaced record keeps its original position.
        if previous.is_none() {
            self.loan_order.push(id);
        }
        previous
    }

    fn list_by_owner(&self, owner: &UserId) -> Vec<&Loan> {
        self.loan_order
            .iter()
            .filter_map(|id| self.loans.get(id))
            .filter(|loan| loan.owner() == *owner)
            .collect()
    }
}
