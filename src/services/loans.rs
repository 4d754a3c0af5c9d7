//! Loan lifecycle service.
//!
//! Owns loan creation, due-date policy, status transitions and return
//! processing. Checkout and return are atomic with their inventory
//! updates at the repository layer.

use chrono::{DateTime, Duration, Utc};

use crate::{
    error::AppResult,
    models::loan::{Loan, LoanDetails, LoanStatus},
    repository::Repository,
};

/// Fixed loan period: due date is checkout + 14 days.
pub const LOAN_PERIOD_DAYS: i64 = 14;

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow a book: verify the borrower, then create the loan and
    /// reserve one copy in a single transaction.
    pub async fn checkout(&self, book_id: i32, user_id: i32) -> AppResult<Loan> {
        self.repository.users.get_by_id(user_id).await?;

        let now = Utc::now();
        let due_date = now + Duration::days(LOAN_PERIOD_DAYS);

        let loan = self
            .repository
            .loans
            .checkout(book_id, user_id, now, due_date)
            .await?;

        tracing::info!(
            loan_id = loan.id,
            book_id,
            user_id,
            due_date = %loan.due_date,
            "book checked out"
        );
        Ok(loan)
    }

    /// Get a loan by ID
    pub async fn get_loan(&self, loan_id: i32) -> AppResult<Loan> {
        self.repository.loans.get_by_id(loan_id).await
    }

    /// Return a borrowed book: mark the loan returned and release its
    /// copy in a single transaction.
    pub async fn return_book(&self, loan_id: i32) -> AppResult<Loan> {
        let loan = self.repository.loans.return_loan(loan_id, Utc::now()).await?;
        tracing::info!(loan_id, book_id = loan.book_id, "book returned");
        Ok(loan)
    }

    /// Get loans for a user, optionally filtered by (derived) status
    pub async fn get_user_loans(
        &self,
        user_id: i32,
        status: Option<LoanStatus>,
    ) -> AppResult<Vec<LoanDetails>> {
        self.repository.users.get_by_id(user_id).await?;
        self.repository
            .loans
            .get_user_loans(user_id, status, Utc::now())
            .await
    }

    /// List all loans, optionally filtered by (derived) status
    pub async fn list_loans(&self, status: Option<LoanStatus>) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.list(status, Utc::now()).await
    }

    /// Persist `overdue` on active loans whose due date has passed, so
    /// storage-level status filters stay accurate between reads. Safe to
    /// run at any frequency; read paths derive status regardless.
    pub async fn reconcile_overdue(&self) -> AppResult<u64> {
        let transitioned = self.repository.loans.mark_overdue(Utc::now()).await?;
        if transitioned > 0 {
            tracing::info!(transitioned, "marked loans overdue");
        }
        Ok(transitioned)
    }
}
