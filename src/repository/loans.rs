//! Loans repository for database operations.
//!
//! Checkout and return each run in a single transaction covering the loan
//! write and the matching inventory update, so neither can be applied
//! without the other. Status filters never trust the stored status column;
//! they are expressed on `return_date`/`due_date`, which cannot go stale.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::BookSummary,
        loan::{Loan, LoanDetails, LoanStatus},
        user::UserSummary,
    },
    repository::inventory::InventoryRepository,
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

const LOAN_COLUMNS: &str = "id, book_id, user_id, checkout_date, due_date, return_date, status, created_at, updated_at";

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(&format!("SELECT {} FROM loans WHERE id = $1", LOAN_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::LoanNotFound(id))
    }

    /// Create a loan and reserve one copy, atomically.
    ///
    /// The availability check, the loan insert and the conditional
    /// decrement all happen inside one transaction. If the decrement
    /// loses a race for the last copy, the insert rolls back with it.
    pub async fn checkout(
        &self,
        book_id: i32,
        user_id: i32,
        checkout_date: DateTime<Utc>,
        due_date: DateTime<Utc>,
    ) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let availability = InventoryRepository::availability_on(&mut tx, book_id).await?;
        if !availability.is_for_loan {
            return Err(AppError::BookUnavailable(format!(
                "Book {} is not available for loan",
                book_id
            )));
        }
        if availability.quantity <= 0 {
            return Err(AppError::BookUnavailable(format!(
                "Book {} has no copies available",
                book_id
            )));
        }

        let loan = sqlx::query_as::<_, Loan>(&format!(
            r#"
            INSERT INTO loans (book_id, user_id, checkout_date, due_date, return_date, status,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, NULL, $5, NOW(), NOW())
            RETURNING {}
            "#,
            LOAN_COLUMNS
        ))
        .bind(book_id)
        .bind(user_id)
        .bind(checkout_date)
        .bind(due_date)
        .bind(LoanStatus::Active)
        .fetch_one(&mut *tx)
        .await?;

        InventoryRepository::reserve_on(&mut tx, book_id, 1).await?;

        tx.commit().await?;
        Ok(loan)
    }

    /// Mark a loan returned and release its copy, atomically.
    ///
    /// The row is locked for the duration of the transaction so a
    /// concurrent return of the same loan cannot double-increment.
    pub async fn return_loan(&self, loan_id: i32, now: DateTime<Utc>) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>(&format!(
            "SELECT {} FROM loans WHERE id = $1 FOR UPDATE",
            LOAN_COLUMNS
        ))
        .bind(loan_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::LoanNotFound(loan_id))?;

        if loan.return_date.is_some() || loan.status == LoanStatus::Returned {
            return Err(AppError::AlreadyReturned(loan_id));
        }

        let returned = sqlx::query_as::<_, Loan>(&format!(
            r#"
            UPDATE loans
            SET status = $2, return_date = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            LOAN_COLUMNS
        ))
        .bind(loan_id)
        .bind(LoanStatus::Returned)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        InventoryRepository::release_on(&mut tx, loan.book_id, 1).await?;

        tx.commit().await?;
        Ok(returned)
    }

    /// Get loans for a user, newest checkout first
    pub async fn get_user_loans(
        &self,
        user_id: i32,
        status: Option<LoanStatus>,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<LoanDetails>> {
        let (predicate, needs_now) = status_predicate(status, 2);
        let query = format!(
            r#"
            SELECT l.id, l.book_id, l.user_id, l.checkout_date, l.due_date, l.return_date,
                   l.status, l.created_at, l.updated_at,
                   b.isbn, b.title, b.author
            FROM loans l
            JOIN books b ON l.book_id = b.id
            WHERE l.user_id = $1 {}
            ORDER BY l.checkout_date DESC
            "#,
            predicate
        );

        let mut q = sqlx::query(&query).bind(user_id);
        if needs_now {
            q = q.bind(now);
        }
        let rows = q.fetch_all(&self.pool).await?;

        Ok(rows.iter().map(|row| details_from_row(row, now, false)).collect())
    }

    /// List all loans, optionally filtered by status, newest checkout first
    pub async fn list(
        &self,
        status: Option<LoanStatus>,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<LoanDetails>> {
        let (predicate, needs_now) = status_predicate(status, 1);
        let query = format!(
            r#"
            SELECT l.id, l.book_id, l.user_id, l.checkout_date, l.due_date, l.return_date,
                   l.status, l.created_at, l.updated_at,
                   b.isbn, b.title, b.author,
                   u.email, u.full_name
            FROM loans l
            JOIN books b ON l.book_id = b.id
            JOIN users u ON l.user_id = u.id
            WHERE TRUE {}
            ORDER BY l.checkout_date DESC
            "#,
            predicate
        );

        let mut q = sqlx::query(&query);
        if needs_now {
            q = q.bind(now);
        }
        let rows = q.fetch_all(&self.pool).await?;

        Ok(rows.iter().map(|row| details_from_row(row, now, true)).collect())
    }

    /// Full loan history for a book (returned loans included), newest first
    pub async fn history_by_book(&self, book_id: i32, now: DateTime<Utc>) -> AppResult<Vec<LoanDetails>> {
        let rows = sqlx::query(
            r#"
            SELECT l.id, l.book_id, l.user_id, l.checkout_date, l.due_date, l.return_date,
                   l.status, l.created_at, l.updated_at,
                   b.isbn, b.title, b.author,
                   u.email, u.full_name
            FROM loans l
            JOIN books b ON l.book_id = b.id
            JOIN users u ON l.user_id = u.id
            WHERE l.book_id = $1
            ORDER BY l.checkout_date DESC
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|row| details_from_row(row, now, true)).collect())
    }

    /// Persist `overdue` on active loans whose due date has passed.
    /// Returns the number of loans transitioned.
    pub async fn mark_overdue(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE loans
            SET status = $1, updated_at = NOW()
            WHERE status = $2 AND return_date IS NULL AND due_date < $3
            "#,
        )
        .bind(LoanStatus::Overdue)
        .bind(LoanStatus::Active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Whether any unreturned loan still references the book
    pub async fn has_unreturned_for_book(&self, book_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE book_id = $1 AND return_date IS NULL)",
        )
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

/// SQL fragment filtering on derived status. Filters on `return_date`
/// and `due_date` (bound as `$param` = the caller's clock) so results
/// are correct even when the stored status column lags behind. The
/// second element says whether the clock parameter must be bound.
fn status_predicate(status: Option<LoanStatus>, param: usize) -> (String, bool) {
    match status {
        Some(LoanStatus::Returned) => ("AND l.return_date IS NOT NULL".to_string(), false),
        Some(LoanStatus::Active) => (
            format!("AND l.return_date IS NULL AND l.due_date >= ${}", param),
            true,
        ),
        Some(LoanStatus::Overdue) => (
            format!("AND l.return_date IS NULL AND l.due_date < ${}", param),
            true,
        ),
        None => (String::new(), false),
    }
}

fn details_from_row(row: &sqlx::postgres::PgRow, now: DateTime<Utc>, with_borrower: bool) -> LoanDetails {
    let loan = Loan {
        id: row.get("id"),
        book_id: row.get("book_id"),
        user_id: row.get("user_id"),
        checkout_date: row.get("checkout_date"),
        due_date: row.get("due_date"),
        return_date: row.get("return_date"),
        status: row.get("status"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    };

    let borrower = with_borrower.then(|| UserSummary {
        id: loan.user_id,
        email: row.get("email"),
        full_name: row.get("full_name"),
    });

    LoanDetails {
        id: loan.id,
        book: BookSummary {
            id: loan.book_id,
            isbn: row.get("isbn"),
            title: row.get("title"),
            author: row.get("author"),
        },
        borrower,
        checkout_date: loan.checkout_date,
        due_date: loan.due_date,
        return_date: loan.return_date,
        status: loan.status_at(now),
    }
}
