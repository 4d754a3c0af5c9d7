//! Catalog read service: display projections only, no business rules.

use chrono::Utc;

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookWithAvailability},
        loan::LoanDetails,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All books joined with availability, ordered by title
    pub async fn list_books_with_availability(&self) -> AppResult<Vec<BookWithAvailability>> {
        self.repository.books.list_with_availability().await
    }

    /// Book detail: bibliographic data plus the inventory record
    pub async fn get_book_detail(&self, book_id: i32) -> AppResult<BookWithAvailability> {
        let book: Book = self.repository.books.get_by_id(book_id).await?;
        let inventory = self.repository.inventory.get_by_book_id(book_id).await?;
        Ok(BookWithAvailability { book, inventory })
    }

    /// Loan history for a book, newest checkout first. Authorization
    /// (staff-only) is checked by the caller before invoking.
    pub async fn get_loan_history(&self, book_id: i32) -> AppResult<Vec<LoanDetails>> {
        self.repository.books.get_by_id(book_id).await?;
        self.repository.loans.history_by_book(book_id, Utc::now()).await
    }
}
