//! Catalog management service: book creation, edits and deletion.

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{BookWithAvailability, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create a book together with its inventory record
    pub async fn create_book(&self, book: CreateBook) -> AppResult<BookWithAvailability> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let created = self.repository.books.create(&book).await?;
        tracing::info!(book_id = created.book.id, isbn = %created.book.isbn, "book created");
        Ok(created)
    }

    /// Update bibliographic and inventory attributes of a book
    pub async fn update_book(&self, id: i32, update: UpdateBook) -> AppResult<BookWithAvailability> {
        self.repository.books.update(id, &update).await
    }

    /// Delete a book. Rejected while unreturned loans reference it;
    /// returned loans, sales and the inventory record are removed with it.
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.get_by_id(id).await?;

        if self.repository.loans.has_unreturned_for_book(id).await? {
            return Err(AppError::Conflict(format!(
                "Book {} has active loans and cannot be deleted",
                id
            )));
        }

        self.repository.books.delete(id).await?;
        tracing::info!(book_id = id, "book deleted");
        Ok(())
    }
}
