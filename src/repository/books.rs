//! Books repository for database operations

use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookWithAvailability, CreateBook, UpdateBook},
        inventory::InventoryRecord,
    },
    repository::inventory::InventoryRepository,
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

const BOOK_COLUMNS: &str = "id, isbn, title, author, publisher, publication_date, genre, \
                            description, cover_image, page_count, language, created_at, updated_at";

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(&format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// List all books joined with their inventory records
    pub async fn list_with_availability(&self) -> AppResult<Vec<BookWithAvailability>> {
        let rows = sqlx::query(
            r#"
            SELECT b.id, b.isbn, b.title, b.author, b.publisher, b.publication_date,
                   b.genre, b.description, b.cover_image, b.page_count, b.language,
                   b.created_at, b.updated_at,
                   i.quantity, i.location, i.condition, i.cost_price, i.selling_price,
                   i.is_for_sale, i.is_for_loan, i.updated_at AS inventory_updated_at
            FROM books b
            JOIN inventory i ON i.book_id = b.id
            ORDER BY b.title
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(book_with_availability_from_row).collect())
    }

    /// Create a book and its inventory record in one transaction
    pub async fn create(&self, book: &CreateBook) -> AppResult<BookWithAvailability> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Book>(&format!(
            r#"
            INSERT INTO books (isbn, title, author, publisher, publication_date, genre,
                               description, cover_image, page_count, language,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW(), NOW())
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(book.publication_date)
        .bind(&book.genre)
        .bind(&book.description)
        .bind(&book.cover_image)
        .bind(book.page_count)
        .bind(&book.language)
        .fetch_one(&mut *tx)
        .await?;

        let inventory = InventoryRepository::create_on(&mut tx, created.id, &book.inventory).await?;

        tx.commit().await?;
        Ok(BookWithAvailability {
            book: created,
            inventory,
        })
    }

    /// Update bibliographic and inventory attributes. Quantity is not
    /// touched here; it only moves through the ledger primitives.
    pub async fn update(&self, id: i32, update: &UpdateBook) -> AppResult<BookWithAvailability> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(&format!(
            r#"
            UPDATE books
            SET isbn = COALESCE($2, isbn),
                title = COALESCE($3, title),
                author = COALESCE($4, author),
                publisher = COALESCE($5, publisher),
                publication_date = COALESCE($6, publication_date),
                genre = COALESCE($7, genre),
                description = COALESCE($8, description),
                cover_image = COALESCE($9, cover_image),
                page_count = COALESCE($10, page_count),
                language = COALESCE($11, language),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(id)
        .bind(&update.isbn)
        .bind(&update.title)
        .bind(&update.author)
        .bind(&update.publisher)
        .bind(update.publication_date)
        .bind(&update.genre)
        .bind(&update.description)
        .bind(&update.cover_image)
        .bind(update.page_count)
        .bind(&update.language)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let inventory = sqlx::query_as::<_, InventoryRecord>(
            r#"
            UPDATE inventory
            SET location = COALESCE($2, location),
                condition = COALESCE($3, condition),
                cost_price = COALESCE($4, cost_price),
                selling_price = COALESCE($5, selling_price),
                is_for_sale = COALESCE($6, is_for_sale),
                is_for_loan = COALESCE($7, is_for_loan),
                updated_at = NOW()
            WHERE book_id = $1
            RETURNING book_id, quantity, location, condition, cost_price,
                      selling_price, is_for_sale, is_for_loan, updated_at
            "#,
        )
        .bind(id)
        .bind(&update.location)
        .bind(&update.condition)
        .bind(update.cost_price)
        .bind(update.selling_price)
        .bind(update.is_for_sale)
        .bind(update.is_for_loan)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No inventory record for book {}", id)))?;

        tx.commit().await?;
        Ok(BookWithAvailability { book, inventory })
    }

    /// Delete a book with its inventory, sales and returned loans.
    /// The caller must have verified no unreturned loans reference it.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM loans WHERE book_id = $1 AND return_date IS NOT NULL")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM sales WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM inventory WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        tx.commit().await?;
        Ok(())
    }
}

fn book_with_availability_from_row(row: &sqlx::postgres::PgRow) -> BookWithAvailability {
    let book = Book {
        id: row.get("id"),
        isbn: row.get("isbn"),
        title: row.get("title"),
        author: row.get("author"),
        publisher: row.get("publisher"),
        publication_date: row.get("publication_date"),
        genre: row.get("genre"),
        description: row.get("description"),
        cover_image: row.get("cover_image"),
        page_count: row.get("page_count"),
        language: row.get("language"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    };
    let inventory = InventoryRecord {
        book_id: book.id,
        quantity: row.get("quantity"),
        location: row.get("location"),
        condition: row.get("condition"),
        cost_price: row.get("cost_price"),
        selling_price: row.get("selling_price"),
        is_for_sale: row.get("is_for_sale"),
        is_for_loan: row.get("is_for_loan"),
        updated_at: row.get("inventory_updated_at"),
    };
    BookWithAvailability { book, inventory }
}
