//! Sales repository for database operations

use rust_decimal::Decimal;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::sale::Sale,
    repository::inventory::InventoryRepository,
};

#[derive(Clone)]
pub struct SalesRepository {
    pool: Pool<Postgres>,
}

impl SalesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Record a sale of one copy: reserve the copy and insert the sale
    /// row in one transaction, priced at the current selling price.
    pub async fn record_sale(&self, book_id: i32, user_id: i32) -> AppResult<Sale> {
        let mut tx = self.pool.begin().await?;

        let availability = InventoryRepository::availability_on(&mut tx, book_id).await?;
        if !availability.is_for_sale {
            return Err(AppError::BookUnavailable(format!(
                "Book {} is not for sale",
                book_id
            )));
        }
        if availability.quantity <= 0 {
            return Err(AppError::BookUnavailable(format!(
                "Book {} has no copies available",
                book_id
            )));
        }

        let amount: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(selling_price, 0) FROM inventory WHERE book_id = $1",
        )
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;

        InventoryRepository::reserve_on(&mut tx, book_id, 1).await?;

        let sale = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales (book_id, user_id, amount, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, book_id, user_id, amount, created_at
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .bind(amount)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(sale)
    }
}
