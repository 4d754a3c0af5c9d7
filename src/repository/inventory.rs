//! Inventory repository: the storage side of the ledger.
//!
//! Quantity is only ever changed by the conditional UPDATE statements in
//! this module. The check-and-decrement is a single statement so two
//! concurrent checkouts of the last copy cannot both succeed; the loser
//! sees zero rows affected and the caller's transaction rolls back.

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::inventory::{Availability, CreateInventory, InventoryRecord},
};

#[derive(Clone)]
pub struct InventoryRepository {
    pool: Pool<Postgres>,
}

impl InventoryRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get current availability for a book
    pub async fn get_availability(&self, book_id: i32) -> AppResult<Availability> {
        let mut conn = self.pool.acquire().await?;
        Self::availability_on(&mut conn, book_id).await
    }

    /// Atomically reserve `count` copies; returns the new quantity
    pub async fn reserve(&self, book_id: i32, count: i32) -> AppResult<i32> {
        let mut conn = self.pool.acquire().await?;
        Self::reserve_on(&mut conn, book_id, count).await
    }

    /// Atomically release `count` copies back; returns the new quantity
    pub async fn release(&self, book_id: i32, count: i32) -> AppResult<i32> {
        let mut conn = self.pool.acquire().await?;
        Self::release_on(&mut conn, book_id, count).await
    }

    // Connection-generic primitives. Other repositories call these inside
    // their own transactions so a loan insert and its quantity update
    // commit or roll back together.

    pub async fn availability_on(conn: &mut PgConnection, book_id: i32) -> AppResult<Availability> {
        sqlx::query_as::<_, Availability>(
            "SELECT book_id, quantity, is_for_sale, is_for_loan FROM inventory WHERE book_id = $1",
        )
        .bind(book_id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No inventory record for book {}", book_id)))
    }

    /// Decrement quantity by `count` where quantity >= count, in one
    /// statement. Zero rows affected means insufficient stock (or a
    /// missing record, distinguished afterwards).
    pub async fn reserve_on(conn: &mut PgConnection, book_id: i32, count: i32) -> AppResult<i32> {
        let quantity = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE inventory
            SET quantity = quantity - $2, updated_at = NOW()
            WHERE book_id = $1 AND quantity >= $2
            RETURNING quantity
            "#,
        )
        .bind(book_id)
        .bind(count)
        .fetch_optional(&mut *conn)
        .await?;

        match quantity {
            Some(q) => Ok(q),
            None => {
                let current = Self::availability_on(conn, book_id).await?;
                Err(AppError::InsufficientStock(format!(
                    "Book {} has {} copies available, {} requested",
                    book_id, current.quantity, count
                )))
            }
        }
    }

    /// Increment quantity by `count`. Unconditional, matching the
    /// observed return/release behavior.
    pub async fn release_on(conn: &mut PgConnection, book_id: i32, count: i32) -> AppResult<i32> {
        sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE inventory
            SET quantity = quantity + $2, updated_at = NOW()
            WHERE book_id = $1
            RETURNING quantity
            "#,
        )
        .bind(book_id)
        .bind(count)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No inventory record for book {}", book_id)))
    }

    /// Insert the inventory record for a newly created book
    pub async fn create_on(
        conn: &mut PgConnection,
        book_id: i32,
        inventory: &CreateInventory,
    ) -> AppResult<InventoryRecord> {
        let record = sqlx::query_as::<_, InventoryRecord>(
            r#"
            INSERT INTO inventory (book_id, quantity, location, condition, cost_price,
                                   selling_price, is_for_sale, is_for_loan, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            RETURNING book_id, quantity, location, condition, cost_price,
                      selling_price, is_for_sale, is_for_loan, updated_at
            "#,
        )
        .bind(book_id)
        .bind(inventory.quantity)
        .bind(&inventory.location)
        .bind(&inventory.condition)
        .bind(inventory.cost_price)
        .bind(inventory.selling_price)
        .bind(inventory.is_for_sale)
        .bind(inventory.is_for_loan)
        .fetch_one(conn)
        .await?;

        Ok(record)
    }

    /// Get the full inventory record for a book
    pub async fn get_by_book_id(&self, book_id: i32) -> AppResult<InventoryRecord> {
        sqlx::query_as::<_, InventoryRecord>(
            r#"
            SELECT book_id, quantity, location, condition, cost_price,
                   selling_price, is_for_sale, is_for_loan, updated_at
            FROM inventory
            WHERE book_id = $1
            "#,
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No inventory record for book {}", book_id)))
    }
}
