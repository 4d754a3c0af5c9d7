//! Inventory ledger service.
//!
//! Owns the authoritative available quantity per book. Reserve and
//! release are thin passthroughs to the repository's atomic conditional
//! updates; the purchase path adds the sale record on top.

use crate::{
    error::AppResult,
    models::{inventory::Availability, sale::Sale},
    repository::Repository,
};

#[derive(Clone)]
pub struct LedgerService {
    repository: Repository,
}

impl LedgerService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Current quantity and sale/loan eligibility for a book
    pub async fn get_availability(&self, book_id: i32) -> AppResult<Availability> {
        self.repository.inventory.get_availability(book_id).await
    }

    /// Reserve `count` copies; fails with InsufficientStock when fewer
    /// are available. Returns the new quantity.
    pub async fn reserve(&self, book_id: i32, count: i32) -> AppResult<i32> {
        let quantity = self.repository.inventory.reserve(book_id, count).await?;
        tracing::debug!(book_id, count, quantity, "reserved inventory");
        Ok(quantity)
    }

    /// Release `count` copies back into stock. Returns the new quantity.
    pub async fn release(&self, book_id: i32, count: i32) -> AppResult<i32> {
        let quantity = self.repository.inventory.release(book_id, count).await?;
        tracing::debug!(book_id, count, quantity, "released inventory");
        Ok(quantity)
    }

    /// Sell one copy: verify the buyer exists, then atomically reserve
    /// the copy and record the sale at the current selling price.
    pub async fn purchase(&self, book_id: i32, user_id: i32) -> AppResult<Sale> {
        self.repository.users.get_by_id(user_id).await?;
        self.repository.books.get_by_id(book_id).await?;

        let sale = self.repository.sales.record_sale(book_id, user_id).await?;
        tracing::info!(book_id, user_id, sale_id = sale.id, "book sold");
        Ok(sale)
    }
}
