//! Inventory model: per-book stock and sale/loan eligibility

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Inventory record, one per book. `quantity` counts available copies
/// and must never go negative; all mutation goes through the ledger's
/// atomic conditional updates.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct InventoryRecord {
    pub book_id: i32,
    pub quantity: i32,
    pub location: Option<String>,
    pub condition: Option<String>,
    pub cost_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub is_for_sale: bool,
    pub is_for_loan: bool,
    pub updated_at: DateTime<Utc>,
}

/// Availability snapshot returned by the ledger's read path
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Availability {
    pub book_id: i32,
    pub quantity: i32,
    pub is_for_sale: bool,
    pub is_for_loan: bool,
}

impl Availability {
    pub fn loanable(&self) -> bool {
        self.is_for_loan && self.quantity > 0
    }

    pub fn sellable(&self) -> bool {
        self.is_for_sale && self.quantity > 0
    }
}

/// Initial inventory data supplied when creating a book
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateInventory {
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
    pub location: Option<String>,
    pub condition: Option<String>,
    pub cost_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    #[serde(default = "default_true")]
    pub is_for_sale: bool,
    #[serde(default = "default_true")]
    pub is_for_loan: bool,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn availability(quantity: i32, is_for_sale: bool, is_for_loan: bool) -> Availability {
        Availability {
            book_id: 1,
            quantity,
            is_for_sale,
            is_for_loan,
        }
    }

    #[test]
    fn loanable_requires_stock_and_flag() {
        assert!(availability(1, false, true).loanable());
        assert!(!availability(0, false, true).loanable());
        assert!(!availability(1, true, false).loanable());
    }

    #[test]
    fn sellable_requires_stock_and_flag() {
        assert!(availability(2, true, false).sellable());
        assert!(!availability(0, true, true).sellable());
        assert!(!availability(2, false, true).sellable());
    }
}
