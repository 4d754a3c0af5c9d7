//! Sale record for the purchase path

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A completed sale of one copy. The amount is the selling price at the
/// time of sale; payment handling is out of scope.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Sale {
    pub id: i32,
    pub book_id: i32,
    pub user_id: i32,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}
