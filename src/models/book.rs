//! Book model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::inventory::InventoryRecord;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub page_count: Option<i32>,
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Short book representation embedded in loan projections
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookSummary {
    pub id: i32,
    pub isbn: String,
    pub title: String,
    pub author: String,
}

/// Book joined with its inventory record for catalog listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookWithAvailability {
    #[serde(flatten)]
    pub book: Book,
    pub inventory: InventoryRecord,
}

/// Create book request: bibliographic data plus the initial inventory record
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "ISBN is required"))]
    pub isbn: String,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    pub publisher: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub page_count: Option<i32>,
    pub language: Option<String>,
    #[validate(nested)]
    pub inventory: super::inventory::CreateInventory,
}

/// Update book request (bibliographic fields only; quantity changes go
/// through the ledger)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub page_count: Option<i32>,
    pub language: Option<String>,
    pub location: Option<String>,
    pub condition: Option<String>,
    pub cost_price: Option<rust_decimal::Decimal>,
    pub selling_price: Option<rust_decimal::Decimal>,
    pub is_for_sale: Option<bool>,
    pub is_for_loan: Option<bool>,
}
