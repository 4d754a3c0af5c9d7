//! Book catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        book::{BookWithAvailability, CreateBook, UpdateBook},
        inventory::Availability,
        loan::LoanDetails,
        sale::Sale,
    },
};

use super::AuthenticatedUser;

/// Purchase request (the buyer; staff may record a sale for any user)
#[derive(Deserialize, ToSchema)]
pub struct PurchaseRequest {
    /// Buyer's user ID; defaults to the caller
    pub user_id: Option<i32>,
}

/// Purchase response
#[derive(Serialize, ToSchema)]
pub struct PurchaseResponse {
    /// Recorded sale
    pub sale: Sale,
    /// Status message
    pub message: String,
}

/// List all books with availability
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Book catalog with availability", body = Vec<BookWithAvailability>)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BookWithAvailability>>> {
    let books = state.services.catalog.list_books_with_availability().await?;
    Ok(Json(books))
}

/// Get book detail
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book with inventory record", body = BookWithAvailability),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<Json<BookWithAvailability>> {
    let book = state.services.catalog.get_book_detail(book_id).await?;
    Ok(Json(book))
}

/// Get current availability for a book
#[utoipa::path(
    get,
    path = "/books/{id}/availability",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Quantity and eligibility flags", body = Availability),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_availability(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<Json<Availability>> {
    let availability = state.services.ledger.get_availability(book_id).await?;
    Ok(Json(availability))
}

/// Create a new book with its inventory record
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = BookWithAvailability),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<BookWithAvailability>)> {
    claims.require_manage_catalog()?;

    let created = state.services.books.create_book(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = BookWithAvailability),
        (status = 404, description = "Book not found"),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
    Json(request): Json<UpdateBook>,
) -> AppResult<Json<BookWithAvailability>> {
    claims.require_manage_catalog()?;

    let updated = state.services.books.update_book(book_id, request).await?;
    Ok(Json(updated))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book has active loans")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_manage_catalog()?;

    state.services.books.delete_book(book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Loan history for a book (staff only)
#[utoipa::path(
    get,
    path = "/books/{id}/loans",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Loan history, newest first", body = Vec<LoanDetails>),
        (status = 403, description = "Staff privileges required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_loan_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    claims.require_view_loan_history()?;

    let history = state.services.catalog.get_loan_history(book_id).await?;
    Ok(Json(history))
}

/// Purchase one copy of a book
#[utoipa::path(
    post,
    path = "/books/{id}/purchase",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = PurchaseRequest,
    responses(
        (status = 201, description = "Sale recorded", body = PurchaseResponse),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Out of stock"),
        (status = 422, description = "Not for sale")
    )
)]
pub async fn purchase_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
    Json(request): Json<PurchaseRequest>,
) -> AppResult<(StatusCode, Json<PurchaseResponse>)> {
    let buyer_id = request.user_id.unwrap_or(claims.user_id);
    claims.require_checkout_for(buyer_id)?;

    let sale = state.services.ledger.purchase(book_id, buyer_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(PurchaseResponse {
            sale,
            message: "Book purchased successfully".to_string(),
        }),
    ))
}
