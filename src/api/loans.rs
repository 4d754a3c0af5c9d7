//! Loan management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::loan::{Loan, LoanDetails, LoanStatus},
};

use super::AuthenticatedUser;

/// Checkout request
#[derive(Deserialize, ToSchema)]
pub struct CheckoutRequest {
    /// Book to borrow
    pub book_id: i32,
    /// Borrower's user ID; defaults to the caller
    pub user_id: Option<i32>,
}

/// Checkout response with the created loan
#[derive(Serialize, ToSchema)]
pub struct CheckoutResponse {
    /// Loan ID
    pub id: i32,
    /// Due date (checkout + 14 days)
    pub due_date: DateTime<Utc>,
    /// The created loan
    pub loan: Loan,
    /// Status message
    pub message: String,
}

/// Return response
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    /// Return status
    pub status: String,
    /// The returned loan
    pub loan: Loan,
}

/// Loan list query parameters
#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LoanQuery {
    /// Filter by derived status (active, overdue, returned)
    pub status: Option<LoanStatus>,
}

/// List loans, optionally filtered by status (staff only)
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoanQuery),
    responses(
        (status = 200, description = "Loans, newest checkout first", body = Vec<LoanDetails>),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    claims.require_view_loan_history()?;

    let loans = state.services.loans.list_loans(query.status).await?;
    Ok(Json(loans))
}

/// Get loans for a specific user
#[utoipa::path(
    get,
    path = "/users/{id}/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID"),
        LoanQuery
    ),
    responses(
        (status = 200, description = "User's loans", body = Vec<LoanDetails>),
        (status = 403, description = "Not permitted to view these loans"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    claims.require_view_loans_of(user_id)?;

    let loans = state
        .services
        .loans
        .get_user_loans(user_id, query.status)
        .await?;
    Ok(Json(loans))
}

/// Borrow a book (create a loan)
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Loan created", body = CheckoutResponse),
        (status = 403, description = "Not permitted to borrow for this user"),
        (status = 404, description = "Book or user not found"),
        (status = 409, description = "Lost the race for the last copy"),
        (status = 422, description = "Book unavailable for loan")
    )
)]
pub async fn checkout(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CheckoutRequest>,
) -> AppResult<(StatusCode, Json<CheckoutResponse>)> {
    let borrower_id = request.user_id.unwrap_or(claims.user_id);
    claims.require_checkout_for(borrower_id)?;

    let loan = state
        .services
        .loans
        .checkout(request.book_id, borrower_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            id: loan.id,
            due_date: loan.due_date,
            message: "Book borrowed successfully".to_string(),
            loan,
        }),
    ))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = ReturnResponse),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(loan_id): Path<i32>,
) -> AppResult<Json<ReturnResponse>> {
    // The borrower returns their own loan; staff return anyone's.
    let existing = state.services.loans.get_loan(loan_id).await?;
    claims.require_view_loans_of(existing.user_id)?;

    let loan = state.services.loans.return_book(loan_id).await?;

    Ok(Json(ReturnResponse {
        status: "returned".to_string(),
        loan,
    }))
}
