//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, loans, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookhaven API",
        version = "0.1.0",
        description = "Library and Bookstore Inventory REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::get_book,
        books::get_availability,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::get_loan_history,
        books::purchase_book,
        // Loans
        loans::list_loans,
        loans::get_user_loans,
        loans::checkout,
        loans::return_loan,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::BookWithAvailability,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::inventory::InventoryRecord,
            crate::models::inventory::Availability,
            crate::models::inventory::CreateInventory,
            books::PurchaseRequest,
            books::PurchaseResponse,
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::LoanStatus,
            crate::models::loan::LoanDetails,
            loans::CheckoutRequest,
            loans::CheckoutResponse,
            loans::ReturnResponse,
            loans::LoanQuery,
            // Users
            crate::models::user::User,
            crate::models::user::UserSummary,
            crate::models::user::Role,
            crate::models::user::CreateUser,
            // Sales
            crate::models::sale::Sale,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog and inventory"),
        (name = "loans", description = "Loan lifecycle"),
        (name = "users", description = "User management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
