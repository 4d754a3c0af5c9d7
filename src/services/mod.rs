//! Business logic services

pub mod books;
pub mod catalog;
pub mod ledger;
pub mod loans;
pub mod users;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub catalog: catalog::CatalogService,
    pub ledger: ledger::LedgerService,
    pub loans: loans::LoansService,
    pub users: users::UsersService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            books: books::BooksService::new(repository.clone()),
            catalog: catalog::CatalogService::new(repository.clone()),
            ledger: ledger::LedgerService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone()),
            users: users::UsersService::new(repository),
        }
    }
}
