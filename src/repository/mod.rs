//! Repository layer for database operations

pub mod books;
pub mod inventory;
pub mod loans;
pub mod sales;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub inventory: inventory::InventoryRepository,
    pub loans: loans::LoansRepository,
    pub sales: sales::SalesRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            inventory: inventory::InventoryRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            sales: sales::SalesRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }
}
