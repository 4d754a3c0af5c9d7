//! Bookhaven Library and Bookstore Inventory Server
//!
//! A Rust implementation of a library/bookstore inventory system:
//! book catalog, loan checkout/return tracking with inventory
//! consistency, purchase recording, and basic user management.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
