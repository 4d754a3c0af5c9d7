//! Domain models

pub mod book;
pub mod inventory;
pub mod loan;
pub mod sale;
pub mod user;

pub use book::{Book, BookSummary, BookWithAvailability};
pub use inventory::{Availability, InventoryRecord};
pub use loan::{Loan, LoanDetails, LoanStatus};
pub use sale::Sale;
pub use user::{Role, User, UserClaims, UserSummary};
