//! Loan (borrow) model and status lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;

use super::book::BookSummary;
use super::user::UserSummary;

/// Loan status. `returned` is terminal. `overdue` is time-derived: read
/// paths compute it from the due date rather than trusting the stored
/// column, which is only refreshed by the reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Active,
    Overdue,
    Returned,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Overdue => "overdue",
            LoanStatus::Returned => "returned",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(LoanStatus::Active),
            "overdue" => Ok(LoanStatus::Overdue),
            "returned" => Ok(LoanStatus::Returned),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

// SQLx conversion for LoanStatus (stored as TEXT)
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Loan model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub book_id: i32,
    pub user_id: i32,
    pub checkout_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Loan {
    /// Derives the loan status at `now`. A recorded return always wins;
    /// otherwise the loan is overdue once the due date has passed.
    pub fn status_at(&self, now: DateTime<Utc>) -> LoanStatus {
        if self.return_date.is_some() {
            LoanStatus::Returned
        } else if now > self.due_date {
            LoanStatus::Overdue
        } else {
            LoanStatus::Active
        }
    }
}

/// Loan with book and borrower details for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub book: BookSummary,
    pub borrower: Option<UserSummary>,
    pub checkout_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn loan(due_offset_days: i64, returned: bool) -> Loan {
        let checkout = Utc::now();
        Loan {
            id: 1,
            book_id: 1,
            user_id: 1,
            checkout_date: checkout,
            due_date: checkout + Duration::days(due_offset_days),
            return_date: returned.then(|| checkout + Duration::days(1)),
            status: LoanStatus::Active,
            created_at: checkout,
            updated_at: checkout,
        }
    }

    #[test]
    fn active_before_due_date() {
        let l = loan(14, false);
        assert_eq!(l.status_at(Utc::now()), LoanStatus::Active);
    }

    #[test]
    fn overdue_after_due_date() {
        let l = loan(14, false);
        let later = l.due_date + Duration::seconds(1);
        assert_eq!(l.status_at(later), LoanStatus::Overdue);
    }

    #[test]
    fn returned_wins_regardless_of_clock() {
        let l = loan(14, true);
        let long_after = l.due_date + Duration::days(365);
        assert_eq!(l.status_at(long_after), LoanStatus::Returned);
        assert_eq!(l.status_at(l.checkout_date), LoanStatus::Returned);
    }

    #[test]
    fn derivation_ignores_stale_stored_status() {
        let mut l = loan(-1, false);
        l.status = LoanStatus::Active; // stale
        assert_eq!(l.status_at(Utc::now()), LoanStatus::Overdue);
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [LoanStatus::Active, LoanStatus::Overdue, LoanStatus::Returned] {
            assert_eq!(status.as_str().parse::<LoanStatus>().unwrap(), status);
        }
        assert!("lost".parse::<LoanStatus>().is_err());
    }
}
