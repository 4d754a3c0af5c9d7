//! User model and authorization types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// User roles. All role-based branching goes through the capability
/// methods below; handlers and services never compare role strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Librarian,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Librarian => "librarian",
            Role::Customer => "customer",
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Librarian)
    }

    /// Every authenticated role may borrow; staff may also check out
    /// on behalf of another user.
    pub fn can_checkout(&self) -> bool {
        true
    }

    pub fn can_checkout_for_others(&self) -> bool {
        self.is_staff()
    }

    pub fn can_view_loan_history(&self) -> bool {
        self.is_staff()
    }

    pub fn can_manage_catalog(&self) -> bool {
        self.is_staff()
    }

    pub fn can_manage_users(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "librarian" => Ok(Role::Librarian),
            "customer" => Ok(Role::Customer),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

// SQLx conversion for Role (stored as TEXT)
impl sqlx::Type<Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for Role {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Role {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Full user model from database. Authentication credentials live with
/// the external identity provider; this side holds identity and role only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Short user representation embedded in loan projections
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserSummary {
    pub id: i32,
    pub email: String,
    pub full_name: Option<String>,
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub full_name: Option<String>,
    pub role: Option<Role>,
}

/// JWT claims supplied by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a signed JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse and validate a JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    // Authorization checks

    /// Borrowing for oneself is open to every role; borrowing on behalf
    /// of someone else requires staff.
    pub fn require_checkout_for(&self, borrower_id: i32) -> Result<(), AppError> {
        if !self.role.can_checkout() {
            return Err(AppError::Authorization(
                "Insufficient rights to borrow books".to_string(),
            ));
        }
        if borrower_id != self.user_id && !self.role.can_checkout_for_others() {
            return Err(AppError::Authorization(
                "Only staff may check out books for other users".to_string(),
            ));
        }
        Ok(())
    }

    pub fn require_view_loan_history(&self) -> Result<(), AppError> {
        if self.role.can_view_loan_history() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Insufficient rights to view loan history".to_string(),
            ))
        }
    }

    /// Viewing a user's loans: staff, or the user themself.
    pub fn require_view_loans_of(&self, user_id: i32) -> Result<(), AppError> {
        if user_id == self.user_id || self.role.can_view_loan_history() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Insufficient rights to view these loans".to_string(),
            ))
        }
    }

    pub fn require_manage_catalog(&self) -> Result<(), AppError> {
        if self.role.can_manage_catalog() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Insufficient rights to manage the catalog".to_string(),
            ))
        }
    }

    pub fn require_manage_users(&self) -> Result<(), AppError> {
        if self.role.can_manage_users() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Administrator privileges required".to_string(),
            ))
        }
    }

    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Staff privileges required".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role, user_id: i32) -> UserClaims {
        UserClaims {
            sub: "test".to_string(),
            user_id,
            role,
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn customers_borrow_only_for_themselves() {
        let c = claims(Role::Customer, 5);
        assert!(c.require_checkout_for(5).is_ok());
        assert!(c.require_checkout_for(6).is_err());
    }

    #[test]
    fn staff_borrow_for_anyone() {
        assert!(claims(Role::Librarian, 1).require_checkout_for(9).is_ok());
        assert!(claims(Role::Admin, 1).require_checkout_for(9).is_ok());
    }

    #[test]
    fn loan_history_is_staff_only() {
        assert!(claims(Role::Customer, 1).require_view_loan_history().is_err());
        assert!(claims(Role::Librarian, 1).require_view_loan_history().is_ok());
    }

    #[test]
    fn customers_see_their_own_loans() {
        let c = claims(Role::Customer, 3);
        assert!(c.require_view_loans_of(3).is_ok());
        assert!(c.require_view_loans_of(4).is_err());
    }

    #[test]
    fn user_management_is_admin_only() {
        assert!(claims(Role::Librarian, 1).require_manage_users().is_err());
        assert!(claims(Role::Admin, 1).require_manage_users().is_ok());
    }

    #[test]
    fn role_round_trips_through_strings() {
        for role in [Role::Admin, Role::Librarian, Role::Customer] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("manager".parse::<Role>().is_err());
    }
}
