//! Users repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, Role, User},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, full_name, role, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::UserNotFound(id))
    }

    /// List all users
    pub async fn list(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, email, full_name, role, created_at FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Create a new user. Credentials stay with the external identity
    /// provider; this record carries identity and role only.
    pub async fn create(&self, user: &CreateUser) -> AppResult<User> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(&user.email)
            .fetch_one(&self.pool)
            .await?;

        if exists {
            return Err(AppError::Conflict(format!(
                "User with email {} already exists",
                user.email
            )));
        }

        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, full_name, role, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, email, full_name, role, created_at
            "#,
        )
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(user.role.unwrap_or(Role::Customer))
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }
}
