//! Users repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::User,
};

/// Fields stored when an account is registered
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub verification_token: &'a str,
    pub verification_token_expires_at: DateTime<Utc>,
}

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
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Get user by email (case-insensitive)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Check if email already exists
    pub async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// All users, oldest first
    pub async fn list(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    /// Create an unverified user
    pub async fn create(&self, user: &NewUser<'_>) -> AppResult<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password, verification_token, verification_token_expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user.name)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.verification_token)
        .bind(user.verification_token_expires_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Find a user whose verification code matches and has not expired
    pub async fn find_by_verification_code(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE LOWER(email) = LOWER($1)
              AND verification_token = $2
              AND verification_token_expires_at > $3
            "#,
        )
        .bind(email)
        .bind(code)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Mark user as verified and clear the verification code
    pub async fn mark_verified(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                is_verified = TRUE,
                verification_token = NULL,
                verification_token_expires_at = NULL,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Store a password reset token
    pub async fn set_reset_token(
        &self,
        id: i32,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET reset_password_token = $2, reset_password_expires_at = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Find a user whose reset token matches and has not expired
    pub async fn find_by_reset_token(
        &self,
        email: &str,
        token: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE LOWER(email) = LOWER($1)
              AND reset_password_token = $2
              AND reset_password_expires_at > $3
            "#,
        )
        .bind(email)
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Replace the password hash and clear any reset token
    pub async fn update_password(&self, id: i32, password_hash: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                password = $2,
                reset_password_token = NULL,
                reset_password_expires_at = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Set the admin flag
    pub async fn set_admin(&self, id: i32, is_admin: bool) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET is_admin = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(is_admin)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}
