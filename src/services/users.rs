//! Account and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use rand::{Rng, RngCore};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{
        ForgotPasswordRequest, LoginRequest, RegisterUser, ResetPasswordRequest, User, UserClaims,
        VerifyEmailRequest,
    },
    repository::{users::NewUser, Repository},
    services::email::{self, EmailService},
};

/// Random 6-digit email verification code
pub fn generate_verification_code() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

/// Random 20-byte password reset token, hex encoded
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// `is_admin` must be a JSON boolean, not a string or number
pub fn parse_admin_flag(value: &serde_json::Value) -> AppResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| AppError::BadRequest("`is_admin` must be a boolean".to_string()))
}

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
    client_url: String,
    email: EmailService,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig, client_url: String, email: EmailService) -> Self {
        Self {
            repository,
            config,
            client_url,
            email,
        }
    }

    /// Register an unverified account, mail its verification code and return a session token
    pub async fn register(&self, request: RegisterUser) -> AppResult<(String, User)> {
        if self.repository.users.email_exists(&request.email).await? {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let password_hash = self.hash_password(&request.password)?;
        let code = generate_verification_code();
        let expires_at = Utc::now() + Duration::hours(self.config.verification_token_hours);

        let user = self
            .repository
            .users
            .create(&NewUser {
                name: &request.name,
                email: &request.email,
                password_hash: &password_hash,
                verification_token: &code,
                verification_token_expires_at: expires_at,
            })
            .await?;

        tracing::info!("Registered user id={}", user.id);

        self.notify(
            &user.email,
            email::verification_mail(&user.name, &code, self.config.verification_token_hours),
        )
        .await;

        let token = self.create_token(&user)?;
        Ok((token, user))
    }

    /// Confirm an email address with its verification code
    pub async fn verify_email(&self, request: VerifyEmailRequest) -> AppResult<User> {
        let user = self
            .repository
            .users
            .find_by_verification_code(&request.email, &request.code, Utc::now())
            .await?
            .ok_or_else(|| {
                AppError::BadRequest("Invalid or expired verification code".to_string())
            })?;

        let user = self.repository.users.mark_verified(user.id).await?;
        tracing::info!("Verified user id={}", user.id);

        self.notify(&user.email, email::welcome_mail(&user.name)).await;
        Ok(user)
    }

    /// Check credentials of a verified account and return a session token
    pub async fn login(&self, request: LoginRequest) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::BadRequest("Wrong credentials".to_string()))?;

        if !self.verify_password(&user, &request.password)? {
            return Err(AppError::BadRequest("Wrong credentials".to_string()));
        }

        if !user.is_verified {
            return Err(AppError::BadRequest(
                "Your account hasn't been verified! Check your email".to_string(),
            ));
        }

        let token = self.create_token(&user)?;
        Ok((token, user))
    }

    /// Issue a reset token and mail the reset link
    pub async fn forgot_password(&self, request: ForgotPasswordRequest) -> AppResult<()> {
        let user = self
            .repository
            .users
            .get_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::BadRequest("User not found".to_string()))?;

        let token = generate_reset_token();
        let expires_at = Utc::now() + Duration::hours(self.config.reset_token_hours);
        self.repository
            .users
            .set_reset_token(user.id, &token, expires_at)
            .await?;

        let link = email::reset_link(&self.client_url, &token, &user.email);
        self.notify(&user.email, email::password_reset_mail(&link)).await;
        Ok(())
    }

    /// Set a new password using a valid reset token
    pub async fn reset_password(&self, token: &str, request: ResetPasswordRequest) -> AppResult<()> {
        let user = self
            .repository
            .users
            .find_by_reset_token(&request.email, token, Utc::now())
            .await?
            .ok_or_else(|| {
                AppError::BadRequest("Invalid or expired reset password session".to_string())
            })?;

        let password_hash = self.hash_password(&request.password)?;
        self.repository
            .users
            .update_password(user.id, &password_hash)
            .await?;
        tracing::info!("Password reset for user id={}", user.id);

        self.notify(&user.email, email::reset_success_mail()).await;
        Ok(())
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    /// Grant or revoke administrator rights
    pub async fn update_role(&self, id: i32, is_admin: &serde_json::Value) -> AppResult<User> {
        let is_admin = parse_admin_flag(is_admin)?;
        let user = self.repository.users.set_admin(id, is_admin).await?;
        tracing::info!("User id={} is_admin={}", user.id, user.is_admin);
        Ok(user)
    }

    /// Token lifetime in seconds
    pub fn token_ttl_seconds(&self) -> i64 {
        self.config.jwt_expiration_hours as i64 * 3600
    }

    fn create_token(&self, user: &User) -> AppResult<String> {
        UserClaims::new(user.id, self.config.jwt_expiration_hours)
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Mail delivery problems never fail the request
    async fn notify(&self, to: &str, content: email::MailContent) {
        if let Err(e) = self.email.send(to, &content).await {
            tracing::warn!("Failed to send {:?} to {}: {}", content.subject, to, e);
        }
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
