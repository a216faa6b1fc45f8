//! Account endpoints: registration, sessions, email verification, password reset

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    config::AuthConfig,
    error::AppResult,
    models::user::{
        ForgotPasswordRequest, LoginRequest, RegisterUser, ResetPasswordRequest, User,
        VerifyEmailRequest,
    },
    AppState,
};

use super::{AuthenticatedUser, ValidJson, AUTH_COOKIE};

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

#[derive(Serialize, ToSchema)]
pub struct UserMessageResponse {
    pub message: String,
    pub user: User,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub user: User,
}

/// HttpOnly session cookie carrying the JWT
pub fn session_cookie(token: String, config: &AuthConfig) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(config.jwt_expiration_hours as i64))
        .build()
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterUser,
    responses(
        (status = 201, description = "User registered, verification code sent", body = UserMessageResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 409, description = "User already exists")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidJson(request): ValidJson<RegisterUser>,
) -> AppResult<(StatusCode, CookieJar, Json<UserMessageResponse>)> {
    let (token, user) = state.services.users.register(request).await?;
    let jar = jar.add(session_cookie(token, &state.config.auth));

    Ok((
        StatusCode::CREATED,
        jar,
        Json(UserMessageResponse {
            message: "User registered successfully".to_string(),
            user,
        }),
    ))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Wrong credentials or account not verified")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidJson(request): ValidJson<LoginRequest>,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    let (token, user) = state.services.users.login(request).await?;
    let jar = jar.add(session_cookie(token.clone(), &state.config.auth));

    Ok((
        jar,
        Json(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: state.services.users.token_ttl_seconds(),
            user,
        }),
    ))
}

/// Logout (clears the session cookie)
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse)
    )
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    // Sent even when the request carried no cookie
    let expired = Cookie::build((AUTH_COOKIE, ""))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::ZERO);
    (jar.add(expired), MessageResponse::new("User logged out successfully"))
}

/// Get current user info
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "User not found")
    )
)]
pub async fn me(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<User>> {
    let user = state.services.users.get_by_id(claims.user_id).await?;
    Ok(Json(user))
}

/// Verify an email address with the mailed code
#[utoipa::path(
    post,
    path = "/auth/verify-email",
    tag = "auth",
    request_body = VerifyEmailRequest,
    responses(
        (status = 200, description = "Account verified", body = UserMessageResponse),
        (status = 400, description = "Invalid or expired verification code")
    )
)]
pub async fn verify_email(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<VerifyEmailRequest>,
) -> AppResult<Json<UserMessageResponse>> {
    let user = state.services.users.verify_email(request).await?;
    Ok(Json(UserMessageResponse {
        message: "Account verified successfully".to_string(),
        user,
    }))
}

/// Request a password reset link
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    tag = "auth",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link sent", body = MessageResponse),
        (status = 400, description = "User not found")
    )
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<ForgotPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    state.services.users.forgot_password(request).await?;
    Ok(MessageResponse::new("Password reset link sent to your email"))
}

/// Choose a new password with a reset token
#[utoipa::path(
    put,
    path = "/auth/reset-password/{token}",
    tag = "auth",
    params(
        ("token" = String, Path, description = "Reset token from the emailed link")
    ),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Invalid or expired reset password session")
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    ValidJson(request): ValidJson<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    state.services.users.reset_password(&token, request).await?;
    Ok(MessageResponse::new("Password reset successful"))
}
