//! API handlers for Fon Library REST endpoints

pub mod auth;
pub mod authors;
pub mod books;
pub mod borrows;
pub mod genres;
pub mod health;
pub mod openapi;
pub mod reports;
pub mod users;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    routing::{get, post, put},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::{
    error::AppError,
    models::user::{User, UserClaims},
    AppState,
};

/// Name of the session cookie holding the JWT
pub const AUTH_COOKIE: &str = "token";

/// JWT from an `Authorization: Bearer` header, else from the session cookie
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());

    bearer.or_else(|| {
        CookieJar::from_headers(headers)
            .get(AUTH_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
    })
}

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers)
            .ok_or_else(|| AppError::Authentication("Not authorized, no token".to_string()))?;

        let claims = UserClaims::from_token(&token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Extractor for an administrator, re-read from the database on every request
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(claims) = AuthenticatedUser::from_request_parts(parts, state).await?;

        let user = state
            .services
            .users
            .get_by_id(claims.user_id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => {
                    AppError::Authentication("User no longer exists".to_string())
                }
                other => other,
            })?;

        if !user.is_admin {
            return Err(AppError::Authorization("Admin access required".to_string()));
        }

        Ok(AdminUser(user))
    }
}

/// JSON body that is deserialized then validated; both failures answer 400
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| AppError::Validation(e.body_text()))?;
        value.validate()?;
        Ok(ValidJson(value))
    }
}

/// Routes of API v1, relative to `/api/v1`
pub fn routes(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/auth/verify-email", post(auth::verify_email))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password/:token", put(auth::reset_password))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/all", get(books::list_all_books))
        .route("/books/top-available", get(books::top_available_books))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        // Genres
        .route("/genres", get(genres::list_genres).post(genres::create_genre))
        .route(
            "/genres/:id",
            get(genres::get_genre)
                .put(genres::update_genre)
                .delete(genres::delete_genre),
        )
        // Authors
        .route("/authors", get(authors::list_authors).post(authors::create_author))
        .route(
            "/authors/:id",
            get(authors::get_author)
                .put(authors::update_author)
                .delete(authors::delete_author),
        )
        // Users
        .route("/users", get(users::list_users))
        .route("/users/:id/borrows", get(users::get_user_borrow_stats))
        .route("/users/:id/role", put(users::update_role))
        // Borrows
        .route("/borrows", post(borrows::create_borrow).get(borrows::list_borrows))
        .route("/borrows/my", get(borrows::my_borrows))
        .route("/borrows/check/:book_id", get(borrows::check_borrowed))
        .route("/borrows/:id/return", put(borrows::return_borrow))
        .route("/borrows/:id/overdue", put(borrows::mark_overdue))
        // Reports
        .route("/reports/top-books", get(reports::top_books))
        .route("/reports/top-genres", get(reports::top_genres))
        .route("/reports/top-users", get(reports::top_users))
        .route("/reports/bestsellers", get(reports::bestsellers))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{
            AppConfig, AuthConfig, BestsellersConfig, ClientConfig, DatabaseConfig, EmailConfig,
            LoggingConfig, ServerConfig,
        },
        models::genre::CreateGenre,
        repository::Repository,
        services::Services,
    };
    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, header::COOKIE, header::SET_COOKIE, HeaderValue, StatusCode},
    };
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;
    use tower::ServiceExt;

    #[test]
    fn test_token_from_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; token=xyz"));
        assert_eq!(extract_token(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(COOKIE, HeaderValue::from_static("token=from-cookie"));
        assert_eq!(extract_token(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_no_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert!(extract_token(&headers).is_none());
        assert!(extract_token(&HeaderMap::new()).is_none());
    }

    fn json_request(body: &'static str) -> Request {
        axum::http::Request::builder()
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_json_accepts_valid_body() {
        let ValidJson(genre) = ValidJson::<CreateGenre>::from_request(json_request(r#"{"name": "Poetry"}"#), &())
            .await
            .unwrap();
        assert_eq!(genre.name, "Poetry");
    }

    #[tokio::test]
    async fn test_valid_json_rejects_invalid_body() {
        let result = ValidJson::<CreateGenre>::from_request(json_request(r#"{"name": ""}"#), &()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = ValidJson::<CreateGenre>::from_request(json_request(r#"{"nam": 1}"#), &()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    /// Router over a pool that never connects; only routes that fail before
    /// touching the database are exercised
    fn test_router() -> Router {
        let config = AppConfig {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::default(),
            email: EmailConfig::default(),
            client: ClientConfig::default(),
            bestsellers: BestsellersConfig::default(),
        };
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .unwrap();
        let services = Services::new(Repository::new(pool), &config).unwrap();
        routes(AppState {
            config: Arc::new(config),
            services: Arc::new(services),
        })
    }

    fn bearer_token() -> String {
        UserClaims::new(1, 1)
            .create_token(&AuthConfig::default().jwt_secret)
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_route() {
        let response = test_router()
            .oneshot(axum::http::Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        for (method, uri) in [
            ("POST", "/borrows"),
            ("GET", "/borrows/my"),
            ("GET", "/borrows/check/1"),
            ("PUT", "/borrows/1/return"),
            ("GET", "/reports/top-books"),
            ("GET", "/users"),
            ("GET", "/auth/me"),
        ] {
            let response = test_router()
                .oneshot(
                    axum::http::Request::builder()
                        .method(method)
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        }
    }

    #[tokio::test]
    async fn test_forged_token_is_rejected() {
        let forged = UserClaims::new(1, 1).create_token("another-secret").unwrap();
        let response = test_router()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/borrows/my")
                    .header(AUTHORIZATION, format!("Bearer {}", forged))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_borrow_without_book_and_due_date_is_bad_request() {
        let response = test_router()
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri("/borrows")
                    .header(COOKIE, format!("{}={}", AUTH_COOKIE, bearer_token()))
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let response = test_router()
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri("/auth/logout")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(cookie.starts_with("token="));
    }
}
