//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, borrows, genres, health, reports, users};

/// Registers the bearer header and session cookie schemes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(super::AUTH_COOKIE))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Fon Library API",
        version = "1.0.0",
        description = "Library management REST API: catalog, borrowing and reports",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    modifiers(&SecurityAddon),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        auth::verify_email,
        auth::forgot_password,
        auth::reset_password,
        // Books
        books::list_books,
        books::list_all_books,
        books::top_available_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Genres
        genres::list_genres,
        genres::get_genre,
        genres::create_genre,
        genres::update_genre,
        genres::delete_genre,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Users
        users::list_users,
        users::get_user_borrow_stats,
        users::update_role,
        // Borrows
        borrows::create_borrow,
        borrows::list_borrows,
        borrows::my_borrows,
        borrows::check_borrowed,
        borrows::return_borrow,
        borrows::mark_overdue,
        // Reports
        reports::top_books,
        reports::top_genres,
        reports::top_users,
        reports::bestsellers,
    ),
    components(
        schemas(
            // Auth
            auth::MessageResponse,
            auth::UserMessageResponse,
            auth::LoginResponse,
            crate::models::user::RegisterUser,
            crate::models::user::LoginRequest,
            crate::models::user::VerifyEmailRequest,
            crate::models::user::ForgotPasswordRequest,
            crate::models::user::ResetPasswordRequest,
            // Books
            books::PaginatedBooks,
            crate::models::book::Book,
            crate::models::book::GenreRef,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Genres
            crate::models::genre::Genre,
            crate::models::genre::CreateGenre,
            crate::models::genre::UpdateGenre,
            // Authors
            crate::models::author::Author,
            crate::models::author::AuthorInput,
            // Users
            crate::models::user::User,
            crate::models::user::UpdateRoleRequest,
            // Borrows
            crate::models::borrow::Borrow,
            crate::models::borrow::BorrowStatus,
            crate::models::borrow::BorrowDetails,
            crate::models::borrow::BorrowerRef,
            crate::models::borrow::BorrowedBookRef,
            crate::models::borrow::BorrowCheck,
            crate::models::borrow::CreateBorrowRequest,
            // Reports
            crate::models::report::TopBook,
            crate::models::report::TopGenre,
            crate::models::report::TopUser,
            crate::models::report::UserBorrowStats,
            crate::models::report::BestsellerBook,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Accounts and sessions"),
        (name = "books", description = "Book catalog"),
        (name = "genres", description = "Genres"),
        (name = "authors", description = "Authors"),
        (name = "users", description = "User management"),
        (name = "borrows", description = "Borrowing and returns"),
        (name = "reports", description = "Borrow statistics and best-sellers")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
