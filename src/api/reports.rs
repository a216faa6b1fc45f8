//! Reporting endpoints (admin only)

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::report::{BestsellerBook, TopBook, TopGenre, TopUser},
    AppState,
};

use super::AdminUser;

/// Five most borrowed books
#[utoipa::path(
    get,
    path = "/reports/top-books",
    tag = "reports",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "Most borrowed books", body = Vec<TopBook>),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn top_books(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<Json<Vec<TopBook>>> {
    Ok(Json(state.services.reports.top_books().await?))
}

/// Five most borrowed genres
#[utoipa::path(
    get,
    path = "/reports/top-genres",
    tag = "reports",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "Most borrowed genres", body = Vec<TopGenre>),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn top_genres(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<Json<Vec<TopGenre>>> {
    Ok(Json(state.services.reports.top_genres().await?))
}

/// Three most active borrowers
#[utoipa::path(
    get,
    path = "/reports/top-users",
    tag = "reports",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "Most active borrowers", body = Vec<TopUser>),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn top_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<Json<Vec<TopUser>>> {
    Ok(Json(state.services.reports.top_users().await?))
}

/// Current best-sellers from the New York Times
#[utoipa::path(
    get,
    path = "/reports/bestsellers",
    tag = "reports",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "Best-seller suggestions", body = Vec<BestsellerBook>),
        (status = 403, description = "Admin access required"),
        (status = 502, description = "Best-seller service unavailable")
    )
)]
pub async fn bestsellers(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<Json<Vec<BestsellerBook>>> {
    Ok(Json(state.services.bestsellers.overview().await?))
}
