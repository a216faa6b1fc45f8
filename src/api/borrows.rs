//! Borrow endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::borrow::{Borrow, BorrowCheck, BorrowDetails, CreateBorrowRequest},
    AppState,
};

use super::{AdminUser, AuthenticatedUser};

/// Borrow a book
#[utoipa::path(
    post,
    path = "/borrows",
    tag = "borrows",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    request_body = CreateBorrowRequest,
    responses(
        (status = 201, description = "Borrow created", body = Borrow),
        (status = 400, description = "Book and due date are required, or due date is not after borrow date"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn create_borrow(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    body: Result<Json<CreateBorrowRequest>, axum::extract::rejection::JsonRejection>,
) -> AppResult<(StatusCode, Json<Borrow>)> {
    let Json(request) = body.map_err(|e| AppError::Validation(e.body_text()))?;

    let borrow = state
        .services
        .borrows
        .create_borrow(claims.user_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(borrow)))
}

/// List every borrow (overdue first)
#[utoipa::path(
    get,
    path = "/borrows",
    tag = "borrows",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "All borrows", body = Vec<BorrowDetails>),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn list_borrows(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<Json<Vec<BorrowDetails>>> {
    let borrows = state.services.borrows.list_all().await?;
    Ok(Json(borrows))
}

/// List the caller's borrows (overdue first)
#[utoipa::path(
    get,
    path = "/borrows/my",
    tag = "borrows",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "Caller's borrows", body = Vec<BorrowDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_borrows(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowDetails>>> {
    let borrows = state.services.borrows.list_for_user(claims.user_id).await?;
    Ok(Json(borrows))
}

/// Check whether the caller holds an unreturned copy of a book
#[utoipa::path(
    get,
    path = "/borrows/check/{book_id}",
    tag = "borrows",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(
        ("book_id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Borrow check", body = BorrowCheck),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn check_borrowed(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<Json<BorrowCheck>> {
    let check = state
        .services
        .borrows
        .check_if_borrowed(claims.user_id, book_id)
        .await?;
    Ok(Json(check))
}

/// Return one of the caller's borrows
#[utoipa::path(
    put,
    path = "/borrows/{id}/return",
    tag = "borrows",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(
        ("id" = i32, Path, description = "Borrow ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = Borrow),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Borrow record not found")
    )
)]
pub async fn return_borrow(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Borrow>> {
    let borrow = state
        .services
        .borrows
        .return_borrow(id, claims.user_id)
        .await?;
    Ok(Json(borrow))
}

/// Mark a borrow as overdue
#[utoipa::path(
    put,
    path = "/borrows/{id}/overdue",
    tag = "borrows",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(
        ("id" = i32, Path, description = "Borrow ID")
    ),
    responses(
        (status = 200, description = "Borrow marked overdue", body = Borrow),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Borrow record not found")
    )
)]
pub async fn mark_overdue(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Borrow>> {
    let borrow = state.services.borrows.mark_overdue(id).await?;
    Ok(Json(borrow))
}
