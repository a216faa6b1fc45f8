//! User management endpoints (admin only)

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{
        report::UserBorrowStats,
        user::{UpdateRoleRequest, User},
    },
    AppState,
};

use super::{AdminUser, ValidJson};

/// List all users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "List of users", body = Vec<User>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<Json<Vec<User>>> {
    let users = state.services.users.list_users().await?;
    Ok(Json(users))
}

/// Borrow counts per status for one user
#[utoipa::path(
    get,
    path = "/users/{id}/borrows",
    tag = "users",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Borrow statistics", body = UserBorrowStats),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn get_user_borrow_stats(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i32>,
) -> AppResult<Json<UserBorrowStats>> {
    let stats = state.services.reports.user_borrow_stats(id).await?;
    Ok(Json(stats))
}

/// Grant or revoke administrator rights
#[utoipa::path(
    put,
    path = "/users/{id}/role",
    tag = "users",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = User),
        (status = 400, description = "`is_admin` must be a boolean"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_role(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i32>,
    ValidJson(request): ValidJson<UpdateRoleRequest>,
) -> AppResult<Json<User>> {
    let updated = state.services.users.update_role(id, &request.is_admin).await?;
    Ok(Json(updated))
}
