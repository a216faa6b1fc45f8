//! Genre endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::genre::{CreateGenre, Genre, UpdateGenre},
    AppState,
};

use super::{AdminUser, ValidJson};

/// List genres sorted by name
#[utoipa::path(
    get,
    path = "/genres",
    tag = "genres",
    responses(
        (status = 200, description = "List of genres", body = Vec<Genre>)
    )
)]
pub async fn list_genres(State(state): State<AppState>) -> AppResult<Json<Vec<Genre>>> {
    let genres = state.services.catalog.list_genres().await?;
    Ok(Json(genres))
}

/// Get genre by ID
#[utoipa::path(
    get,
    path = "/genres/{id}",
    tag = "genres",
    params(
        ("id" = i32, Path, description = "Genre ID")
    ),
    responses(
        (status = 200, description = "Genre details", body = Genre),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn get_genre(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Genre>> {
    let genre = state.services.catalog.get_genre(id).await?;
    Ok(Json(genre))
}

/// Create a genre
#[utoipa::path(
    post,
    path = "/genres",
    tag = "genres",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    request_body = CreateGenre,
    responses(
        (status = 201, description = "Genre created", body = Genre),
        (status = 400, description = "Name is missing"),
        (status = 409, description = "Genre name already exists")
    )
)]
pub async fn create_genre(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ValidJson(genre): ValidJson<CreateGenre>,
) -> AppResult<(StatusCode, Json<Genre>)> {
    let created = state.services.catalog.create_genre(genre).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a genre
#[utoipa::path(
    put,
    path = "/genres/{id}",
    tag = "genres",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(
        ("id" = i32, Path, description = "Genre ID")
    ),
    request_body = UpdateGenre,
    responses(
        (status = 200, description = "Genre updated", body = Genre),
        (status = 404, description = "Genre not found"),
        (status = 409, description = "Genre name already exists")
    )
)]
pub async fn update_genre(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i32>,
    ValidJson(genre): ValidJson<UpdateGenre>,
) -> AppResult<Json<Genre>> {
    let updated = state.services.catalog.update_genre(id, genre).await?;
    Ok(Json(updated))
}

/// Delete a genre
#[utoipa::path(
    delete,
    path = "/genres/{id}",
    tag = "genres",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(
        ("id" = i32, Path, description = "Genre ID")
    ),
    responses(
        (status = 204, description = "Genre deleted"),
        (status = 404, description = "Genre not found"),
        (status = 409, description = "Genre is used by existing books")
    )
)]
pub async fn delete_genre(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_genre(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
