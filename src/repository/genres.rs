//! Genres repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::genre::{CreateGenre, Genre, UpdateGenre},
};

#[derive(Clone)]
pub struct GenresRepository {
    pool: Pool<Postgres>,
}

impl GenresRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List genres ordered by name
    pub async fn list(&self) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>("SELECT * FROM genres ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(genres)
    }

    /// Get genre by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>("SELECT * FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Genre not found".to_string()))
    }

    /// Find a genre by its exact name
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Genre>> {
        let genre = sqlx::query_as::<_, Genre>("SELECT * FROM genres WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(genre)
    }

    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM genres WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Create a new genre
    pub async fn create(&self, genre: &CreateGenre) -> AppResult<Genre> {
        let created = sqlx::query_as::<_, Genre>(
            r#"
            INSERT INTO genres (name, description)
            VALUES ($1, COALESCE($2, ''))
            RETURNING *
            "#,
        )
        .bind(&genre.name)
        .bind(&genre.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Update a genre; absent fields keep their value
    pub async fn update(&self, id: i32, genre: &UpdateGenre) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>(
            r#"
            UPDATE genres SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&genre.name)
        .bind(&genre.description)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Genre not found".to_string()))
    }

    /// Delete a genre that no book references
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let in_use: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE genre_id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if in_use {
            return Err(AppError::InUse("Genre is used by existing books".to_string()));
        }

        let result = sqlx::query("DELETE FROM genres WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Genre not found".to_string()));
        }

        Ok(())
    }
}
