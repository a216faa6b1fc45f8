//! Authors repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::author::{Author, AuthorInput},
};

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>("SELECT * FROM authors ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(authors)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Author not found".to_string()))
    }

    pub async fn create(&self, author: &AuthorInput) -> AppResult<Author> {
        let created = sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (name, birth, nationality)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&author.name)
        .bind(author.birth)
        .bind(&author.nationality)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Replace every field of an author
    pub async fn update(&self, id: i32, author: &AuthorInput) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(
            r#"
            UPDATE authors SET name = $2, birth = $3, nationality = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&author.name)
        .bind(author.birth)
        .bind(&author.nationality)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Author not found".to_string()))
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Author not found".to_string()));
        }

        Ok(())
    }
}
