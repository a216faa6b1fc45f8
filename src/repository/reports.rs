//! Reporting queries over the borrow history

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::report::{TopBook, TopGenre, TopUser},
};

#[derive(Clone)]
pub struct ReportsRepository {
    pool: Pool<Postgres>,
}

impl ReportsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Books ranked by number of borrows
    pub async fn top_books(&self, limit: i64) -> AppResult<Vec<TopBook>> {
        let books = sqlx::query_as::<_, TopBook>(
            r#"
            SELECT b.id AS book_id, b.title, b.author, b.cover_image_url,
                   COUNT(br.id) AS borrow_count
            FROM borrows br
            JOIN books b ON b.id = br.book_id
            GROUP BY b.id, b.title, b.author, b.cover_image_url
            ORDER BY borrow_count DESC, b.id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Genres ranked by number of borrows of their books
    pub async fn top_genres(&self, limit: i64) -> AppResult<Vec<TopGenre>> {
        let genres = sqlx::query_as::<_, TopGenre>(
            r#"
            SELECT g.id AS genre_id, g.name, COUNT(br.id) AS borrow_count
            FROM borrows br
            JOIN books b ON b.id = br.book_id
            JOIN genres g ON g.id = b.genre_id
            GROUP BY g.id, g.name
            ORDER BY borrow_count DESC, g.id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(genres)
    }

    /// Users ranked by number of borrows
    pub async fn top_users(&self, limit: i64) -> AppResult<Vec<TopUser>> {
        let users = sqlx::query_as::<_, TopUser>(
            r#"
            SELECT u.id AS user_id, u.name, u.email, COUNT(br.id) AS borrow_count
            FROM borrows br
            JOIN users u ON u.id = br.user_id
            GROUP BY u.id, u.name, u.email
            ORDER BY borrow_count DESC, u.id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}
