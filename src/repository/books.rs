//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, BookRow, BookSort, CreateBook, UpdateBook},
};

const BOOK_SELECT: &str = r#"
    SELECT b.id, b.title, b.author, b.description, b.genre_id, g.name AS genre_name,
           b.total_copies, b.available_copies, b.cover_image_url, b.published_year,
           b.created_at, b.updated_at
    FROM books b
    JOIN genres g ON g.id = b.genre_id
"#;

/// Escape LIKE wildcards so user input matches literally
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        let row = sqlx::query_as::<_, BookRow>(&format!("{} WHERE b.id = $1", BOOK_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;

        Ok(row.into())
    }

    /// Check if a book exists
    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Search books with pagination; `genre_id` is the already resolved genre filter
    pub async fn search(&self, query: &BookQuery, genre_id: Option<i32>) -> AppResult<(Vec<Book>, i64)> {
        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            params.push(format!("%{}%", escape_like(search)));
            conditions.push(format!(
                "(b.title ILIKE ${0} OR b.author ILIKE ${0})",
                params.len()
            ));
        }

        if let Some(genre_id) = genre_id {
            conditions.push(format!("b.genre_id = {}", genre_id));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_query = format!("SELECT COUNT(*) FROM books b {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_builder = count_builder.bind(param);
        }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_query = format!(
            "{} {} ORDER BY {} LIMIT {} OFFSET {}",
            BOOK_SELECT,
            where_clause,
            BookSort::order_by(query.sort()),
            query.limit(),
            query.offset()
        );
        let mut select_builder = sqlx::query_as::<_, BookRow>(&select_query);
        for param in &params {
            select_builder = select_builder.bind(param);
        }
        let rows = select_builder.fetch_all(&self.pool).await?;

        Ok((rows.into_iter().map(Book::from).collect(), total))
    }

    /// All books, unfiltered
    pub async fn list_all(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(&format!("{} ORDER BY b.id", BOOK_SELECT))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Book::from).collect())
    }

    /// Books with the most available copies
    pub async fn top_available(&self, limit: i64) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "{} ORDER BY b.available_copies DESC, b.id LIMIT $1",
            BOOK_SELECT
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Book::from).collect())
    }

    /// Create a new book
    pub async fn create(&self, book: &CreateBook, cover_image_url: &str) -> AppResult<Book> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, author, description, genre_id, total_copies,
                               available_copies, cover_image_url, published_year)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.description)
        .bind(book.genre_id)
        .bind(book.total_copies)
        .bind(book.available_copies)
        .bind(cover_image_url)
        .bind(book.published_year)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Update a book; absent fields keep their value
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
        let result = sqlx::query(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                author = COALESCE($3, author),
                description = COALESCE($4, description),
                genre_id = COALESCE($5, genre_id),
                total_copies = COALESCE($6, total_copies),
                available_copies = COALESCE($7, available_copies),
                cover_image_url = COALESCE($8, cover_image_url),
                published_year = COALESCE($9, published_year),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.description)
        .bind(book.genre_id)
        .bind(book.total_copies)
        .bind(book.available_copies)
        .bind(&book.cover_image_url)
        .bind(book.published_year)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Book not found".to_string()));
        }

        self.get_by_id(id).await
    }

    /// Delete a book; its borrow history is kept with the book reference cleared
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Book not found".to_string()));
        }

        Ok(())
    }
}
