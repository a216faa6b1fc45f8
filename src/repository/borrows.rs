//! Borrows repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::borrow::{Borrow, BorrowDetails, BorrowDetailsRow, BorrowStatus, NewBorrow},
};

/// Storage operations used by the borrow workflow
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BorrowStore: Send + Sync {
    async fn book_exists(&self, book_id: i32) -> AppResult<bool>;

    /// Insert a loan with status `borrowed`
    async fn insert(&self, user_id: i32, borrow: NewBorrow) -> AppResult<Borrow>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Borrow>>;

    /// Set return date and status `returned`
    async fn mark_returned(&self, id: i32, returned_at: DateTime<Utc>) -> AppResult<Borrow>;

    /// Overwrite the status; None when the borrow does not exist
    async fn set_status(&self, id: i32, status: BorrowStatus) -> AppResult<Option<Borrow>>;

    /// Latest borrow of `book_id` by `user_id` that is not returned
    async fn find_outstanding(&self, user_id: i32, book_id: i32) -> AppResult<Option<Borrow>>;

    /// Add `delta` to the book's available copies, with no floor
    async fn adjust_available_copies(&self, book_id: i32, delta: i32) -> AppResult<()>;

    async fn statuses_for_user(&self, user_id: i32) -> AppResult<Vec<BorrowStatus>>;

    async fn list_all(&self) -> AppResult<Vec<BorrowDetails>>;

    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<BorrowDetails>>;
}

const DETAILS_SELECT: &str = r#"
    SELECT br.id, br.user_id, br.book_id, br.borrow_date, br.due_date, br.return_date, br.status,
           u.name AS user_name, u.email AS user_email,
           b.title AS book_title, b.author AS book_author, b.cover_image_url AS book_cover_image_url
    FROM borrows br
    LEFT JOIN users u ON u.id = br.user_id
    LEFT JOIN books b ON b.id = br.book_id
"#;

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BorrowStore for BorrowsRepository {
    async fn book_exists(&self, book_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(book_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn insert(&self, user_id: i32, borrow: NewBorrow) -> AppResult<Borrow> {
        let created = sqlx::query_as::<_, Borrow>(
            r#"
            INSERT INTO borrows (user_id, book_id, borrow_date, due_date, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(borrow.book_id)
        .bind(borrow.borrow_date)
        .bind(borrow.due_date)
        .bind(BorrowStatus::Borrowed)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Borrow>> {
        let borrow = sqlx::query_as::<_, Borrow>("SELECT * FROM borrows WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(borrow)
    }

    async fn mark_returned(&self, id: i32, returned_at: DateTime<Utc>) -> AppResult<Borrow> {
        let borrow = sqlx::query_as::<_, Borrow>(
            r#"
            UPDATE borrows SET return_date = $2, status = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(returned_at)
        .bind(BorrowStatus::Returned)
        .fetch_one(&self.pool)
        .await?;
        Ok(borrow)
    }

    async fn set_status(&self, id: i32, status: BorrowStatus) -> AppResult<Option<Borrow>> {
        let borrow = sqlx::query_as::<_, Borrow>(
            "UPDATE borrows SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(borrow)
    }

    async fn find_outstanding(&self, user_id: i32, book_id: i32) -> AppResult<Option<Borrow>> {
        let borrow = sqlx::query_as::<_, Borrow>(
            r#"
            SELECT * FROM borrows
            WHERE user_id = $1 AND book_id = $2 AND status != $3
            ORDER BY borrow_date DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(BorrowStatus::Returned)
        .fetch_optional(&self.pool)
        .await?;
        Ok(borrow)
    }

    async fn adjust_available_copies(&self, book_id: i32, delta: i32) -> AppResult<()> {
        sqlx::query(
            "UPDATE books SET available_copies = available_copies + $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(book_id)
        .bind(delta)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn statuses_for_user(&self, user_id: i32) -> AppResult<Vec<BorrowStatus>> {
        let statuses = sqlx::query_scalar::<_, BorrowStatus>(
            "SELECT status FROM borrows WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(statuses)
    }

    async fn list_all(&self) -> AppResult<Vec<BorrowDetails>> {
        let rows = sqlx::query_as::<_, BorrowDetailsRow>(&format!(
            "{} ORDER BY br.borrow_date DESC, br.id DESC",
            DETAILS_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(BorrowDetails::from).collect())
    }

    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<BorrowDetails>> {
        let rows = sqlx::query_as::<_, BorrowDetailsRow>(&format!(
            "{} WHERE br.user_id = $1 ORDER BY br.borrow_date DESC, br.id DESC",
            DETAILS_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(BorrowDetails::from).collect())
    }
}
