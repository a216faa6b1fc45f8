//! Reporting over the borrow history

use std::sync::Arc;

use crate::{
    error::AppResult,
    models::report::{
        TopBook, TopGenre, TopUser, UserBorrowStats, TOP_BOOKS_LIMIT, TOP_GENRES_LIMIT,
        TOP_USERS_LIMIT,
    },
    repository::{reports::ReportsRepository, BorrowStore},
};

/// Aggregations are recomputed on every call
#[derive(Clone)]
pub struct ReportsService {
    reports: ReportsRepository,
    borrows: Arc<dyn BorrowStore>,
}

impl ReportsService {
    pub fn new(reports: ReportsRepository, borrows: Arc<dyn BorrowStore>) -> Self {
        Self { reports, borrows }
    }

    pub async fn top_books(&self) -> AppResult<Vec<TopBook>> {
        self.reports.top_books(TOP_BOOKS_LIMIT).await
    }

    pub async fn top_genres(&self) -> AppResult<Vec<TopGenre>> {
        self.reports.top_genres(TOP_GENRES_LIMIT).await
    }

    pub async fn top_users(&self) -> AppResult<Vec<TopUser>> {
        self.reports.top_users(TOP_USERS_LIMIT).await
    }

    /// Per-status borrow counts for one user
    pub async fn user_borrow_stats(&self, user_id: i32) -> AppResult<UserBorrowStats> {
        let statuses = self.borrows.statuses_for_user(user_id).await?;
        Ok(UserBorrowStats::tally(statuses))
    }
}
