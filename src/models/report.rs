//! Reporting models (borrow aggregations and best-seller suggestions)

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::BorrowStatus;

/// Number of entries in each ranking
pub const TOP_BOOKS_LIMIT: i64 = 5;
pub const TOP_GENRES_LIMIT: i64 = 5;
pub const TOP_USERS_LIMIT: i64 = 3;

/// Most borrowed book
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TopBook {
    pub book_id: i32,
    pub title: String,
    pub author: String,
    pub cover_image_url: String,
    pub borrow_count: i64,
}

/// Most borrowed genre
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TopGenre {
    pub genre_id: i32,
    pub name: String,
    pub borrow_count: i64,
}

/// Most active borrower
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TopUser {
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub borrow_count: i64,
}

/// Per-status borrow counts for one user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserBorrowStats {
    pub borrowed: i64,
    pub returned: i64,
    pub overdue: i64,
    pub total: i64,
}

impl UserBorrowStats {
    pub fn tally<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = BorrowStatus>,
    {
        statuses
            .into_iter()
            .fold(Self::default(), |mut stats, status| {
                match status {
                    BorrowStatus::Borrowed => stats.borrowed += 1,
                    BorrowStatus::Returned => stats.returned += 1,
                    BorrowStatus::Overdue => stats.overdue += 1,
                }
                stats.total += 1;
                stats
            })
    }
}

/// A best-seller suggestion from the external list API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BestsellerBook {
    #[serde(default)]
    pub rank: i32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub primary_isbn13: String,
    pub book_image: Option<String>,
    pub amazon_product_url: Option<String>,
}
