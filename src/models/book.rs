//! Book (catalog entry) model and related types

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{trim_opt_string, trim_string};
use crate::error::{AppError, AppResult};

/// Cover shown when a book has no image of its own
pub const DEFAULT_COVER_IMAGE_URL: &str =
    "https://d827xgdhgqbnd.cloudfront.net/wp-content/uploads/2016/04/09121712/book-cover-placeholder.png";

/// Default page size for book listings
pub const DEFAULT_PAGE_SIZE: i64 = 12;
/// Upper bound on `limit` for book listings
pub const MAX_PAGE_SIZE: i64 = 100;

/// Genre reference embedded in book responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenreRef {
    pub id: i32,
    pub name: String,
}

/// Internal row structure (books joined with genres)
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    id: i32,
    title: String,
    author: String,
    description: Option<String>,
    genre_id: i32,
    genre_name: String,
    total_copies: i32,
    available_copies: i32,
    cover_image_url: String,
    published_year: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: row.id,
            title: row.title,
            author: row.author,
            description: row.description,
            genre: GenreRef {
                id: row.genre_id,
                name: row.genre_name,
            },
            total_copies: row.total_copies,
            available_copies: row.available_copies,
            cover_image_url: row.cover_image_url,
            published_year: row.published_year,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Book with its genre
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    /// Free-text author name
    pub author: String,
    pub description: Option<String>,
    pub genre: GenreRef,
    pub total_copies: i32,
    /// Remaining loanable copies; may drift below zero under concurrent borrows
    pub available_copies: i32,
    pub cover_image_url: String,
    pub published_year: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sort order for book listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookSort {
    /// Most available copies first
    Copies,
    /// Most recently published first
    Year,
}

impl BookSort {
    /// Parse the `sort` query value; unknown values mean insertion order
    pub fn from_param(value: &str) -> Option<BookSort> {
        match value {
            "copies" => Some(BookSort::Copies),
            "year" => Some(BookSort::Year),
            _ => None,
        }
    }

    pub fn order_by(sort: Option<BookSort>) -> &'static str {
        match sort {
            Some(BookSort::Copies) => "b.available_copies DESC, b.id",
            Some(BookSort::Year) => "b.published_year DESC, b.id",
            None => "b.id",
        }
    }
}

/// Book listing query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Page number (default: 1)
    pub page: Option<i64>,
    /// Books per page (default: 12, at most 100)
    pub limit: Option<i64>,
    /// Genre name; ignored when no genre has this name
    pub genre: Option<String>,
    /// Case-insensitive match on title or author
    pub search: Option<String>,
    /// "copies" (most available first) or "year" (newest first)
    pub sort: Option<String>,
}

impl BookQuery {
    pub fn page(&self) -> i64 {
        self.page.filter(|p| *p >= 1).unwrap_or(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .filter(|l| *l >= 1)
            .map(|l| l.min(MAX_PAGE_SIZE))
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }

    pub fn sort(&self) -> Option<BookSort> {
        self.sort.as_deref().and_then(BookSort::from_param)
    }
}

/// Number of pages needed to show `total` rows, `per_page` at a time
pub fn page_count(total: i64, per_page: i64) -> i64 {
    if per_page <= 0 {
        return 0;
    }
    total / per_page + i64::from(total % per_page > 0)
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[serde(deserialize_with = "trim_string")]
    #[validate(length(min = 1, message = "Enter book's title"))]
    pub title: String,
    #[serde(deserialize_with = "trim_string")]
    #[validate(length(min = 1, message = "Enter book's author"))]
    pub author: String,
    #[serde(default)]
    pub description: Option<String>,
    pub genre_id: i32,
    #[validate(range(min = 1, message = "Total copies must be at least 1"))]
    pub total_copies: i32,
    #[validate(range(min = 0, message = "Available copies cannot be negative"))]
    pub available_copies: i32,
    #[serde(default, deserialize_with = "trim_opt_string")]
    pub cover_image_url: Option<String>,
    #[validate(range(min = 1450, message = "Published year must be after 1450"))]
    pub published_year: i32,
}

/// Update book request (only provided fields change)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[serde(default, deserialize_with = "trim_opt_string")]
    #[validate(length(min = 1, message = "Enter book's title"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "trim_opt_string")]
    #[validate(length(min = 1, message = "Enter book's author"))]
    pub author: Option<String>,
    pub description: Option<String>,
    pub genre_id: Option<i32>,
    #[validate(range(min = 1, message = "Total copies must be at least 1"))]
    pub total_copies: Option<i32>,
    #[validate(range(min = 0, message = "Available copies cannot be negative"))]
    pub available_copies: Option<i32>,
    #[serde(default, deserialize_with = "trim_opt_string")]
    pub cover_image_url: Option<String>,
    #[validate(range(min = 1450, message = "Published year must be after 1450"))]
    pub published_year: Option<i32>,
}

/// Reject publication years later than the current one
pub fn ensure_not_future_year(year: i32) -> AppResult<()> {
    if year > Utc::now().year() {
        return Err(AppError::Validation(
            "Published year cannot be in the future".to_string(),
        ));
    }
    Ok(())
}
