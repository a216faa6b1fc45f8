//! Borrow (loan) model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Loan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BorrowStatus {
    Borrowed,
    Returned,
    Overdue,
}

impl BorrowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowStatus::Borrowed => "borrowed",
            BorrowStatus::Returned => "returned",
            BorrowStatus::Overdue => "overdue",
        }
    }

    /// Listing order: overdue loans first, returned ones last
    pub fn sort_rank(&self) -> u8 {
        match self {
            BorrowStatus::Overdue => 0,
            BorrowStatus::Borrowed => 1,
            BorrowStatus::Returned => 2,
        }
    }

    /// A loan still holds a copy until it is returned
    pub fn is_outstanding(&self) -> bool {
        *self != BorrowStatus::Returned
    }
}

impl std::fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BorrowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "borrowed" => Ok(BorrowStatus::Borrowed),
            "returned" => Ok(BorrowStatus::Returned),
            "overdue" => Ok(BorrowStatus::Overdue),
            _ => Err(format!("Invalid borrow status: {}", s)),
        }
    }
}

// SQLx conversion for BorrowStatus (stored as VARCHAR)
impl sqlx::Type<Postgres> for BorrowStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for BorrowStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: &str = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BorrowStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Borrow record from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Borrow {
    pub id: i32,
    pub user_id: i32,
    /// None once the book has been deleted from the catalog
    pub book_id: Option<i32>,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: BorrowStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create borrow request body
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateBorrowRequest {
    /// Book to borrow
    pub book_id: Option<i32>,
    /// Due date, RFC 3339 timestamp or plain `YYYY-MM-DD` (midnight UTC)
    #[serde(default, deserialize_with = "deserialize_due_date")]
    #[schema(value_type = Option<String>)]
    pub due_date: Option<DateTime<Utc>>,
}

fn deserialize_due_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Some(dt.and_utc()))
        .ok_or_else(|| serde::de::Error::custom(format!("invalid due date: {}", raw)))
}

/// A validated loan ready to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewBorrow {
    pub book_id: i32,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
}

impl NewBorrow {
    /// Validate a borrow request against the moment it is made
    pub fn from_request(request: CreateBorrowRequest, now: DateTime<Utc>) -> AppResult<Self> {
        let (Some(book_id), Some(due_date)) = (request.book_id, request.due_date) else {
            return Err(AppError::BadRequest(
                "Book and due date are required".to_string(),
            ));
        };

        if due_date <= now {
            return Err(AppError::Validation(
                "Due date must be after borrow date".to_string(),
            ));
        }

        Ok(Self {
            book_id,
            borrow_date: now,
            due_date,
        })
    }
}

/// Borrower summary embedded in borrow listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowerRef {
    pub id: i32,
    pub name: String,
    pub email: String,
}

/// Book summary embedded in borrow listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowedBookRef {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub cover_image_url: String,
}

/// Internal row structure for borrow listings (LEFT JOIN users, books)
#[derive(Debug, Clone, FromRow)]
pub struct BorrowDetailsRow {
    id: i32,
    user_id: i32,
    book_id: Option<i32>,
    borrow_date: DateTime<Utc>,
    due_date: DateTime<Utc>,
    return_date: Option<DateTime<Utc>>,
    status: BorrowStatus,
    user_name: Option<String>,
    user_email: Option<String>,
    book_title: Option<String>,
    book_author: Option<String>,
    book_cover_image_url: Option<String>,
}

impl From<BorrowDetailsRow> for BorrowDetails {
    fn from(row: BorrowDetailsRow) -> Self {
        let user = match (row.user_name, row.user_email) {
            (Some(name), Some(email)) => Some(BorrowerRef {
                id: row.user_id,
                name,
                email,
            }),
            _ => None,
        };
        let book = match (row.book_id, row.book_title) {
            (Some(id), Some(title)) => Some(BorrowedBookRef {
                id,
                title,
                author: row.book_author.unwrap_or_default(),
                cover_image_url: row.book_cover_image_url.unwrap_or_default(),
            }),
            _ => None,
        };
        BorrowDetails {
            id: row.id,
            user_id: row.user_id,
            book_id: row.book_id,
            borrow_date: row.borrow_date,
            due_date: row.due_date,
            return_date: row.return_date,
            status: row.status,
            user,
            book,
        }
    }
}

/// Borrow with borrower and book summaries
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowDetails {
    pub id: i32,
    pub user_id: i32,
    pub book_id: Option<i32>,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: BorrowStatus,
    pub user: Option<BorrowerRef>,
    pub book: Option<BorrowedBookRef>,
}

/// Order borrows overdue, borrowed, returned; stable within a status
pub fn sort_by_status(borrows: &mut [BorrowDetails]) {
    borrows.sort_by_key(|b| b.status.sort_rank());
}

/// Result of checking whether a user still holds a copy of a book
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowCheck {
    pub borrowed: bool,
    pub message: String,
}

impl BorrowCheck {
    pub fn new(borrowed: bool) -> Self {
        let message = if borrowed {
            "User has already borrowed this book"
        } else {
            "User has not borrowed this book yet"
        };
        Self {
            borrowed,
            message: message.to_string(),
        }
    }
}
