//! Author model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::trim_string;

/// Author from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub name: String,
    pub birth: NaiveDate,
    pub nationality: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create or replace author request; every field is required
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AuthorInput {
    #[serde(deserialize_with = "trim_string")]
    #[validate(length(min = 1, max = 255, message = "Name is required (max 255 characters)"))]
    pub name: String,
    /// Birth date (YYYY-MM-DD)
    pub birth: NaiveDate,
    #[serde(deserialize_with = "trim_string")]
    #[validate(length(
        min = 1,
        max = 255,
        message = "Nationality is required (max 255 characters)"
    ))]
    pub nationality: String,
}
