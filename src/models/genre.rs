//! Genre model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{trim_opt_string, trim_string};

/// Genre from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create genre request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateGenre {
    #[serde(deserialize_with = "trim_string")]
    #[validate(length(min = 1, max = 255, message = "Genre's name is required"))]
    pub name: String,
    #[serde(default, deserialize_with = "trim_opt_string")]
    pub description: Option<String>,
}

/// Update genre request (only provided fields change)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateGenre {
    #[serde(default, deserialize_with = "trim_opt_string")]
    #[validate(length(min = 1, max = 255, message = "Genre's name cannot be empty"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "trim_opt_string")]
    pub description: Option<String>,
}
