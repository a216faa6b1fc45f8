//! Data models for Fon Library

pub mod author;
pub mod book;
pub mod borrow;
pub mod genre;
pub mod report;
pub mod user;

use serde::{Deserialize, Deserializer};

// Re-export commonly used types
pub use author::Author;
pub use book::Book;
pub use borrow::{Borrow, BorrowStatus};
pub use genre::Genre;
pub use user::User;

/// Deserialize a string, trimming surrounding whitespace
pub(crate) fn trim_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(s.trim().to_string())
}

/// Deserialize an optional string, trimming surrounding whitespace
pub(crate) fn trim_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    Ok(s.map(|s| s.trim().to_string()))
}
