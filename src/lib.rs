//! Fon Library server
//!
//! REST JSON API for a small library: librarians manage books, genres and
//! authors; patrons browse, search and borrow books; administrators follow
//! loans and borrowing statistics.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
