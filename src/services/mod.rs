//! Business logic services

pub mod bestsellers;
pub mod borrows;
pub mod catalog;
pub mod email;
pub mod reports;
pub mod users;

use std::sync::Arc;

use crate::{config::AppConfig, error::AppResult, repository::{BorrowStore, Repository}};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub users: users::UsersService,
    pub borrows: borrows::BorrowsService,
    pub reports: reports::ReportsService,
    pub bestsellers: bestsellers::BestsellersService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> AppResult<Self> {
        let email = email::EmailService::new(config.email.clone());
        let borrow_store: Arc<dyn BorrowStore> = Arc::new(repository.borrows.clone());

        Ok(Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            users: users::UsersService::new(
                repository.clone(),
                config.auth.clone(),
                config.client.url.clone(),
                email,
            ),
            borrows: borrows::BorrowsService::new(borrow_store.clone()),
            reports: reports::ReportsService::new(repository.reports.clone(), borrow_store),
            bestsellers: bestsellers::BestsellersService::new(config.bestsellers.clone())?,
            repository,
        })
    }
}
