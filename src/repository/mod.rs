//! Repository layer for database operations

pub mod authors;
pub mod books;
pub mod borrows;
pub mod genres;
pub mod reports;
pub mod users;

use sqlx::{Pool, Postgres};

pub use borrows::BorrowStore;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub genres: genres::GenresRepository,
    pub authors: authors::AuthorsRepository,
    pub users: users::UsersRepository,
    pub borrows: borrows::BorrowsRepository,
    pub reports: reports::ReportsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            genres: genres::GenresRepository::new(pool.clone()),
            authors: authors::AuthorsRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            borrows: borrows::BorrowsRepository::new(pool.clone()),
            reports: reports::ReportsRepository::new(pool.clone()),
            pool,
        }
    }
}
