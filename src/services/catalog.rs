//! Catalog management service (books, genres, authors)

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorInput},
        book::{ensure_not_future_year, Book, BookQuery, CreateBook, UpdateBook, DEFAULT_COVER_IMAGE_URL},
        genre::{CreateGenre, Genre, UpdateGenre},
    },
    repository::Repository,
};

/// Number of books on the "most available" shelf
pub const TOP_AVAILABLE_COUNT: i64 = 6;

/// Genre name to filter on; blank names mean no filter
fn genre_filter(query: &BookQuery) -> Option<&str> {
    query.genre.as_deref().map(str::trim).filter(|g| !g.is_empty())
}

fn cover_or_default(url: Option<&str>) -> String {
    url.filter(|url| !url.is_empty())
        .unwrap_or(DEFAULT_COVER_IMAGE_URL)
        .to_string()
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    /// Search books; an unknown genre name leaves the genre filter off
    pub async fn search_books(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let genre_id = match genre_filter(query) {
            Some(name) => self
                .repository
                .genres
                .find_by_name(name)
                .await?
                .map(|genre| genre.id),
            None => None,
        };

        self.repository.books.search(query, genre_id).await
    }

    pub async fn list_all_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list_all().await
    }

    pub async fn top_available_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.top_available(TOP_AVAILABLE_COUNT).await
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Create a book; the genre must exist
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        ensure_not_future_year(book.published_year)?;
        self.ensure_genre_exists(book.genre_id).await?;

        let cover = cover_or_default(book.cover_image_url.as_deref());
        let created = self.repository.books.create(&book, &cover).await?;
        tracing::info!("Created book id={} title={:?}", created.id, created.title);
        Ok(created)
    }

    /// Update a book; a new genre must exist
    pub async fn update_book(&self, id: i32, book: UpdateBook) -> AppResult<Book> {
        if let Some(year) = book.published_year {
            ensure_not_future_year(year)?;
        }
        if let Some(genre_id) = book.genre_id {
            self.ensure_genre_exists(genre_id).await?;
        }

        self.repository.books.update(id, &book).await
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!("Deleted book id={}", id);
        Ok(())
    }

    async fn ensure_genre_exists(&self, genre_id: i32) -> AppResult<()> {
        if !self.repository.genres.exists(genre_id).await? {
            return Err(AppError::NotFound("Genre not found".to_string()));
        }
        Ok(())
    }

    // =========================================================================
    // GENRES
    // =========================================================================

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.list().await
    }

    pub async fn get_genre(&self, id: i32) -> AppResult<Genre> {
        self.repository.genres.get_by_id(id).await
    }

    pub async fn create_genre(&self, genre: CreateGenre) -> AppResult<Genre> {
        self.repository.genres.create(&genre).await
    }

    pub async fn update_genre(&self, id: i32, genre: UpdateGenre) -> AppResult<Genre> {
        self.repository.genres.update(id, &genre).await
    }

    pub async fn delete_genre(&self, id: i32) -> AppResult<()> {
        self.repository.genres.delete(id).await
    }

    // =========================================================================
    // AUTHORS
    // =========================================================================

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.repository.authors.list().await
    }

    pub async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    pub async fn create_author(&self, author: AuthorInput) -> AppResult<Author> {
        self.repository.authors.create(&author).await
    }

    pub async fn update_author(&self, id: i32, author: AuthorInput) -> AppResult<Author> {
        self.repository.authors.update(id, &author).await
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await
    }
}
