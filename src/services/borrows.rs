//! Borrow workflow: lending, returning and overdue marking

use std::sync::Arc;

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::borrow::{
        sort_by_status, Borrow, BorrowCheck, BorrowDetails, BorrowStatus, CreateBorrowRequest,
        NewBorrow,
    },
    repository::BorrowStore,
};

/// Borrow workflow over a [`BorrowStore`].
///
/// The borrow row and the book's availability counter are written by two
/// separate statements, without a transaction and without a floor on the
/// counter. Concurrent borrows of the last copy can all succeed.
#[derive(Clone)]
pub struct BorrowsService {
    store: Arc<dyn BorrowStore>,
}

impl BorrowsService {
    pub fn new(store: Arc<dyn BorrowStore>) -> Self {
        Self { store }
    }

    /// Lend a book to `user_id` and take one copy off the shelf
    pub async fn create_borrow(&self, user_id: i32, request: CreateBorrowRequest) -> AppResult<Borrow> {
        let new_borrow = NewBorrow::from_request(request, Utc::now())?;
        let book_id = new_borrow.book_id;

        if !self.store.book_exists(book_id).await? {
            return Err(AppError::NotFound("Book not found".to_string()));
        }

        let borrow = self.store.insert(user_id, new_borrow).await?;
        self.store.adjust_available_copies(book_id, -1).await?;

        tracing::info!(
            "Borrow id={} created: user_id={} book_id={} due={}",
            borrow.id,
            user_id,
            book_id,
            borrow.due_date
        );
        Ok(borrow)
    }

    /// Return a borrow owned by `user_id` and put the copy back
    pub async fn return_borrow(&self, borrow_id: i32, user_id: i32) -> AppResult<Borrow> {
        let borrow = self
            .store
            .find_by_id(borrow_id)
            .await?
            .filter(|b| b.user_id == user_id)
            .ok_or_else(|| AppError::NotFound("Borrow record not found".to_string()))?;

        let returned = self.store.mark_returned(borrow.id, Utc::now()).await?;
        if let Some(book_id) = returned.book_id {
            self.store.adjust_available_copies(book_id, 1).await?;
        }

        tracing::info!("Borrow id={} returned by user_id={}", returned.id, user_id);
        Ok(returned)
    }

    /// Flag a borrow as overdue, whatever its due date
    pub async fn mark_overdue(&self, borrow_id: i32) -> AppResult<Borrow> {
        let borrow = self
            .store
            .set_status(borrow_id, BorrowStatus::Overdue)
            .await?
            .ok_or_else(|| AppError::NotFound("Borrow record not found".to_string()))?;

        tracing::info!("Borrow id={} marked overdue", borrow.id);
        Ok(borrow)
    }

    /// Whether `user_id` holds a copy of `book_id` that is not yet returned
    pub async fn check_if_borrowed(&self, user_id: i32, book_id: i32) -> AppResult<BorrowCheck> {
        let outstanding = self.store.find_outstanding(user_id, book_id).await?;
        Ok(BorrowCheck::new(outstanding.is_some()))
    }

    /// All borrows, overdue first
    pub async fn list_all(&self) -> AppResult<Vec<BorrowDetails>> {
        let mut borrows = self.store.list_all().await?;
        sort_by_status(&mut borrows);
        Ok(borrows)
    }

    /// Borrows of one user, overdue first
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<BorrowDetails>> {
        let mut borrows = self.store.list_for_user(user_id).await?;
        sort_by_status(&mut borrows);
        Ok(borrows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::borrows::MockBorrowStore;
    use chrono::Duration;
    use std::sync::{
        atomic::{AtomicI32, Ordering},
        Mutex,
    };

    const BOOK_ID: i32 = 7;

    /// Mock store backed by an in-memory borrow table and one book counter
    fn library(initial_copies: i32) -> (MockBorrowStore, Arc<AtomicI32>) {
        let copies = Arc::new(AtomicI32::new(initial_copies));
        let borrows: Arc<Mutex<Vec<Borrow>>> = Arc::default();
        let mut store = MockBorrowStore::new();

        store
            .expect_book_exists()
            .returning(|book_id| Ok(book_id == BOOK_ID));

        let table = borrows.clone();
        store.expect_insert().returning(move |user_id, new_borrow| {
            let mut table = table.lock().unwrap();
            let borrow = Borrow {
                id: table.len() as i32 + 1,
                user_id,
                book_id: Some(new_borrow.book_id),
                borrow_date: new_borrow.borrow_date,
                due_date: new_borrow.due_date,
                return_date: None,
                status: BorrowStatus::Borrowed,
                created_at: new_borrow.borrow_date,
                updated_at: new_borrow.borrow_date,
            };
            table.push(borrow.clone());
            Ok(borrow)
        });

        let table = borrows.clone();
        store.expect_find_by_id().returning(move |id| {
            Ok(table.lock().unwrap().iter().find(|b| b.id == id).cloned())
        });

        let table = borrows.clone();
        store.expect_mark_returned().returning(move |id, returned_at| {
            let mut table = table.lock().unwrap();
            let borrow = table
                .iter_mut()
                .find(|b| b.id == id)
                .ok_or(AppError::Database(sqlx::Error::RowNotFound))?;
            borrow.return_date = Some(returned_at);
            borrow.status = BorrowStatus::Returned;
            Ok(borrow.clone())
        });

        let table = borrows.clone();
        store.expect_set_status().returning(move |id, status| {
            let mut table = table.lock().unwrap();
            Ok(table.iter_mut().find(|b| b.id == id).map(|b| {
                b.status = status;
                b.clone()
            }))
        });

        let table = borrows.clone();
        store.expect_find_outstanding().returning(move |user_id, book_id| {
            Ok(table
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|b| b.user_id == user_id && b.book_id == Some(book_id) && b.status.is_outstanding())
                .cloned())
        });

        let counter = copies.clone();
        store
            .expect_adjust_available_copies()
            .returning(move |book_id, delta| {
                if book_id == BOOK_ID {
                    counter.fetch_add(delta, Ordering::SeqCst);
                }
                Ok(())
            });

        (store, copies)
    }

    fn request(days: i64) -> CreateBorrowRequest {
        CreateBorrowRequest {
            book_id: Some(BOOK_ID),
            due_date: Some(Utc::now() + Duration::days(days)),
        }
    }

    #[tokio::test]
    async fn test_borrow_then_return_restores_available_copies() {
        let (store, copies) = library(3);
        let service = BorrowsService::new(Arc::new(store));

        let borrow = service.create_borrow(1, request(14)).await.unwrap();
        assert_eq!(borrow.status, BorrowStatus::Borrowed);
        assert_eq!(copies.load(Ordering::SeqCst), 2);

        let returned = service.return_borrow(borrow.id, 1).await.unwrap();
        assert_eq!(returned.status, BorrowStatus::Returned);
        assert!(returned.return_date.is_some());
        assert_eq!(copies.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_check_if_borrowed_follows_borrow_and_return() {
        let (store, _) = library(1);
        let service = BorrowsService::new(Arc::new(store));

        assert!(!service.check_if_borrowed(1, BOOK_ID).await.unwrap().borrowed);

        let borrow = service.create_borrow(1, request(7)).await.unwrap();
        assert!(service.check_if_borrowed(1, BOOK_ID).await.unwrap().borrowed);
        assert!(!service.check_if_borrowed(2, BOOK_ID).await.unwrap().borrowed);

        service.return_borrow(borrow.id, 1).await.unwrap();
        assert!(!service.check_if_borrowed(1, BOOK_ID).await.unwrap().borrowed);
    }

    #[tokio::test]
    async fn test_overdue_borrow_still_counts_as_borrowed() {
        let (store, _) = library(1);
        let service = BorrowsService::new(Arc::new(store));

        let borrow = service.create_borrow(1, request(7)).await.unwrap();
        let overdue = service.mark_overdue(borrow.id).await.unwrap();
        assert_eq!(overdue.status, BorrowStatus::Overdue);
        assert!(service.check_if_borrowed(1, BOOK_ID).await.unwrap().borrowed);
    }

    #[tokio::test]
    async fn test_returning_someone_elses_borrow_is_not_found() {
        let (store, copies) = library(2);
        let service = BorrowsService::new(Arc::new(store));

        let borrow = service.create_borrow(1, request(7)).await.unwrap();
        let result = service.return_borrow(borrow.id, 2).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(copies.load(Ordering::SeqCst), 1);

        let result = service.return_borrow(999, 1).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_due_date_before_borrow_date_is_rejected() {
        let (store, copies) = library(2);
        let service = BorrowsService::new(Arc::new(store));

        let result = service.create_borrow(1, request(-1)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(copies.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_borrowing_unknown_book_is_not_found() {
        let (store, _) = library(2);
        let service = BorrowsService::new(Arc::new(store));

        let result = service
            .create_borrow(
                1,
                CreateBorrowRequest {
                    book_id: Some(BOOK_ID + 1),
                    due_date: Some(Utc::now() + Duration::days(7)),
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_two_borrows_of_last_copy_both_succeed() {
        let (store, copies) = library(1);
        let service = BorrowsService::new(Arc::new(store));

        let (first, second) = tokio::join!(
            service.create_borrow(1, request(7)),
            service.create_borrow(2, request(7))
        );
        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(copies.load(Ordering::SeqCst), -1);
    }

    #[tokio::test]
    async fn test_mark_overdue_unknown_borrow() {
        let (store, _) = library(1);
        let service = BorrowsService::new(Arc::new(store));

        let result = service.mark_overdue(42).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_user_listing_puts_overdue_first() {
        let now = Utc::now();
        let details = |id, status| BorrowDetails {
            id,
            user_id: 1,
            book_id: Some(BOOK_ID),
            borrow_date: now,
            due_date: now + Duration::days(7),
            return_date: None,
            status,
            user: None,
            book: None,
        };
        let rows = vec![
            details(1, BorrowStatus::Returned),
            details(2, BorrowStatus::Borrowed),
            details(3, BorrowStatus::Overdue),
        ];

        let mut store = MockBorrowStore::new();
        store
            .expect_list_for_user()
            .withf(|user_id| *user_id == 1)
            .times(1)
            .return_once(move |_| Ok(rows));

        let service = BorrowsService::new(Arc::new(store));
        let listed = service.list_for_user(1).await.unwrap();
        let statuses: Vec<BorrowStatus> = listed.iter().map(|b| b.status).collect();
        assert_eq!(
            statuses,
            vec![BorrowStatus::Overdue, BorrowStatus::Borrowed, BorrowStatus::Returned]
        );
    }
}
