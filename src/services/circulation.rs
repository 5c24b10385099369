//! Circulation service: borrow and return transitions, borrow history

use chrono::Utc;

use crate::{
    error::{AppError, AppResult, TransitionError},
    models::borrow::{BorrowDetails, BorrowRecord, BorrowRequest, ReturnRequest},
    repository::{
        books::BooksRepository, borrows::BorrowsRepository, users::UsersRepository, Repository,
    },
};

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
}

impl CirculationService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow a book: `Available` -> `Borrowed`, creating an open record
    pub async fn borrow(&self, request: BorrowRequest) -> AppResult<BorrowRecord> {
        let BorrowRequest {
            user_id,
            book_id,
            due_date,
        } = request;

        let record = self
            .repository
            .atomically(move |conn| {
                Box::pin(async move {
                    let state = BooksRepository::lock(conn, book_id)
                        .await?
                        .ok_or(TransitionError::BookNotFound)?;
                    let next = state.borrow()?;

                    if !UsersRepository::exists(conn, user_id).await? {
                        return Err(TransitionError::UserNotFound.into());
                    }

                    let record =
                        BorrowsRepository::insert_open(conn, user_id, book_id, Utc::now(), due_date)
                            .await?;
                    BooksRepository::set_state(conn, book_id, next).await?;

                    Ok::<_, AppError>(record)
                })
            })
            .await?;

        tracing::info!(
            "Book {} borrowed by user {} (record {}, due {})",
            book_id,
            user_id,
            record.id,
            record.due_date
        );
        Ok(record)
    }

    /// Return a book: closes the open record for `(user, book)` and makes the
    /// book `Available` again
    pub async fn return_book(&self, request: ReturnRequest) -> AppResult<BorrowRecord> {
        let ReturnRequest { user_id, book_id } = request;

        let record = self
            .repository
            .atomically(move |conn| {
                Box::pin(async move {
                    // Same lock order as borrow: book row first
                    let state = BooksRepository::lock(conn, book_id)
                        .await?
                        .ok_or(TransitionError::NoActiveBorrow)?;

                    let open = BorrowsRepository::lock_open(conn, user_id, book_id)
                        .await?
                        .ok_or(TransitionError::NoActiveBorrow)?;

                    let record = BorrowsRepository::close(conn, open.id, Utc::now()).await?;
                    BooksRepository::set_state(conn, book_id, state.release()).await?;

                    Ok::<_, AppError>(record)
                })
            })
            .await?;

        tracing::info!(
            "Book {} returned by user {} (record {})",
            book_id,
            user_id,
            record.id
        );
        Ok(record)
    }

    /// Borrow history of a user, most recent first. Read only; a user
    /// without records (or unknown) gets an empty list.
    pub async fn history(&self, user_id: i32) -> AppResult<Vec<BorrowDetails>> {
        self.repository.borrows.get_user_history(user_id).await
    }
}
