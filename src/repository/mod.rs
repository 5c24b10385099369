//! Repository layer for database operations

pub mod books;
pub mod borrows;
pub mod users;

use std::future::Future;
use std::pin::Pin;

use sqlx::{PgConnection, Pool, Postgres};

use crate::error::AppResult;

/// Boxed future borrowing a transactional connection for `'a`
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub users: users::UsersRepository,
    pub borrows: borrows::BorrowsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            borrows: borrows::BorrowsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Run `op` inside a single database transaction.
    ///
    /// The transaction is committed when `op` returns `Ok` and rolled back
    /// when it returns `Err`; callers never observe partial effects.
    ///
    /// ```ignore
    /// repository.atomically(move |conn| Box::pin(async move {
    ///     BooksRepository::lock(conn, book_id).await
    /// })).await?;
    /// ```
    pub async fn atomically<T, F>(&self, op: F) -> AppResult<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, AppResult<T>> + Send,
    {
        let mut tx = self.pool.begin().await?;

        match op(&mut *tx).await {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!("Transaction rollback failed: {}", rollback_err);
                }
                Err(err)
            }
        }
    }

    /// Round trip to the database, used by the readiness check
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
