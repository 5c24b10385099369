//! Books repository

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, BookState},
};

const SEARCH_FILTER: &str = "title ILIKE $1 OR author ILIKE $1";

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Search books by title or author, returning one page and the total match count
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let offset = query.offset()?;
        let pattern = query.like_pattern();

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM books WHERE {}", SEARCH_FILTER))
                .bind(&pattern)
                .fetch_one(&self.pool)
                .await?;

        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT * FROM books WHERE {} ORDER BY id LIMIT $2 OFFSET $3",
            SEARCH_FILTER
        ))
        .bind(&pattern)
        .bind(query.limit())
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((books, total))
    }

    /// Lock a book row for the rest of the transaction and read its state.
    /// Concurrent transitions on the same book queue up behind this lock.
    pub async fn lock(conn: &mut PgConnection, id: i32) -> AppResult<Option<BookState>> {
        let available: Option<bool> =
            sqlx::query_scalar("SELECT is_available FROM books WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(conn)
                .await?;

        Ok(available.map(BookState::from))
    }

    pub async fn set_state(conn: &mut PgConnection, id: i32, state: BookState) -> AppResult<()> {
        sqlx::query("UPDATE books SET is_available = $1 WHERE id = $2")
            .bind(state.is_available())
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }
}
