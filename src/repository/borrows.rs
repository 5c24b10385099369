//! Borrow records repository

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgConnection, Pool, Postgres, Row};

use crate::{
    error::{AppResult, TransitionError},
    models::{
        book::Book,
        borrow::{BorrowDetails, BorrowRecord},
        user::User,
    },
};

/// Partial unique index allowing one open record per book
const OPEN_BORROW_INDEX: &str = "borrows_open_book_idx";

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All borrow records of a user, most recent first, with book and user snapshots
    pub async fn get_user_history(&self, user_id: i32) -> AppResult<Vec<BorrowDetails>> {
        let rows = sqlx::query(
            r#"
            SELECT br.id, br.user_id, br.book_id, br.borrow_date, br.due_date, br.return_date,
                   b.title, b.author, b.genre, b.rating, b.published_date, b.is_available,
                   u.name AS user_name, u.email AS user_email, u.created_at AS user_created_at
            FROM borrows br
            JOIN books b ON br.book_id = b.id
            JOIN users u ON br.user_id = u.id
            WHERE br.user_id = $1
            ORDER BY br.borrow_date DESC, br.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let now = Utc::now();

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let record = BorrowRecord {
                id: row.try_get("id")?,
                user_id: row.try_get("user_id")?,
                book_id: row.try_get("book_id")?,
                borrow_date: row.try_get("borrow_date")?,
                due_date: row.try_get("due_date")?,
                return_date: row.try_get("return_date")?,
            };

            let book = Book {
                id: record.book_id,
                title: row.try_get("title")?,
                author: row.try_get("author")?,
                genre: row.try_get("genre")?,
                rating: row.try_get("rating")?,
                published_date: row.try_get::<Option<NaiveDate>, _>("published_date")?,
                is_available: row.try_get("is_available")?,
            };

            let user = User {
                id: record.user_id,
                name: row.try_get("user_name")?,
                email: row.try_get("user_email")?,
                created_at: row.try_get("user_created_at")?,
            };

            result.push(BorrowDetails {
                is_overdue: record.is_overdue(now),
                record,
                book,
                user,
            });
        }

        Ok(result)
    }

    /// Insert a new open record. A second open record for the same book is
    /// rejected by the unique index and reported as `BookNotAvailable`.
    pub async fn insert_open(
        conn: &mut PgConnection,
        user_id: i32,
        book_id: i32,
        borrow_date: DateTime<Utc>,
        due_date: DateTime<Utc>,
    ) -> AppResult<BorrowRecord> {
        let inserted = sqlx::query_as::<_, BorrowRecord>(
            r#"
            INSERT INTO borrows (user_id, book_id, borrow_date, due_date, return_date)
            VALUES ($1, $2, $3, $4, NULL)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(borrow_date)
        .bind(due_date)
        .fetch_one(conn)
        .await;

        match inserted {
            Ok(record) => Ok(record),
            Err(sqlx::Error::Database(e)) if e.constraint() == Some(OPEN_BORROW_INDEX) => {
                Err(TransitionError::BookNotAvailable.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Lock the open record for `(user_id, book_id)`, if any
    pub async fn lock_open(
        conn: &mut PgConnection,
        user_id: i32,
        book_id: i32,
    ) -> AppResult<Option<BorrowRecord>> {
        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            SELECT * FROM borrows
            WHERE user_id = $1 AND book_id = $2 AND return_date IS NULL
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(conn)
        .await?;

        Ok(record)
    }

    /// Set the return date of an open record
    pub async fn close(
        conn: &mut PgConnection,
        id: i32,
        return_date: DateTime<Utc>,
    ) -> AppResult<BorrowRecord> {
        let record = sqlx::query_as::<_, BorrowRecord>(
            "UPDATE borrows SET return_date = $1 WHERE id = $2 AND return_date IS NULL RETURNING *",
        )
        .bind(return_date)
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or(TransitionError::NoActiveBorrow)?;

        Ok(record)
    }

    /// Number of open records for a book
    pub async fn count_open_for_book(&self, book_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrows WHERE book_id = $1 AND return_date IS NULL",
        )
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
