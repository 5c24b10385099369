//! Borrow record model and circulation requests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::book::Book;
use super::user::User;

/// Borrow record from database. Open while `return_date` is null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRecord {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
}

impl BorrowRecord {
    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_open() && self.due_date < now
    }
}

/// Borrow record with book and user snapshots, for history
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BorrowDetails {
    #[serde(flatten)]
    pub record: BorrowRecord,
    pub is_overdue: bool,
    pub book: Book,
    pub user: User,
}

/// Borrow request body
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    #[validate(range(min = 1, message = "userId must be a positive integer"))]
    pub user_id: i32,
    #[validate(range(min = 1, message = "bookId must be a positive integer"))]
    pub book_id: i32,
    /// RFC 3339 timestamp, e.g. `2025-01-01T00:00:00Z`
    pub due_date: DateTime<Utc>,
}

/// Return request body
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    #[validate(range(min = 1, message = "userId must be a positive integer"))]
    pub user_id: i32,
    #[validate(range(min = 1, message = "bookId must be a positive integer"))]
    pub book_id: i32,
}
