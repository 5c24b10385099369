//! Book model, availability state and search parameters

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult, TransitionError};

/// Book row from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub rating: Option<f64>,
    pub published_date: Option<NaiveDate>,
    pub is_available: bool,
}

/// Circulation state of a book, stored as `books.is_available`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookState {
    Available,
    Borrowed,
}

impl BookState {
    /// State after a successful borrow
    pub fn borrow(self) -> Result<BookState, TransitionError> {
        match self {
            BookState::Available => Ok(BookState::Borrowed),
            BookState::Borrowed => Err(TransitionError::BookNotAvailable),
        }
    }

    /// State after a successful return. Only reachable with an open record,
    /// which implies `Borrowed`.
    pub fn release(self) -> BookState {
        BookState::Available
    }

    pub fn is_available(self) -> bool {
        self == BookState::Available
    }
}

impl From<bool> for BookState {
    fn from(is_available: bool) -> Self {
        if is_available {
            BookState::Available
        } else {
            BookState::Borrowed
        }
    }
}

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

/// Book search query parameters
#[derive(Debug, Deserialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Case-insensitive substring matched against title or author
    #[serde(default)]
    #[validate(length(min = 1, message = "Query must be at least 1 character long."))]
    pub q: String,
    /// Page number, starting at 1
    #[validate(range(min = 1, message = "Page must be a positive integer."))]
    pub page: Option<i64>,
    /// Page size, 1 to 100
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100."))]
    pub limit: Option<i64>,
}

impl BookQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(DEFAULT_PAGE)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    /// Row offset of the requested page; pages past `i64` range are rejected
    pub fn offset(&self) -> AppResult<i64> {
        (self.page() - 1)
            .checked_mul(self.limit())
            .ok_or_else(|| AppError::validation("Page is out of range."))
    }

    /// `ILIKE` pattern with LIKE wildcards in the query matched literally
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.q.len() + 2);
        pattern.push('%');
        for c in self.q.chars() {
            if matches!(c, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    }
}

/// Pagination block of a search response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        let total_pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self {
            total,
            page,
            limit,
            total_pages,
        }
    }
}
