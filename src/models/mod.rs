//! Data models for Bookshelf

pub mod book;
pub mod borrow;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookQuery, BookState, Pagination};
pub use borrow::{BorrowDetails, BorrowRecord, BorrowRequest, ReturnRequest};
pub use user::User;
