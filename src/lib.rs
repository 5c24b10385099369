//! Bookshelf Library Circulation Server
//!
//! A small REST JSON API over PostgreSQL: search books, borrow and return
//! them, and list a user's borrow history. Borrow and return run as single
//! database transactions so that a book is unavailable exactly while an open
//! borrow record references it.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult, TransitionError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    pub fn new(config: AppConfig, services: services::Services) -> Self {
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
