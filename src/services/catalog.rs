//! Catalog search service

use crate::{
    error::AppResult,
    models::book::{Book, BookQuery, Pagination},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search books by title or author and paginate the matches
    pub async fn search_books(&self, query: &BookQuery) -> AppResult<(Vec<Book>, Pagination)> {
        let (books, total) = self.repository.books.search(query).await?;
        tracing::debug!(
            "Book search '{}' page {}: {} of {} matches",
            query.q,
            query.page(),
            books.len(),
            total
        );
        Ok((books, Pagination::new(total, query.page(), query.limit())))
    }
}
