//! Book search endpoint

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::book::{Book, BookQuery, Pagination},
};

use super::ValidQuery;

/// Search response: one page of books plus pagination totals
#[derive(Serialize, ToSchema)]
pub struct SearchResponse {
    pub data: Vec<Book>,
    pub pagination: Pagination,
}

/// Search books by title or author
#[utoipa::path(
    get,
    path = "/books/search",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Matching books", body = SearchResponse),
        (status = 400, description = "Invalid query", body = crate::error::ErrorResponse)
    )
)]
pub async fn search_books(
    State(state): State<crate::AppState>,
    ValidQuery(query): ValidQuery<BookQuery>,
) -> AppResult<Json<SearchResponse>> {
    let (data, pagination) = state.services.catalog.search_books(&query).await?;
    Ok(Json(SearchResponse { data, pagination }))
}
