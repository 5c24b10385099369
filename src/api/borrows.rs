//! Borrow, return and borrow history endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::borrow::{BorrowDetails, BorrowRecord, BorrowRequest, ReturnRequest},
};

use super::{ValidJson, ValidPath};

/// Result of a borrow or return
#[derive(Serialize, ToSchema)]
pub struct BorrowResponse {
    /// Status message
    pub message: String,
    /// Created or updated borrow record
    pub data: BorrowRecord,
}

/// Borrow history of a user
#[derive(Serialize, ToSchema)]
pub struct HistoryResponse {
    pub data: Vec<BorrowDetails>,
}

/// `/users/:userId/...` path parameters
#[derive(Debug, Deserialize, Validate)]
pub struct UserPath {
    #[serde(rename = "userId")]
    #[validate(range(min = 1, message = "Invalid user ID"))]
    pub user_id: i32,
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/books/borrow",
    tag = "borrows",
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Book borrowed", body = BorrowResponse),
        (status = 400, description = "Invalid request or book not available", body = crate::error::ErrorResponse),
        (status = 404, description = "Book or user not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    ValidJson(request): ValidJson<BorrowRequest>,
) -> AppResult<(StatusCode, Json<BorrowResponse>)> {
    let record = state.services.circulation.borrow(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(BorrowResponse {
            message: "Book borrowed successfully".to_string(),
            data: record,
        }),
    ))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/books/return",
    tag = "borrows",
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Book returned", body = BorrowResponse),
        (status = 400, description = "Invalid request or no active borrow", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    ValidJson(request): ValidJson<ReturnRequest>,
) -> AppResult<Json<BorrowResponse>> {
    let record = state.services.circulation.return_book(request).await?;

    Ok(Json(BorrowResponse {
        message: "Book returned successfully".to_string(),
        data: record,
    }))
}

/// Get the borrow history of a user, most recent first
#[utoipa::path(
    get,
    path = "/users/{userId}/borrows",
    tag = "borrows",
    params(
        ("userId" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Borrow history", body = HistoryResponse),
        (status = 400, description = "Invalid user ID", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_user_borrows(
    State(state): State<crate::AppState>,
    ValidPath(path): ValidPath<UserPath>,
) -> AppResult<Json<HistoryResponse>> {
    let data = state.services.circulation.history(path.user_id).await?;
    Ok(Json(HistoryResponse { data }))
}
