//! Borrow/return transitions against PostgreSQL.
//!
//! Each test gets a fresh database with migrations applied.
//! Run with: DATABASE_URL=postgres://... cargo test -- --ignored

use chrono::{DateTime, TimeZone, Utc};
use sqlx::PgPool;
use tokio_test::{assert_err, assert_ok};

use bookshelf_server::{
    models::{BookQuery, BorrowRequest, ReturnRequest},
    repository::Repository,
    services::Services,
    AppError,
};

fn due() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

fn borrow(user_id: i32, book_id: i32) -> BorrowRequest {
    BorrowRequest {
        user_id,
        book_id,
        due_date: due(),
    }
}

fn give_back(user_id: i32, book_id: i32) -> ReturnRequest {
    ReturnRequest { user_id, book_id }
}

async fn add_book(pool: &PgPool, title: &str, author: &str) -> i32 {
    sqlx::query_scalar("INSERT INTO books (title, author) VALUES ($1, $2) RETURNING id")
        .bind(title)
        .bind(author)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn add_user(pool: &PgPool, name: &str) -> i32 {
    sqlx::query_scalar("INSERT INTO users (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn is_available(pool: &PgPool, book_id: i32) -> bool {
    let repository = Repository::new(pool.clone());
    repository.books.get_by_id(book_id).await.unwrap().is_available
}

/// `is_available` is false exactly when an open record exists, for every book
async fn assert_availability_invariant(pool: &PgPool) {
    let violations: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM books b
        WHERE b.is_available = EXISTS(
            SELECT 1 FROM borrows br WHERE br.book_id = b.id AND br.return_date IS NULL
        )
        "#,
    )
    .fetch_one(pool)
    .await
    .unwrap();
    assert_eq!(violations, 0, "availability flag out of sync with open records");
}

fn services(pool: &PgPool) -> Services {
    Services::new(Repository::new(pool.clone()))
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_borrow_then_return(pool: PgPool) {
    let services = services(&pool);
    let user = add_user(&pool, "Ada").await;
    let book = add_book(&pool, "The Hobbit", "J.R.R. Tolkien").await;

    let record = assert_ok!(services.circulation.borrow(borrow(user, book)).await);
    assert_eq!(record.user_id, user);
    assert_eq!(record.book_id, book);
    assert_eq!(record.due_date, due());
    assert!(record.return_date.is_none());
    assert!(!is_available(&pool, book).await);
    assert_availability_invariant(&pool).await;

    let returned = assert_ok!(services.circulation.return_book(give_back(user, book)).await);
    assert_eq!(returned.id, record.id);
    assert!(returned.return_date.is_some());
    assert!(is_available(&pool, book).await);
    assert_availability_invariant(&pool).await;

    let closed: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM borrows WHERE user_id = $1 AND book_id = $2 AND return_date IS NOT NULL",
    )
    .bind(user)
    .bind(book)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(closed, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_borrow_unavailable_book(pool: PgPool) {
    let services = services(&pool);
    let first = add_user(&pool, "Ada").await;
    let second = add_user(&pool, "Grace").await;
    let book = add_book(&pool, "Dune", "Frank Herbert").await;

    assert_ok!(services.circulation.borrow(borrow(first, book)).await);

    let err = assert_err!(services.circulation.borrow(borrow(second, book)).await);
    assert!(matches!(err, AppError::Conflict(ref msg) if msg == "Book not available"));

    let repository = Repository::new(pool.clone());
    assert_eq!(repository.borrows.count_open_for_book(book).await.unwrap(), 1);
    assert!(!is_available(&pool, book).await);
    assert_availability_invariant(&pool).await;
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_borrow_unknown_book_or_user(pool: PgPool) {
    let services = services(&pool);
    let user = add_user(&pool, "Ada").await;
    let book = add_book(&pool, "Emma", "Jane Austen").await;

    let err = assert_err!(services.circulation.borrow(borrow(user, book + 100)).await);
    assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Book not found"));

    let err = assert_err!(services.circulation.borrow(borrow(user + 100, book)).await);
    assert!(matches!(err, AppError::NotFound(ref msg) if msg == "User not found"));

    let repository = Repository::new(pool.clone());
    assert_ok!(repository.users.get_by_id(user).await);
    let err = assert_err!(repository.users.get_by_id(user + 100).await);
    assert!(matches!(err, AppError::NotFound(_)));

    // Nothing written by the aborted transition
    assert!(is_available(&pool, book).await);
    let records: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM borrows")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(records, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_return_without_open_borrow(pool: PgPool) {
    let services = services(&pool);
    let owner = add_user(&pool, "Ada").await;
    let other = add_user(&pool, "Grace").await;
    let book = add_book(&pool, "Middlemarch", "George Eliot").await;

    // Never borrowed
    let err = assert_err!(services.circulation.return_book(give_back(owner, book)).await);
    assert!(matches!(err, AppError::Conflict(ref msg) if msg == "No active borrow record found"));
    assert!(is_available(&pool, book).await);

    // Borrowed by someone else
    assert_ok!(services.circulation.borrow(borrow(owner, book)).await);
    let err = assert_err!(services.circulation.return_book(give_back(other, book)).await);
    assert!(matches!(err, AppError::Conflict(_)));
    assert!(!is_available(&pool, book).await);

    // Already returned
    assert_ok!(services.circulation.return_book(give_back(owner, book)).await);
    let err = assert_err!(services.circulation.return_book(give_back(owner, book)).await);
    assert!(matches!(err, AppError::Conflict(_)));

    // Unknown book
    let err = assert_err!(services.circulation.return_book(give_back(owner, book + 100)).await);
    assert!(matches!(err, AppError::Conflict(_)));

    assert_availability_invariant(&pool).await;
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_concurrent_borrows_single_winner(pool: PgPool) {
    let services = services(&pool);
    let first = add_user(&pool, "Ada").await;
    let second = add_user(&pool, "Grace").await;
    let book = add_book(&pool, "Neuromancer", "William Gibson").await;

    let a = services.circulation.clone();
    let b = services.circulation.clone();
    let (ra, rb) = tokio::join!(
        tokio::spawn(async move { a.borrow(borrow(first, book)).await }),
        tokio::spawn(async move { b.borrow(borrow(second, book)).await }),
    );
    let results = [ra.unwrap(), rb.unwrap()];

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(AppError::Conflict(msg)) if msg == "Book not available")));

    let repository = Repository::new(pool.clone());
    assert_eq!(repository.borrows.count_open_for_book(book).await.unwrap(), 1);
    assert_availability_invariant(&pool).await;
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_history_most_recent_first(pool: PgPool) {
    let services = services(&pool);
    let user = add_user(&pool, "Ada").await;
    let hobbit = add_book(&pool, "The Hobbit", "J.R.R. Tolkien").await;
    let dune = add_book(&pool, "Dune", "Frank Herbert").await;

    assert_ok!(services.circulation.borrow(borrow(user, hobbit)).await);
    assert_ok!(services.circulation.return_book(give_back(user, hobbit)).await);
    assert_ok!(services.circulation.borrow(borrow(user, dune)).await);

    let history = assert_ok!(services.circulation.history(user).await);
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].book.title, "Dune");
    assert!(history[0].record.return_date.is_none());
    assert!(history[0].is_overdue);
    assert_eq!(history[1].book.title, "The Hobbit");
    assert!(history[1].record.return_date.is_some());
    assert!(!history[1].is_overdue);
    assert!(history.iter().all(|d| d.user.name == "Ada"));

    // Unknown user: empty history, not an error
    let history = assert_ok!(services.circulation.history(user + 100).await);
    assert!(history.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_search_counts_and_pages(pool: PgPool) {
    let services = services(&pool);
    add_book(&pool, "The Hobbit", "J.R.R. Tolkien").await;
    add_book(&pool, "The Silmarillion", "J.R.R. TOLKIEN").await;
    add_book(&pool, "Tolkien: A Biography", "Humphrey Carpenter").await;
    add_book(&pool, "Dune", "Frank Herbert").await;

    let query = BookQuery {
        q: "tolkien".to_string(),
        page: Some(1),
        limit: Some(10),
    };
    let (books, pagination) = assert_ok!(services.catalog.search_books(&query).await);
    assert_eq!(books.len(), 3);
    assert_eq!(pagination.total, 3);
    assert_eq!(pagination.total_pages, 1);

    let query = BookQuery {
        q: "TOLKIEN".to_string(),
        page: Some(2),
        limit: Some(2),
    };
    let (books, pagination) = assert_ok!(services.catalog.search_books(&query).await);
    assert_eq!(books.len(), 1);
    assert_eq!(pagination.total, 3);
    assert_eq!(pagination.total_pages, 2);

    // Wildcards in the query match literally
    let query = BookQuery {
        q: "%".to_string(),
        page: None,
        limit: None,
    };
    let (books, pagination) = assert_ok!(services.catalog.search_books(&query).await);
    assert!(books.is_empty());
    assert_eq!(pagination.total, 0);
}
