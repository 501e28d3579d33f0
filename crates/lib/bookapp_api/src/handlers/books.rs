//! Book request handlers.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::USER_AGENT;
use bookapp_core::listing::BookFilter;
use bookapp_core::models::book::{
    AudioBookPage, Book, BookDetail, BookPage, BookUpdate, Like, NewBook,
};
use tracing::{info, warn};

use super::{DELETED, ListParams, optional_id, require_text};
use crate::AppState;
use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::Caller;
use crate::response::ApiResponse;

/// `book_type` of featured books.
const TOP_BOOK_TYPE: &str = "top";

/// `POST /v1/book` — create a book.
pub async fn create_book_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<NewBook>,
) -> AppResult<ApiResponse<Book>> {
    require_text("title", &body.title)?;
    let book = state.storage.books.create(&body).await?;
    info!(book_id = book.id, title = %book.title, "book created");
    Ok(ApiResponse::created(book))
}

/// `GET /v1/book/{id}` — book page. `user_id` fills in `is_like`; the view
/// is counted once per user agent.
pub async fn get_book_handler(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppQuery(params): AppQuery<ListParams>,
    headers: HeaderMap,
) -> AppResult<ApiResponse<BookDetail>> {
    let viewer = optional_id("user_id", params.user_id.as_deref())?;
    let book = state.storage.books.get(id, viewer).await?;

    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !user_agent.is_empty()
        && let Err(e) = state.storage.views.record(id, user_agent).await
    {
        warn!(book_id = id, error = %e, "failed to record book view");
    }

    Ok(ApiResponse::ok(book))
}

/// `PUT /v1/book` — update a book.
pub async fn update_book_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<BookUpdate>,
) -> AppResult<ApiResponse<Book>> {
    require_text("title", &body.title)?;
    let book = state.storage.books.update(&body).await?;
    Ok(ApiResponse::ok(book))
}

/// `DELETE /v1/book/{id}` — delete a book with its likes, views and comments.
pub async fn delete_book_handler(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<ApiResponse<&'static str>> {
    state.storage.books.delete(id).await?;
    info!(book_id = id, "book deleted");
    Ok(ApiResponse::ok(DELETED))
}

/// `GET /v1/book/search` — search title, description and author name.
pub async fn search_books_handler(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ListParams>,
) -> AppResult<ApiResponse<BookPage>> {
    let filter = BookFilter {
        search: params.search.clone(),
        ..BookFilter::default()
    };
    let page = state
        .storage
        .books
        .list(&filter, &params.page_request())
        .await?;
    Ok(ApiResponse::ok(page))
}

/// `GET /v1/book/filter` — narrow by category, subcategory, author and
/// search text.
pub async fn filter_books_handler(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ListParams>,
) -> AppResult<ApiResponse<BookPage>> {
    let filter = BookFilter {
        category_id: optional_id("category_id", params.category_id.as_deref())?,
        subcategory_id: optional_id("subcategory_id", params.subcategory_id.as_deref())?,
        author_id: optional_id("author_id", params.author_id.as_deref())?,
        search: params.search.clone(),
        ..BookFilter::default()
    };
    let page = state
        .storage
        .books
        .list(&filter, &params.page_request())
        .await?;
    Ok(ApiResponse::ok(page))
}

/// `GET /v1/book/top` — featured books.
pub async fn top_books_handler(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ListParams>,
) -> AppResult<ApiResponse<BookPage>> {
    let filter = BookFilter {
        book_type: Some(TOP_BOOK_TYPE.to_string()),
        ..BookFilter::default()
    };
    let page = state
        .storage
        .books
        .list(&filter, &params.page_request())
        .await?;
    Ok(ApiResponse::ok(page))
}

/// `GET /v1/book/mostread` — books by view count.
pub async fn most_read_books_handler(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ListParams>,
) -> AppResult<ApiResponse<BookPage>> {
    let page = state
        .storage
        .books
        .most_read(&params.page_request())
        .await?;
    Ok(ApiResponse::ok(page))
}

/// `GET /v1/book/audios` — books with an audio edition.
pub async fn audio_books_handler(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ListParams>,
) -> AppResult<ApiResponse<AudioBookPage>> {
    let page = state
        .storage
        .books
        .list_audio(params.search(), &params.page_request())
        .await?;
    Ok(ApiResponse::ok(page))
}

/// `POST /v1/book/like`
pub async fn like_book_handler(
    State(state): State<AppState>,
    caller: Caller,
    AppJson(like): AppJson<Like>,
) -> AppResult<ApiResponse<&'static str>> {
    caller.ensure_self(like.user_id)?;
    state.storage.books.like(like).await?;
    Ok(ApiResponse::created("Successfully liked"))
}

/// `DELETE /v1/book/like`
pub async fn unlike_book_handler(
    State(state): State<AppState>,
    caller: Caller,
    AppJson(like): AppJson<Like>,
) -> AppResult<ApiResponse<&'static str>> {
    caller.ensure_self(like.user_id)?;
    state.storage.books.unlike(like).await?;
    Ok(ApiResponse::ok("Successfully unliked"))
}
