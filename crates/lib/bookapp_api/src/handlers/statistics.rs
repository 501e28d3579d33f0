//! Dashboard statistics handlers.

use axum::extract::State;
use bookapp_core::models::statistic::{CategoryBookCount, Totals, WeeklyBookCount};

use crate::AppState;
use crate::error::AppResult;
use crate::response::ApiResponse;

/// `GET /v1/statistic` — catalogue totals.
pub async fn totals_handler(State(state): State<AppState>) -> AppResult<ApiResponse<Totals>> {
    let totals = state.storage.statistics.totals().await?;
    Ok(ApiResponse::ok(totals))
}

/// `GET /v1/statistic/category/bookcount`
pub async fn category_book_count_handler(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<CategoryBookCount>>> {
    let counts = state.storage.statistics.books_per_category().await?;
    Ok(ApiResponse::ok(counts))
}

/// `GET /v1/statistic/week/bookcount` — books added per week, last 52 weeks.
pub async fn weekly_book_count_handler(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<WeeklyBookCount>>> {
    let counts = state.storage.statistics.books_per_week().await?;
    Ok(ApiResponse::ok(counts))
}
