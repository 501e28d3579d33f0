//! # bookapp_api
//!
//! HTTP API library for Bookapp.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};
use bookapp_core::auth::jwt::TokenSigner;
use bookapp_core::auth::policy::PolicyEnforcer;
use bookapp_core::storage::Storage;
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{
    admins, authors, books, categories, comments, health, statistics, subcategories, users,
};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    /// API configuration.
    pub config: ApiConfig,
    pub tokens: Arc<TokenSigner>,
    /// Access policy, loaded once at start-up.
    pub policy: Arc<PolicyEnforcer>,
}

impl AppState {
    /// Build state from configuration, deriving the token signer from it.
    pub fn new(storage: Storage, config: ApiConfig, policy: PolicyEnforcer) -> Self {
        let tokens = TokenSigner::new(
            config.signing_key.as_bytes(),
            config.token_audience.clone(),
        );
        Self {
            storage,
            config,
            tokens: Arc::new(tokens),
            policy: Arc::new(policy),
        }
    }
}

/// Run embedded database migrations.
///
/// Delegates to `bookapp_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    bookapp_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
///
/// Every route sits behind the authorization gate.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let category = Router::new()
        .route(
            "/v1/category",
            post(categories::create_category_handler).put(categories::update_category_handler),
        )
        .route("/v1/category/list", get(categories::list_categories_handler))
        .route("/v1/category/books", get(categories::category_books_handler))
        .route(
            "/v1/category/{id}",
            get(categories::get_category_handler).delete(categories::delete_category_handler),
        );

    let subcategory = Router::new()
        .route(
            "/v1/subcategory",
            post(subcategories::create_subcategory_handler)
                .put(subcategories::update_subcategory_handler),
        )
        .route(
            "/v1/subcategory/{id}",
            get(subcategories::get_subcategory_handler)
                .delete(subcategories::delete_subcategory_handler),
        );

    let book = Router::new()
        .route(
            "/v1/book",
            post(books::create_book_handler).put(books::update_book_handler),
        )
        .route("/v1/book/search", get(books::search_books_handler))
        .route("/v1/book/filter", get(books::filter_books_handler))
        .route("/v1/book/top", get(books::top_books_handler))
        .route("/v1/book/mostread", get(books::most_read_books_handler))
        .route("/v1/book/audios", get(books::audio_books_handler))
        .route(
            "/v1/book/like",
            post(books::like_book_handler).delete(books::unlike_book_handler),
        )
        .route(
            "/v1/book/{id}",
            get(books::get_book_handler).delete(books::delete_book_handler),
        );

    let comment = Router::new()
        .route(
            "/v1/comment",
            post(comments::create_comment_handler).put(comments::update_comment_handler),
        )
        .route("/v1/comment/{id}", delete(comments::delete_comment_handler));

    let client = Router::new()
        .route("/v1/client/register", post(users::register_handler))
        .route("/v1/client/login", post(users::login_handler))
        .route("/v1/client/refresh", post(users::refresh_handler))
        .route("/v1/client", put(users::update_user_handler))
        .route(
            "/v1/client/{id}",
            get(users::get_user_handler).delete(users::delete_user_handler),
        );

    let author = Router::new()
        .route(
            "/v1/author",
            post(authors::create_author_handler).put(authors::update_author_handler),
        )
        .route("/v1/author/list", get(authors::list_authors_handler))
        .route(
            "/v1/author/{id}",
            get(authors::get_author_handler).delete(authors::delete_author_handler),
        );

    let admin = Router::new()
        .route(
            "/v1/admin",
            post(admins::create_admin_handler).get(admins::list_admins_handler),
        )
        .route("/v1/admin/login", post(admins::admin_login_handler))
        .route("/v1/admin/{id}", delete(admins::delete_admin_handler))
        .route("/v1/superadmin", post(admins::create_superadmin_handler))
        .route(
            "/v1/superadmin/login",
            post(admins::superadmin_login_handler),
        );

    let statistic = Router::new()
        .route("/v1/statistic", get(statistics::totals_handler))
        .route(
            "/v1/statistic/category/bookcount",
            get(statistics::category_book_count_handler),
        )
        .route(
            "/v1/statistic/week/bookcount",
            get(statistics::weekly_book_count_handler),
        );

    Router::new()
        .route("/", get(health::root_handler))
        .merge(category)
        .merge(subcategory)
        .merge(book)
        .merge(comment)
        .merge(client)
        .merge(author)
        .merge(admin)
        .merge(statistic)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::authorize,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
