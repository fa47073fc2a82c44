//! # parley_api
//!
//! HTTP API library for Parley: chat access handlers and error middleware.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;

use axum::Router;
use axum::routing::{get, post, put};
use sqlx::PgPool;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{chat, health};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// API configuration.
    pub config: ApiConfig,
}

/// Run embedded database migrations.
///
/// Delegates to `parley_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    parley_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no caller required)
    let public = Router::new().route("/health", get(health::health_handler));

    // Chat routes (caller identity required)
    let chats = Router::new()
        .route(
            "/api/chat",
            post(chat::access_chat_handler).get(chat::fetch_chats_handler),
        )
        .route("/api/chat/group", post(chat::create_group_chat_handler))
        .route("/api/chat/rename", put(chat::rename_group_handler))
        .route("/api/chat/groupadd", put(chat::add_to_group_handler))
        .route("/api/chat/groupremove", put(chat::remove_from_group_handler))
        .route_layer(axum::middleware::from_fn(
            middleware::caller::require_caller,
        ));

    let environment = state.config.environment;

    Router::new()
        .merge(public)
        .merge(chats)
        .fallback(middleware::errors::not_found)
        .method_not_allowed_fallback(middleware::errors::not_found)
        .layer(CatchPanicLayer::custom(middleware::errors::handle_panic))
        .layer(axum::middleware::from_fn_with_state(
            environment,
            middleware::errors::error_handler,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
