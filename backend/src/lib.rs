//! HTTP API for managing tasks, backed by SQLite.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::Config;
pub use db::{Database, DatabaseLocation, StorageError};
pub use error::ApiError;

/// Builds the router over an already opened database.
pub fn app(db: Database) -> Router {
    Router::new()
        .route("/", get(handlers::health_check))
        .route(
            "/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/tasks/:id",
            get(handlers::get_task)
                .put(handlers::update_task)
                .patch(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(db)
}
