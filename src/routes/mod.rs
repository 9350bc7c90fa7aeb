pub mod auth;
pub mod media;
pub mod tweets;
pub mod users;

use axum::{Router, routing::get};
use std::sync::Arc;

use crate::AppState;

/// Build all routes for the API
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .merge(auth::routes())
        .merge(users::routes())
        .merge(tweets::routes())
        .merge(media::routes())
}

async fn health() -> &'static str {
    "ok"
}
