use axum::{
    http::StatusCode,
    middleware::from_fn,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::CatalogStore,
    middleware::{make_span_with_request_id, request_id_middleware},
};

pub mod admin;
pub mod content;
pub mod golden;
pub mod reviews;
pub mod users;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }
}

/// Creates the application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Users
        .route("/users/:user_id/recommendations", get(users::recommendations))
        .route("/users/:user_id/dashboard", get(users::dashboard))
        .route("/users/:user_id/roles", get(users::roles))
        .route(
            "/users/:user_id/watchlist",
            get(users::watchlist).post(users::add_to_watchlist),
        )
        .route(
            "/users/:user_id/watchlist/:content_id",
            delete(users::remove_from_watchlist),
        )
        .route("/users/:user_id/golden", post(golden::apply))
        // Content
        .route("/content", get(content::browse))
        .route("/content/ott", get(content::ott_browse))
        .route("/content/trending", get(content::trending))
        .route("/content/genres/popular", get(content::popular_genres))
        .route("/content/:content_id", get(content::detail))
        .route("/content/:content_id/similar", get(content::similar))
        .route(
            "/content/:content_id/rating",
            put(content::rate).get(content::rating),
        )
        .route(
            "/content/:content_id/ott",
            get(content::ott_availability).put(content::set_ott_availability),
        )
        .route("/content/:content_id/reviews", post(reviews::submit))
        .route("/content/:content_id/analytics", get(golden::content_analytics))
        // Reviews
        .route(
            "/reviews/:review_id",
            patch(reviews::edit).delete(reviews::delete),
        )
        // Golden users
        .route("/golden/dashboard", get(golden::dashboard))
        // Admin
        .route("/admin/stats", get(admin::stats))
        .route("/admin/reviews", get(admin::review_queue))
        .route("/admin/reviews/:review_id", post(admin::moderate))
        .route("/admin/users/:user_id/roles", post(admin::grant_role))
        .route("/admin/golden", get(admin::golden_queue))
        .route("/admin/golden/:user_id", post(admin::verify_golden))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
