use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{ContentId, ContentSummary, UserDashboard, UserId, Viewer, WatchlistEntry},
    routes::AppState,
    services::{dashboard, recommendations, roles, watchlist},
};

#[derive(Debug, Deserialize)]
pub struct WatchlistRequest {
    pub content_id: ContentId,
}

/// Handler for personalised recommendations
pub async fn recommendations(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<Vec<ContentSummary>>> {
    tracing::info!(request_id = %request_id, user_id, "Processing recommendation request");

    let items = recommendations::recommend(state.store.as_ref(), user_id).await?;

    tracing::info!(
        request_id = %request_id,
        count = items.len(),
        "Recommendations completed"
    );
    Ok(Json(items))
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<UserDashboard>> {
    Ok(Json(dashboard::user_dashboard(state.store.as_ref(), user_id).await?))
}

pub async fn roles(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<Viewer>> {
    Ok(Json(roles::resolve_viewer(state.store.as_ref(), user_id).await?))
}

pub async fn watchlist(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<Vec<WatchlistEntry>>> {
    Ok(Json(watchlist::list(state.store.as_ref(), user_id).await?))
}

pub async fn add_to_watchlist(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
    Json(request): Json<WatchlistRequest>,
) -> AppResult<StatusCode> {
    watchlist::add(state.store.as_ref(), user_id, request.content_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_from_watchlist(
    State(state): State<Arc<AppState>>,
    Path((user_id, content_id)): Path<(UserId, ContentId)>,
) -> AppResult<StatusCode> {
    watchlist::remove(state.store.as_ref(), user_id, content_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
