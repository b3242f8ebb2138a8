use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{ContentAnalytics, ContentId, GoldenApplication, GoldenDashboard, GoldenProfile, UserId},
    routes::AppState,
    services::{analytics, roles},
};

#[derive(Debug, Deserialize)]
pub struct ActingUser {
    pub user_id: UserId,
}

pub async fn apply(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
    Json(application): Json<GoldenApplication>,
) -> AppResult<(StatusCode, Json<GoldenProfile>)> {
    let profile = roles::apply_for_golden(state.store.as_ref(), user_id, &application).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(acting): Query<ActingUser>,
) -> AppResult<Json<GoldenDashboard>> {
    Ok(Json(
        analytics::golden_dashboard(state.store.as_ref(), acting.user_id).await?,
    ))
}

pub async fn content_analytics(
    State(state): State<Arc<AppState>>,
    Path(content_id): Path<ContentId>,
    Query(acting): Query<ActingUser>,
) -> AppResult<Json<ContentAnalytics>> {
    Ok(Json(
        analytics::content_analytics(state.store.as_ref(), acting.user_id, content_id).await?,
    ))
}
