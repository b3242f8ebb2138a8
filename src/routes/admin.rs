use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{
        DashboardStats, GoldenFilter, GoldenProfile, ModerationAction, ReviewFilter, ReviewId,
        Role, UserId, Viewer,
    },
    routes::AppState,
    services::{
        analytics,
        reviews::{self, ReviewListing},
        roles::{self, GoldenApplicationListing, GoldenDecision},
    },
};

#[derive(Debug, Deserialize)]
pub struct QueueQuery {
    #[serde(default)]
    pub filter: ReviewFilter,
}

#[derive(Debug, Deserialize)]
pub struct GoldenQueueQuery {
    #[serde(default)]
    pub status: GoldenFilter,
}

#[derive(Debug, Deserialize)]
pub struct ModerationRequest {
    pub action: ModerationAction,
}

#[derive(Debug, Deserialize)]
pub struct GrantRoleRequest {
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct VerificationRequest {
    pub admin_id: UserId,
    pub decision: GoldenDecision,
    #[serde(default)]
    pub notes: Option<String>,
}

pub async fn stats(State(state): State<Arc<AppState>>) -> AppResult<Json<DashboardStats>> {
    Ok(Json(analytics::dashboard_stats(state.store.as_ref()).await?))
}

pub async fn review_queue(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueueQuery>,
) -> AppResult<Json<ReviewListing>> {
    Ok(Json(reviews::list_reviews(state.store.as_ref(), params.filter).await?))
}

pub async fn moderate(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(review_id): Path<ReviewId>,
    Json(request): Json<ModerationRequest>,
) -> AppResult<StatusCode> {
    tracing::info!(
        request_id = %request_id,
        review_id,
        action = ?request.action,
        "Processing moderation"
    );
    reviews::moderate_review(state.store.as_ref(), review_id, request.action).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn grant_role(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
    Json(request): Json<GrantRoleRequest>,
) -> AppResult<Json<Viewer>> {
    Ok(Json(
        roles::grant_role(state.store.as_ref(), user_id, request.role).await?,
    ))
}

pub async fn golden_queue(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GoldenQueueQuery>,
) -> AppResult<Json<GoldenApplicationListing>> {
    Ok(Json(
        roles::list_golden_applications(state.store.as_ref(), params.status).await?,
    ))
}

pub async fn verify_golden(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<UserId>,
    Json(request): Json<VerificationRequest>,
) -> AppResult<Json<GoldenProfile>> {
    tracing::info!(
        request_id = %request_id,
        admin_id = request.admin_id,
        user_id,
        "Processing golden verification"
    );
    let profile = roles::review_golden_application(
        state.store.as_ref(),
        request.admin_id,
        user_id,
        request.decision,
        request.notes,
    )
    .await?;
    Ok(Json(profile))
}
