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
    models::{ContentId, Review, ReviewId, UserId},
    routes::AppState,
    services::reviews,
};

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub user_id: UserId,
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteReviewRequest {
    pub user_id: UserId,
}

pub async fn submit(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(content_id): Path<ContentId>,
    Json(request): Json<ReviewRequest>,
) -> AppResult<(StatusCode, Json<Review>)> {
    tracing::info!(
        request_id = %request_id,
        user_id = request.user_id,
        content_id,
        "Processing review submission"
    );
    let review =
        reviews::submit_review(state.store.as_ref(), request.user_id, content_id, &request.comment)
            .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn edit(
    State(state): State<Arc<AppState>>,
    Path(review_id): Path<ReviewId>,
    Json(request): Json<ReviewRequest>,
) -> AppResult<Json<Review>> {
    let review =
        reviews::edit_review(state.store.as_ref(), request.user_id, review_id, &request.comment)
            .await?;
    Ok(Json(review))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(review_id): Path<ReviewId>,
    Json(request): Json<DeleteReviewRequest>,
) -> AppResult<StatusCode> {
    reviews::delete_review(state.store.as_ref(), request.user_id, review_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
