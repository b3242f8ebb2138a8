use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{
        BrowsePage, BrowseQuery, ContentDetail, ContentId, ContentSummary, GenreCount,
        OttAvailability, OttListing, OttQuery, Rating, TrendingItem, UserId,
    },
    routes::AppState,
    services::{
        catalog::{self, DETAIL_SIMILAR_LIMIT},
        ott,
        ratings::{self, RatingSummary},
    },
};

#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    pub viewer: Option<UserId>,
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub user_id: UserId,
    pub value: i16,
}

#[derive(Debug, Deserialize)]
pub struct OttRequest {
    pub user_id: UserId,
    #[serde(flatten)]
    pub listing: OttListing,
}

/// Handler for the public catalog listing
pub async fn browse(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BrowseQuery>,
) -> AppResult<Json<BrowsePage>> {
    Ok(Json(catalog::browse(state.store.as_ref(), query).await?))
}

pub async fn ott_browse(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OttQuery>,
) -> AppResult<Json<Vec<ContentSummary>>> {
    Ok(Json(ott::browse(state.store.as_ref(), query).await?))
}

pub async fn ott_availability(
    State(state): State<Arc<AppState>>,
    Path(content_id): Path<ContentId>,
) -> AppResult<Json<Vec<OttAvailability>>> {
    Ok(Json(ott::availability(state.store.as_ref(), content_id).await?))
}

pub async fn set_ott_availability(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(content_id): Path<ContentId>,
    Json(request): Json<OttRequest>,
) -> AppResult<Json<OttAvailability>> {
    tracing::info!(
        request_id = %request_id,
        user_id = request.user_id,
        content_id,
        "Processing streaming availability"
    );
    let availability =
        ott::set_availability(state.store.as_ref(), request.user_id, content_id, request.listing)
            .await?;
    Ok(Json(availability))
}

pub async fn trending(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<TrendingItem>>> {
    let today = Utc::now().date_naive();
    Ok(Json(catalog::trending(state.store.as_ref(), today).await?))
}

pub async fn popular_genres(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<GenreCount>>> {
    Ok(Json(catalog::popular_genres(state.store.as_ref()).await?))
}

pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path(content_id): Path<ContentId>,
    Query(params): Query<DetailQuery>,
) -> AppResult<Json<ContentDetail>> {
    Ok(Json(
        catalog::content_detail(state.store.as_ref(), content_id, params.viewer).await?,
    ))
}

pub async fn similar(
    State(state): State<Arc<AppState>>,
    Path(content_id): Path<ContentId>,
) -> AppResult<Json<Vec<ContentSummary>>> {
    Ok(Json(
        catalog::similar_content(state.store.as_ref(), content_id, DETAIL_SIMILAR_LIMIT).await?,
    ))
}

/// Handler for creating or updating a rating
pub async fn rate(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(content_id): Path<ContentId>,
    Json(request): Json<RateRequest>,
) -> AppResult<Json<Rating>> {
    tracing::info!(
        request_id = %request_id,
        user_id = request.user_id,
        content_id,
        "Processing rating"
    );
    let rating =
        ratings::rate_content(state.store.as_ref(), request.user_id, content_id, request.value)
            .await?;
    Ok(Json(rating))
}

pub async fn rating(
    State(state): State<Arc<AppState>>,
    Path(content_id): Path<ContentId>,
) -> AppResult<Json<RatingSummary>> {
    Ok(Json(ratings::average_rating(state.store.as_ref(), content_id).await?))
}
