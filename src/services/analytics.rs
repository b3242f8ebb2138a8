use crate::{
    db::CatalogStore,
    error::{AppError, AppResult},
    models::{ContentAnalytics, ContentId, DashboardStats, GoldenDashboard, Role, UserId, Viewer},
};

use super::{
    catalog::similar_content,
    ratings::{mean_rating, rating_distribution},
    roles::resolve_viewer,
};

const DASHBOARD_CONTENT_LIMIT: usize = 20;
const DASHBOARD_REVIEW_LIMIT: usize = 10;
const ANALYTICS_SIMILAR_LIMIT: usize = 5;

fn require_golden(viewer: &Viewer) -> AppResult<()> {
    if viewer.has(Role::GoldenUser) || viewer.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Analytics are available to verified golden users only".to_string(),
        ))
    }
}

pub async fn dashboard_stats(store: &dyn CatalogStore) -> AppResult<DashboardStats> {
    store.dashboard_counts().await
}

/// Most-rated content with engagement figures, for golden users and admins
pub async fn golden_dashboard(
    store: &dyn CatalogStore,
    user_id: UserId,
) -> AppResult<GoldenDashboard> {
    let viewer = resolve_viewer(store, user_id).await?;
    require_golden(&viewer)?;

    let content_stats = store.content_stats(DASHBOARD_CONTENT_LIMIT).await?;
    let recent_reviews = store.recent_reviews(None, DASHBOARD_REVIEW_LIMIT).await?;
    let platform_stats = store.platform_stats().await?;
    let counts = store.dashboard_counts().await?;
    let average_rating_all = store.overall_average_rating().await?;

    Ok(GoldenDashboard {
        content_stats,
        recent_reviews,
        platform_stats,
        total_content: counts.total_content,
        total_reviews: counts.total_reviews,
        average_rating_all,
    })
}

/// Rating breakdown, reviews and streaming rows of one item. Each call by a
/// golden user counts as one view on their profile.
pub async fn content_analytics(
    store: &dyn CatalogStore,
    user_id: UserId,
    content_id: ContentId,
) -> AppResult<ContentAnalytics> {
    let viewer = resolve_viewer(store, user_id).await?;
    require_golden(&viewer)?;

    let content = store
        .get_content(content_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content {} not found", content_id)))?;
    let values = store.rating_values(content_id).await?;
    let distribution = rating_distribution(&values);
    let reviews = store.approved_reviews(content_id).await?;
    let ott_availability = store.ott_for_content(content_id).await?;
    let similar = similar_content(store, content_id, ANALYTICS_SIMILAR_LIMIT).await?;

    if viewer.has(Role::GoldenUser) {
        store.increment_golden_views(user_id).await?;
    }
    tracing::debug!(user_id, content_id, "Content analytics viewed");

    Ok(ContentAnalytics {
        content,
        total_ratings: distribution.total(),
        distribution,
        average_rating: mean_rating(&values),
        total_reviews: reviews.len(),
        reviews,
        ott_availability,
        similar_content: similar,
    })
}
