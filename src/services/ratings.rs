use serde::Serialize;

use crate::{
    db::CatalogStore,
    error::{AppError, AppResult},
    models::{ContentId, Rating, RatingDistribution, RatingValue, UserId},
};

pub use crate::models::rating::mean_rating;

/// Aggregate rating of one item, computed from stored ratings on every call
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RatingSummary {
    pub content_id: ContentId,
    pub average_rating: f64,
    pub rating_count: usize,
}

pub async fn average_rating(
    store: &dyn CatalogStore,
    content_id: ContentId,
) -> AppResult<RatingSummary> {
    store
        .get_content(content_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content {} not found", content_id)))?;

    let values = store.rating_values(content_id).await?;
    Ok(RatingSummary {
        content_id,
        average_rating: mean_rating(&values),
        rating_count: values.len(),
    })
}

/// Records a user's star rating, replacing any earlier rating of the same item
pub async fn rate_content(
    store: &dyn CatalogStore,
    user_id: UserId,
    content_id: ContentId,
    value: i16,
) -> AppResult<Rating> {
    let value = RatingValue::try_from(value).map_err(|e| {
        tracing::warn!(user_id, content_id, value, "Rejected rating value");
        e
    })?;

    store
        .find_user(user_id)
        .await?
        .ok_or(AppError::InvalidUser(user_id))?;
    store
        .get_content(content_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content {} not found", content_id)))?;

    let rating = store.upsert_rating(user_id, content_id, value).await?;
    tracing::info!(user_id, content_id, value = rating.value, "Rating saved");
    Ok(rating)
}

pub fn rating_distribution(values: &[i16]) -> RatingDistribution {
    RatingDistribution::from_values(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{Genre, NewContent};
    use chrono::NaiveDate;

    async fn setup() -> (MemoryStore, UserId, ContentId) {
        let store = MemoryStore::new();
        let user = store.insert_user("rater").await;
        let content = store
            .insert_content(NewContent::new(
                "Arrival",
                Genre::SciFi,
                NaiveDate::from_ymd_opt(2016, 11, 11).unwrap(),
            ))
            .await;
        (store, user.id, content.id)
    }

    #[tokio::test]
    async fn test_unrated_item_averages_zero() {
        let (store, _, content_id) = setup().await;
        let summary = average_rating(&store, content_id).await.unwrap();
        assert_eq!(summary.average_rating, 0.0);
        assert_eq!(summary.rating_count, 0);
    }

    #[tokio::test]
    async fn test_average_reflects_latest_writes() {
        let (store, first, content_id) = setup().await;
        let second = store.insert_user("second").await.id;
        let third = store.insert_user("third").await.id;

        rate_content(&store, first, content_id, 3).await.unwrap();
        rate_content(&store, second, content_id, 4).await.unwrap();
        rate_content(&store, third, content_id, 5).await.unwrap();
        assert_eq!(average_rating(&store, content_id).await.unwrap().average_rating, 4.0);

        rate_content(&store, first, content_id, 5).await.unwrap();
        let summary = average_rating(&store, content_id).await.unwrap();
        assert!((summary.average_rating - 14.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.rating_count, 3);
    }

    #[tokio::test]
    async fn test_out_of_range_value_rejected() {
        let (store, user_id, content_id) = setup().await;
        for value in [0, 6, -1] {
            let result = rate_content(&store, user_id, content_id, value).await;
            assert!(matches!(result, Err(AppError::InvalidInput(_))));
        }
        assert!(store.rating_values(content_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rating_requires_user_and_content() {
        let (store, user_id, content_id) = setup().await;
        assert!(matches!(
            rate_content(&store, 404, content_id, 3).await,
            Err(AppError::InvalidUser(404))
        ));
        assert!(matches!(
            rate_content(&store, user_id, 404, 3).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            average_rating(&store, 404).await,
            Err(AppError::NotFound(_))
        ));
    }
}
