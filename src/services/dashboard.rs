use crate::{
    db::CatalogStore,
    error::AppResult,
    models::{Role, UserDashboard, UserId},
};

use super::{recommendations::recommend, roles::resolve_viewer};

const WATCHLIST_PREVIEW: usize = 6;
const RECENT_RATINGS: usize = 5;
const RECENT_REVIEWS: usize = 5;

/// Personal landing page: watchlist preview, latest activity and recommendations
pub async fn user_dashboard(store: &dyn CatalogStore, user_id: UserId) -> AppResult<UserDashboard> {
    let viewer = resolve_viewer(store, user_id).await?;

    let mut watchlist = store.watchlist(user_id).await?;
    watchlist.truncate(WATCHLIST_PREVIEW);
    let mut recent_ratings = store.user_ratings(user_id).await?;
    recent_ratings.truncate(RECENT_RATINGS);
    let recent_reviews = store.recent_reviews(Some(user_id), RECENT_REVIEWS).await?;
    let recommendations = recommend(store, user_id).await?;

    Ok(UserDashboard {
        user_id,
        is_reviewer: viewer.has(Role::Reviewer),
        watchlist,
        recent_ratings,
        recent_reviews,
        recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::error::AppError;
    use crate::models::{ContentId, Genre, NewContent, NewReview, RatingValue};
    use chrono::NaiveDate;

    async fn catalog(store: &MemoryStore, count: usize) -> Vec<ContentId> {
        let date = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        let mut ids = Vec::new();
        for n in 0..count {
            let genre = if n % 2 == 0 { Genre::Drama } else { Genre::Comedy };
            ids.push(
                store
                    .insert_content(NewContent::new(format!("Title {}", n), genre, date))
                    .await
                    .id,
            );
        }
        ids
    }

    #[tokio::test]
    async fn test_dashboard_caps_each_section() {
        let store = MemoryStore::new();
        let user = store.insert_user("member").await.id;
        let other = store.insert_user("other").await.id;
        let ids = catalog(&store, 12).await;

        for id in &ids[..8] {
            store.add_to_watchlist(user, *id).await.unwrap();
        }
        for id in &ids[..7] {
            store
                .upsert_rating(user, *id, RatingValue::try_from(3).unwrap())
                .await
                .unwrap();
        }
        for (n, id) in ids[..7].iter().enumerate() {
            store
                .insert_review(&NewReview {
                    user_id: user,
                    content_id: *id,
                    comment: format!("Thoughts {}", n),
                    is_approved: false,
                    is_verified: false,
                })
                .await
                .unwrap();
        }
        store
            .insert_review(&NewReview {
                user_id: other,
                content_id: ids[0],
                comment: "Someone else".to_string(),
                is_approved: true,
                is_verified: false,
            })
            .await
            .unwrap();

        let dashboard = user_dashboard(&store, user).await.unwrap();
        assert!(!dashboard.is_reviewer);
        assert_eq!(dashboard.watchlist.len(), 6);
        assert_eq!(dashboard.watchlist[0].summary.id, ids[7]);
        assert_eq!(dashboard.recent_ratings.len(), 5);
        assert_eq!(dashboard.recent_ratings[0].content_id, ids[6]);
        assert_eq!(dashboard.recent_reviews.len(), 5);
        assert_eq!(dashboard.recent_reviews[0].comment, "Thoughts 6");
        assert!(dashboard.recent_reviews.iter().all(|r| r.user_id == user));

        let rated: Vec<ContentId> = ids[..7].to_vec();
        assert!(!dashboard.recommendations.is_empty());
        assert!(dashboard
            .recommendations
            .iter()
            .all(|s| !rated.contains(&s.id)));
    }

    #[tokio::test]
    async fn test_dashboard_flags_reviewers() {
        let store = MemoryStore::new();
        let user = store.insert_user("critic").await.id;
        store.grant_role(user, Role::Reviewer).await.unwrap();
        catalog(&store, 2).await;

        let dashboard = user_dashboard(&store, user).await.unwrap();
        assert!(dashboard.is_reviewer);
        assert!(dashboard.watchlist.is_empty());
        assert_eq!(dashboard.recommendations.len(), 2);
    }

    #[tokio::test]
    async fn test_dashboard_for_unknown_user() {
        let store = MemoryStore::new();
        assert!(matches!(
            user_dashboard(&store, 77).await,
            Err(AppError::InvalidUser(77))
        ));
    }
}
