use serde::Serialize;

use crate::{
    db::CatalogStore,
    error::{AppError, AppResult},
    models::{
        ContentId, ModerationAction, NewReview, Review, ReviewFilter, ReviewId, Role, UserId,
    },
};

use super::roles::resolve_viewer;

/// Moderation queue page with counts across all reviews
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReviewListing {
    pub filter: ReviewFilter,
    pub reviews: Vec<Review>,
    pub pending_count: i64,
    pub approved_count: i64,
    pub total_count: i64,
}

fn validate_comment(comment: &str) -> AppResult<String> {
    let trimmed = comment.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(
            "Review comment cannot be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

async fn require_review(store: &dyn CatalogStore, review_id: ReviewId) -> AppResult<Review> {
    store
        .get_review(review_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Review {} not found", review_id)))
}

/// Stores a review. Active reviewers are published immediately and marked
/// verified; everyone else waits for moderation.
pub async fn submit_review(
    store: &dyn CatalogStore,
    user_id: UserId,
    content_id: ContentId,
    comment: &str,
) -> AppResult<Review> {
    let comment = validate_comment(comment)?;
    let author = resolve_viewer(store, user_id).await?;
    store
        .get_content(content_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content {} not found", content_id)))?;

    let trusted = author.has(Role::Reviewer);
    let review = store
        .insert_review(&NewReview {
            user_id,
            content_id,
            comment,
            is_approved: trusted,
            is_verified: trusted,
        })
        .await?;

    tracing::info!(
        user_id,
        content_id,
        review_id = review.id,
        approved = review.is_approved,
        "Review submitted"
    );
    Ok(review)
}

/// Rewrites the author's own review. A reviewer's approved review stays
/// approved; every other edit goes back to moderation.
pub async fn edit_review(
    store: &dyn CatalogStore,
    user_id: UserId,
    review_id: ReviewId,
    comment: &str,
) -> AppResult<Review> {
    let comment = validate_comment(comment)?;
    let author = resolve_viewer(store, user_id).await?;
    let review = require_review(store, review_id).await?;
    if review.user_id != user_id {
        return Err(AppError::Forbidden(
            "Only the author can edit a review".to_string(),
        ));
    }

    let approved = author.has(Role::Reviewer) && review.is_approved;
    store
        .update_review(review_id, &comment, approved)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Review {} not found", review_id)))
}

pub async fn delete_review(
    store: &dyn CatalogStore,
    user_id: UserId,
    review_id: ReviewId,
) -> AppResult<()> {
    let actor = resolve_viewer(store, user_id).await?;
    let review = require_review(store, review_id).await?;
    if review.user_id != user_id && !actor.is_admin() {
        return Err(AppError::Forbidden(
            "Only the author or an admin can delete a review".to_string(),
        ));
    }

    store.delete_review(review_id).await?;
    tracing::info!(user_id, review_id, "Review deleted");
    Ok(())
}

/// Approves a review, or rejects it by deleting it
pub async fn moderate_review(
    store: &dyn CatalogStore,
    review_id: ReviewId,
    action: ModerationAction,
) -> AppResult<()> {
    let changed = match action {
        ModerationAction::Approve => store.set_review_approved(review_id, true).await?,
        ModerationAction::Reject => store.delete_review(review_id).await?,
    };
    if !changed {
        return Err(AppError::NotFound(format!("Review {} not found", review_id)));
    }
    tracing::info!(review_id, action = ?action, "Review moderated");
    Ok(())
}

pub async fn list_reviews(store: &dyn CatalogStore, filter: ReviewFilter) -> AppResult<ReviewListing> {
    let reviews = store.list_reviews(filter).await?;
    let counts = store.dashboard_counts().await?;
    Ok(ReviewListing {
        filter,
        reviews,
        pending_count: counts.pending_reviews,
        approved_count: counts.approved_reviews,
        total_count: counts.total_reviews,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{Genre, NewContent};
    use chrono::NaiveDate;

    async fn setup() -> (MemoryStore, UserId, ContentId) {
        let store = MemoryStore::new();
        let user = store.insert_user("author").await;
        let content = store
            .insert_content(NewContent::new(
                "Paddington 2",
                Genre::Comedy,
                NaiveDate::from_ymd_opt(2017, 11, 10).unwrap(),
            ))
            .await;
        (store, user.id, content.id)
    }

    #[tokio::test]
    async fn test_regular_review_waits_for_moderation() {
        let (store, user_id, content_id) = setup().await;
        let review = submit_review(&store, user_id, content_id, "  Lovely  ").await.unwrap();
        assert_eq!(review.comment, "Lovely");
        assert!(!review.is_approved);
        assert!(!review.is_verified);

        let listing = list_reviews(&store, ReviewFilter::Pending).await.unwrap();
        assert_eq!(listing.reviews.len(), 1);
        assert_eq!(listing.pending_count, 1);
        assert_eq!(listing.approved_count, 0);

        moderate_review(&store, review.id, ModerationAction::Approve).await.unwrap();
        let listing = list_reviews(&store, ReviewFilter::Approved).await.unwrap();
        assert_eq!(listing.reviews.len(), 1);
        assert_eq!(listing.total_count, 1);
    }

    #[tokio::test]
    async fn test_reviewer_is_auto_approved() {
        let (store, user_id, content_id) = setup().await;
        store.grant_role(user_id, Role::Reviewer).await.unwrap();

        let review = submit_review(&store, user_id, content_id, "Superb").await.unwrap();
        assert!(review.is_approved);
        assert!(review.is_verified);

        let edited = edit_review(&store, user_id, review.id, "Still superb").await.unwrap();
        assert!(edited.is_approved);
    }

    #[tokio::test]
    async fn test_edit_resets_approval_for_regular_author() {
        let (store, user_id, content_id) = setup().await;
        let review = submit_review(&store, user_id, content_id, "Fine").await.unwrap();
        moderate_review(&store, review.id, ModerationAction::Approve).await.unwrap();

        let edited = edit_review(&store, user_id, review.id, "Actually great").await.unwrap();
        assert_eq!(edited.comment, "Actually great");
        assert!(!edited.is_approved);
    }

    #[tokio::test]
    async fn test_pending_review_stays_pending_after_promotion() {
        let (store, user_id, content_id) = setup().await;
        let review = submit_review(&store, user_id, content_id, "Early take").await.unwrap();
        assert!(!review.is_approved);

        store.grant_role(user_id, Role::Reviewer).await.unwrap();
        let edited = edit_review(&store, user_id, review.id, "Revised take").await.unwrap();
        assert!(!edited.is_approved);

        let queue = list_reviews(&store, ReviewFilter::Pending).await.unwrap();
        assert_eq!(queue.reviews.len(), 1);
    }

    #[tokio::test]
    async fn test_ownership_rules() {
        let (store, user_id, content_id) = setup().await;
        let stranger = store.insert_user("stranger").await.id;
        let admin = store.insert_admin("admin").await.id;
        let review = submit_review(&store, user_id, content_id, "Mine").await.unwrap();

        assert!(matches!(
            edit_review(&store, stranger, review.id, "Hijacked").await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            delete_review(&store, stranger, review.id).await,
            Err(AppError::Forbidden(_))
        ));

        delete_review(&store, admin, review.id).await.unwrap();
        assert!(store.get_review(review.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reject_deletes_and_missing_is_not_found() {
        let (store, user_id, content_id) = setup().await;
        let review = submit_review(&store, user_id, content_id, "Spam").await.unwrap();

        moderate_review(&store, review.id, ModerationAction::Reject).await.unwrap();
        assert!(store.get_review(review.id).await.unwrap().is_none());
        assert!(matches!(
            moderate_review(&store, review.id, ModerationAction::Approve).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_comment_rejected() {
        let (store, user_id, content_id) = setup().await;
        assert!(matches!(
            submit_review(&store, user_id, content_id, "   ").await,
            Err(AppError::InvalidInput(_))
        ));
    }
}
