use crate::{
    db::CatalogStore,
    error::{AppError, AppResult},
    models::{ContentId, UserId, WatchlistEntry},
};

async fn require_user(store: &dyn CatalogStore, user_id: UserId) -> AppResult<()> {
    store
        .find_user(user_id)
        .await?
        .ok_or(AppError::InvalidUser(user_id))?;
    Ok(())
}

/// Adds an item to the user's watchlist. Adding a listed item again is a no-op.
pub async fn add(store: &dyn CatalogStore, user_id: UserId, content_id: ContentId) -> AppResult<()> {
    require_user(store, user_id).await?;
    store
        .get_content(content_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content {} not found", content_id)))?;
    store.add_to_watchlist(user_id, content_id).await?;
    tracing::debug!(user_id, content_id, "Added to watchlist");
    Ok(())
}

pub async fn remove(
    store: &dyn CatalogStore,
    user_id: UserId,
    content_id: ContentId,
) -> AppResult<()> {
    require_user(store, user_id).await?;
    if !store.remove_from_watchlist(user_id, content_id).await? {
        return Err(AppError::NotFound(format!(
            "Content {} is not in the watchlist",
            content_id
        )));
    }
    Ok(())
}

/// Watchlist entries, most recently added first
pub async fn list(store: &dyn CatalogStore, user_id: UserId) -> AppResult<Vec<WatchlistEntry>> {
    require_user(store, user_id).await?;
    store.watchlist(user_id).await
}
