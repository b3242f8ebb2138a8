use chrono::NaiveDate;

use crate::{
    db::CatalogStore,
    error::{AppError, AppResult},
    models::{
        BrowsePage, BrowseQuery, Content, ContentDetail, ContentId, ContentQuery, ContentSummary,
        Genre, GenreCount, TrendingItem, UserId,
    },
};

use super::ratings::mean_rating;

/// Similar items shown on a content page
pub const DETAIL_SIMILAR_LIMIT: usize = 4;
const TRENDING_LIMIT: usize = 8;
const POPULAR_GENRE_LIMIT: usize = 5;

async fn require_content(store: &dyn CatalogStore, content_id: ContentId) -> AppResult<Content> {
    store
        .get_content(content_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content {} not found", content_id)))
}

/// Best-rated items sharing the genre of `content_id`, never the item itself
pub async fn similar_content(
    store: &dyn CatalogStore,
    content_id: ContentId,
    limit: usize,
) -> AppResult<Vec<ContentSummary>> {
    let content = require_content(store, content_id).await?;
    let query = ContentQuery::new(limit)
        .genre(content.genre)
        .excluding([content.id]);
    store.ranked_content(&query).await
}

/// Full page view of one item.
///
/// When `viewer` is given, the viewer's own rating and watchlist state are
/// included; an unknown viewer is an error rather than an anonymous view.
pub async fn content_detail(
    store: &dyn CatalogStore,
    content_id: ContentId,
    viewer: Option<UserId>,
) -> AppResult<ContentDetail> {
    let content = require_content(store, content_id).await?;
    let values = store.rating_values(content_id).await?;

    let (user_rating, in_watchlist) = match viewer {
        Some(user_id) => {
            store
                .find_user(user_id)
                .await?
                .ok_or(AppError::InvalidUser(user_id))?;
            let rating = store.user_rating_for(user_id, content_id).await?;
            let listed = store.in_watchlist(user_id, content_id).await?;
            (rating.map(|r| r.value), listed)
        }
        None => (None, false),
    };

    let similar = similar_content(store, content_id, DETAIL_SIMILAR_LIMIT).await?;
    let reviews = store.approved_reviews(content_id).await?;

    Ok(ContentDetail {
        content,
        average_rating: mean_rating(&values),
        rating_count: values.len(),
        user_rating,
        in_watchlist,
        similar_content: similar,
        reviews,
    })
}

/// The newest releases, best-rated first
pub async fn trending(store: &dyn CatalogStore, today: NaiveDate) -> AppResult<Vec<TrendingItem>> {
    let mut newest = store.newest_content(TRENDING_LIMIT).await?;
    newest.sort_by(|a, b| {
        b.average_rating
            .total_cmp(&a.average_rating)
            .then_with(|| b.release_date.cmp(&a.release_date))
            .then_with(|| a.id.cmp(&b.id))
    });
    Ok(newest
        .into_iter()
        .map(|summary| TrendingItem::new(summary, today))
        .collect())
}

/// Public catalog listing. Returns every match; blank text filters are ignored.
pub async fn browse(store: &dyn CatalogStore, query: BrowseQuery) -> AppResult<BrowsePage> {
    let query = query.normalized();
    let items = store.browse_content(&query).await?;
    let languages = store.content_languages().await?;
    tracing::debug!(
        genre = ?query.genre,
        language = ?query.language,
        search = ?query.search,
        matches = items.len(),
        "Catalog browsed"
    );
    Ok(BrowsePage {
        total: items.len(),
        items,
        genres: Genre::ALL.to_vec(),
        languages,
    })
}

pub async fn popular_genres(store: &dyn CatalogStore) -> AppResult<Vec<GenreCount>> {
    store.genre_counts(POPULAR_GENRE_LIMIT).await
}
