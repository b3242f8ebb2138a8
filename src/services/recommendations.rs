use std::collections::{BTreeMap, HashSet};

use crate::{
    db::CatalogStore,
    error::{AppError, AppResult},
    models::{ContentId, ContentQuery, ContentSummary, Genre, UserId, UserRating},
};

/// Maximum number of recommendations returned
pub const MAX_RECOMMENDATIONS: usize = 6;
/// Genres drawn from the user's affinity ranking
const TOP_GENRE_COUNT: usize = 2;
/// Items fetched per favoured genre
const PER_GENRE_LIMIT: usize = 3;
/// Ratings below this signal indifference or dislike and are ignored
const HIGH_RATING_THRESHOLD: i16 = 4;

/// Accumulated weight of high ratings per genre, built per request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreAffinity {
    weights: BTreeMap<Genre, u32>,
}

impl GenreAffinity {
    pub fn weight(&self, genre: Genre) -> u32 {
        self.weights.get(&genre).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// The `n` heaviest genres, ties resolved by genre name ascending
    pub fn top(&self, n: usize) -> Vec<Genre> {
        let mut ranked: Vec<(Genre, u32)> = self.weights.iter().map(|(g, w)| (*g, *w)).collect();
        // BTreeMap yields genres in name order and sort_by is stable
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.into_iter().take(n).map(|(genre, _)| genre).collect()
    }
}

/// Sums every rating of 4 or more into the rated item's genre
pub fn genre_affinity(ratings: &[UserRating]) -> GenreAffinity {
    let mut weights = BTreeMap::new();
    for rating in ratings.iter().filter(|r| r.value >= HIGH_RATING_THRESHOLD) {
        *weights.entry(rating.genre).or_insert(0) += rating.value as u32;
    }
    GenreAffinity { weights }
}

/// Builds up to six personalised recommendations for a user
///
/// Items come first from the user's two favourite genres (three per genre,
/// best average first), then the remaining slots are filled with the
/// highest-average items across the whole catalog. Anything the user has
/// already rated is never returned, and no item appears twice.
///
/// Fails with [`AppError::InvalidUser`] when the user does not exist.
pub async fn recommend(store: &dyn CatalogStore, user_id: UserId) -> AppResult<Vec<ContentSummary>> {
    store
        .find_user(user_id)
        .await?
        .ok_or(AppError::InvalidUser(user_id))?;

    let ratings = store.user_ratings(user_id).await?;
    let rated: Vec<ContentId> = ratings.iter().map(|r| r.content_id).collect();

    let mut picked: Vec<ContentSummary> = Vec::with_capacity(MAX_RECOMMENDATIONS);
    let mut seen: HashSet<ContentId> = HashSet::new();

    let affinity = genre_affinity(&ratings);
    let top_genres = affinity.top(TOP_GENRE_COUNT);
    if affinity.is_empty() {
        tracing::debug!(user_id, rated = rated.len(), "No high ratings, using global ranking");
    } else {
        let weights: Vec<u32> = top_genres.iter().map(|g| affinity.weight(*g)).collect();
        tracing::debug!(
            user_id,
            rated = rated.len(),
            genres = ?top_genres,
            weights = ?weights,
            "Selected favourite genres"
        );
    }

    for genre in &top_genres {
        let query = ContentQuery::new(PER_GENRE_LIMIT)
            .genre(*genre)
            .excluding(rated.iter().copied());
        for item in store.ranked_content(&query).await? {
            if seen.insert(item.id) {
                picked.push(item);
            }
        }
    }

    let genre_matches = picked.len();

    if picked.len() < MAX_RECOMMENDATIONS {
        let query = ContentQuery::new(MAX_RECOMMENDATIONS - picked.len())
            .excluding(rated.iter().copied())
            .excluding(seen.iter().copied());
        for item in store.ranked_content(&query).await? {
            if seen.insert(item.id) {
                picked.push(item);
            }
        }
    }

    picked.truncate(MAX_RECOMMENDATIONS);

    tracing::info!(
        user_id,
        genre_matches,
        backfilled = picked.len().saturating_sub(genre_matches),
        total = picked.len(),
        "Recommendations generated"
    );

    Ok(picked)
}
