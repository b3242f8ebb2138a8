use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ContentId, Genre, UserId};
use crate::error::AppError;

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

/// One user's star rating of one content item; at most one per pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Rating {
    pub user_id: UserId,
    pub content_id: ContentId,
    pub value: i16,
    pub rated_at: DateTime<Utc>,
}

/// A user's rating joined with the genre of the rated item
#[derive(Debug, Clone, Serialize, PartialEq, Eq, sqlx::FromRow)]
pub struct UserRating {
    pub content_id: ContentId,
    pub genre: Genre,
    pub value: i16,
    pub rated_at: DateTime<Utc>,
}

/// Arithmetic mean of rating values; 0 when there are none
pub fn mean_rating(values: &[i16]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: i64 = values.iter().map(|v| i64::from(*v)).sum();
    sum as f64 / values.len() as f64
}

/// A star value known to lie in `1..=5`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RatingValue(i16);

impl RatingValue {
    pub fn get(self) -> i16 {
        self.0
    }
}

impl TryFrom<i16> for RatingValue {
    type Error = AppError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        if (MIN_RATING..=MAX_RATING).contains(&value) {
            Ok(Self(value))
        } else {
            Err(AppError::InvalidInput(format!(
                "Rating must be between {} and {}, got {}",
                MIN_RATING, MAX_RATING, value
            )))
        }
    }
}

/// Number of ratings per star value
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct RatingDistribution {
    /// Index 0 holds one-star ratings, index 4 five-star ratings
    pub counts: [u64; 5],
}

impl RatingDistribution {
    pub fn from_values(values: &[i16]) -> Self {
        let mut counts = [0u64; 5];
        for value in values {
            if let Ok(v) = RatingValue::try_from(*value) {
                counts[(v.get() - MIN_RATING) as usize] += 1;
            }
        }
        Self { counts }
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_rating() {
        assert_eq!(mean_rating(&[]), 0.0);
        assert_eq!(mean_rating(&[3, 4, 5]), 4.0);
        assert_eq!(mean_rating(&[1, 2]), 1.5);
    }

    #[test]
    fn test_rating_value_bounds() {
        assert!(RatingValue::try_from(1).is_ok());
        assert!(RatingValue::try_from(5).is_ok());
        assert!(matches!(
            RatingValue::try_from(0),
            Err(AppError::InvalidInput(_))
        ));
        assert!(RatingValue::try_from(6).is_err());
    }

    #[test]
    fn test_distribution_counts_each_star() {
        let dist = RatingDistribution::from_values(&[5, 5, 4, 1, 3, 5]);
        assert_eq!(dist.counts, [1, 0, 1, 1, 3]);
        assert_eq!(dist.total(), 6);
    }

    #[test]
    fn test_distribution_of_nothing_is_empty() {
        assert_eq!(RatingDistribution::from_values(&[]).total(), 0);
    }
}
