use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ContentId, UserId};

pub type ReviewId = i64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub content_id: ContentId,
    pub comment: String,
    pub is_approved: bool,
    /// Written by an active reviewer at submission time
    pub is_verified: bool,
    pub reviewed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub user_id: UserId,
    pub content_id: ContentId,
    pub comment: String,
    pub is_approved: bool,
    pub is_verified: bool,
}

/// Moderation queue view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewFilter {
    #[default]
    Pending,
    Approved,
    All,
}

impl ReviewFilter {
    pub fn accepts(self, review: &Review) -> bool {
        match self {
            ReviewFilter::Pending => !review.is_approved,
            ReviewFilter::Approved => review.is_approved,
            ReviewFilter::All => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationAction {
    Approve,
    /// Rejected reviews are deleted
    Reject,
}
