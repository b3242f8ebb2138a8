use serde::{Deserialize, Serialize};

use super::ContentId;

/// Streaming service an item can be watched on.
///
/// Declaration order matches the `ott_platform` enum in the database.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "ott_platform")]
pub enum OttPlatform {
    Netflix,
    #[serde(rename = "Amazon Prime")]
    #[sqlx(rename = "Amazon Prime")]
    AmazonPrime,
    #[serde(rename = "Disney+")]
    #[sqlx(rename = "Disney+")]
    DisneyPlus,
    #[serde(rename = "SonyLIV")]
    #[sqlx(rename = "SonyLIV")]
    SonyLiv,
    Zee5,
    JioCinema,
    Other,
}

/// Where one item streams; at most one row per item and platform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct OttAvailability {
    pub content_id: ContentId,
    pub platform_name: OttPlatform,
    pub watch_url: Option<String>,
    pub is_free: bool,
}

/// Availability fields supplied by a content creator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OttListing {
    pub platform: OttPlatform,
    #[serde(default)]
    pub watch_url: Option<String>,
    #[serde(default)]
    pub is_free: bool,
}

/// Filters of the streaming browse page.
///
/// Both conditions must hold on the same availability row: with a platform
/// and `free_only`, only items free on that platform match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct OttQuery {
    pub platform: Option<OttPlatform>,
    #[serde(default)]
    pub free_only: bool,
}

impl OttQuery {
    pub fn accepts(&self, availability: &OttAvailability) -> bool {
        self.platform
            .map_or(true, |p| p == availability.platform_name)
            && (!self.free_only || availability.is_free)
    }
}

/// Catalog coverage of one platform
#[derive(Debug, Clone, Serialize, PartialEq, Eq, sqlx::FromRow)]
pub struct PlatformStats {
    pub platform_name: OttPlatform,
    pub total_content: i64,
    pub free_content: i64,
}
