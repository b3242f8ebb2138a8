use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt::Display};

pub type ContentId = i64;

/// Catalog genre.
///
/// Variants are declared in display-name order so that the derived `Ord`
/// is lexicographic on the name shown to users.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "genre")]
pub enum Genre {
    Action,
    Animation,
    Comedy,
    Documentary,
    Drama,
    Fantasy,
    Horror,
    Romance,
    #[serde(rename = "Sci-Fi")]
    #[sqlx(rename = "Sci-Fi")]
    SciFi,
    Thriller,
}

impl Genre {
    pub const ALL: [Genre; 10] = [
        Genre::Action,
        Genre::Animation,
        Genre::Comedy,
        Genre::Documentary,
        Genre::Drama,
        Genre::Fantasy,
        Genre::Horror,
        Genre::Romance,
        Genre::SciFi,
        Genre::Thriller,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Animation => "Animation",
            Genre::Comedy => "Comedy",
            Genre::Documentary => "Documentary",
            Genre::Drama => "Drama",
            Genre::Fantasy => "Fantasy",
            Genre::Horror => "Horror",
            Genre::Romance => "Romance",
            Genre::SciFi => "Sci-Fi",
            Genre::Thriller => "Thriller",
        }
    }
}

impl Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "content_type")]
pub enum ContentType {
    Movie,
    #[serde(rename = "Web Series")]
    #[sqlx(rename = "Web Series")]
    WebSeries,
    #[serde(rename = "TV Show")]
    #[sqlx(rename = "TV Show")]
    TvShow,
    Documentary,
}

/// A movie or show in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Content {
    pub id: ContentId,
    pub title: String,
    pub description: String,
    pub genre: Genre,
    pub language: String,
    pub content_type: ContentType,
    pub release_date: NaiveDate,
    pub duration: Option<String>,
    pub director: Option<String>,
    pub cast_members: Option<String>,
    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields of a catalog item before it is stored
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NewContent {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub genre: Genre,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_content_type")]
    pub content_type: ContentType,
    pub release_date: NaiveDate,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub cast_members: Option<String>,
}

fn default_language() -> String {
    "English".to_string()
}

fn default_content_type() -> ContentType {
    ContentType::Movie
}

impl NewContent {
    pub fn new(title: impl Into<String>, genre: Genre, release_date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            genre,
            language: default_language(),
            content_type: default_content_type(),
            release_date,
            duration: None,
            director: None,
            cast_members: None,
        }
    }
}

/// Catalog entry with its rating aggregate, computed at query time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct ContentSummary {
    pub id: ContentId,
    pub title: String,
    pub genre: Genre,
    pub content_type: ContentType,
    pub release_date: NaiveDate,
    /// Mean of all rating values, 0 when unrated
    pub average_rating: f64,
    pub rating_count: i64,
}

impl ContentSummary {
    /// Canonical popularity order: highest average first, then lowest id.
    ///
    /// Unrated items carry an average of 0 and so fall behind every rated
    /// item.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .average_rating
            .total_cmp(&self.average_rating)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Filter for ranked catalog reads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentQuery {
    pub genre: Option<Genre>,
    pub exclude: Vec<ContentId>,
    pub limit: usize,
}

impl ContentQuery {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn genre(mut self, genre: Genre) -> Self {
        self.genre = Some(genre);
        self
    }

    pub fn excluding<I: IntoIterator<Item = ContentId>>(mut self, ids: I) -> Self {
        self.exclude.extend(ids);
        self
    }

    pub fn matches(&self, summary: &ContentSummary) -> bool {
        self.genre.map_or(true, |g| g == summary.genre) && !self.exclude.contains(&summary.id)
    }
}

/// Catalog listing order; keys are the query-string values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BrowseSort {
    #[default]
    #[serde(rename = "-created_at")]
    Newest,
    #[serde(rename = "created_at")]
    Oldest,
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "-title")]
    TitleDesc,
    #[serde(rename = "release_date")]
    ReleaseDate,
    #[serde(rename = "-release_date")]
    ReleaseDateDesc,
    #[serde(rename = "-average_rating")]
    TopRated,
}

/// Filters of the public catalog listing. Every filter is optional and
/// they combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BrowseQuery {
    pub genre: Option<Genre>,
    pub language: Option<String>,
    pub content_type: Option<ContentType>,
    /// Case-insensitive substring of title, description, director or cast
    pub search: Option<String>,
    #[serde(default)]
    pub sort: BrowseSort,
}

impl BrowseQuery {
    /// Trims text filters and drops the blank ones
    pub fn normalized(mut self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }
        self.language = clean(self.language);
        self.search = clean(self.search);
        self
    }

    pub fn matches(&self, content: &Content) -> bool {
        if self.genre.is_some_and(|g| g != content.genre) {
            return false;
        }
        if self.content_type.is_some_and(|t| t != content.content_type) {
            return false;
        }
        if let Some(language) = &self.language {
            if content.language != *language {
                return false;
            }
        }
        match &self.search {
            Some(term) => {
                let term = term.to_lowercase();
                [
                    Some(content.title.as_str()),
                    Some(content.description.as_str()),
                    content.director.as_deref(),
                    content.cast_members.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&term))
            }
            None => true,
        }
    }
}

/// Genre with the number of catalog items tagged with it
#[derive(Debug, Clone, Serialize, PartialEq, Eq, sqlx::FromRow)]
pub struct GenreCount {
    pub genre: Genre,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: ContentId, average_rating: f64) -> ContentSummary {
        ContentSummary {
            id,
            title: format!("Title {}", id),
            genre: Genre::Drama,
            content_type: ContentType::Movie,
            release_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            average_rating,
            rating_count: if average_rating > 0.0 { 1 } else { 0 },
        }
    }

    #[test]
    fn test_genre_serde_uses_display_name() {
        assert_eq!(serde_json::to_string(&Genre::SciFi).unwrap(), "\"Sci-Fi\"");
        let parsed: Genre = serde_json::from_str("\"Sci-Fi\"").unwrap();
        assert_eq!(parsed, Genre::SciFi);
    }

    #[test]
    fn test_genre_order_is_lexicographic() {
        let mut names: Vec<&str> = Genre::ALL.iter().map(Genre::as_str).collect();
        names.sort();
        let ordered: Vec<&str> = Genre::ALL.iter().map(Genre::as_str).collect();
        assert_eq!(names, ordered);
        assert!(Genre::Action < Genre::Comedy);
    }

    #[test]
    fn test_content_type_serde() {
        assert_eq!(
            serde_json::to_string(&ContentType::WebSeries).unwrap(),
            "\"Web Series\""
        );
        assert_eq!(serde_json::to_string(&ContentType::TvShow).unwrap(), "\"TV Show\"");
    }

    #[test]
    fn test_rank_cmp_orders_by_average_then_id() {
        let mut items = vec![summary(3, 4.0), summary(1, 0.0), summary(2, 4.0), summary(4, 4.5)];
        items.sort_by(ContentSummary::rank_cmp);
        let ids: Vec<ContentId> = items.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![4, 2, 3, 1]);
    }

    fn content(title: &str) -> Content {
        Content {
            id: 1,
            title: title.to_string(),
            description: "A heist across three cities".to_string(),
            genre: Genre::Thriller,
            language: "Hindi".to_string(),
            content_type: ContentType::WebSeries,
            release_date: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
            duration: None,
            director: Some("Raj Nidimoru".to_string()),
            cast_members: Some("Manoj Bajpayee, Priyamani".to_string()),
            poster_url: None,
            trailer_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_browse_search_covers_people_and_text() {
        let item = content("The Family Man");
        for term in ["family", "HEIST", "nidimoru", "priyamani"] {
            let query = BrowseQuery {
                search: Some(term.to_string()),
                ..BrowseQuery::default()
            };
            assert!(query.matches(&item), "{} should match", term);
        }
        let miss = BrowseQuery {
            search: Some("comedy".to_string()),
            ..BrowseQuery::default()
        };
        assert!(!miss.matches(&item));
    }

    #[test]
    fn test_browse_filters_combine() {
        let item = content("Paatal Lok");
        let query = BrowseQuery {
            genre: Some(Genre::Thriller),
            language: Some("Hindi".to_string()),
            content_type: Some(ContentType::WebSeries),
            ..BrowseQuery::default()
        };
        assert!(query.matches(&item));

        let movie_only = BrowseQuery {
            content_type: Some(ContentType::Movie),
            ..query.clone()
        };
        assert!(!movie_only.matches(&item));

        let tamil = BrowseQuery {
            language: Some("Tamil".to_string()),
            ..query
        };
        assert!(!tamil.matches(&item));
    }

    #[test]
    fn test_browse_query_drops_blank_text() {
        let query = BrowseQuery {
            language: Some("  ".to_string()),
            search: Some(" noir ".to_string()),
            ..BrowseQuery::default()
        }
        .normalized();
        assert_eq!(query.language, None);
        assert_eq!(query.search.as_deref(), Some("noir"));
    }

    #[test]
    fn test_browse_sort_keys() {
        let sort: BrowseSort = serde_json::from_str("\"-release_date\"").unwrap();
        assert_eq!(sort, BrowseSort::ReleaseDateDesc);
        assert_eq!(BrowseSort::default(), BrowseSort::Newest);
    }

    #[test]
    fn test_query_matches_genre_and_exclusion() {
        let query = ContentQuery::new(3).genre(Genre::Drama).excluding([2]);
        assert!(query.matches(&summary(1, 3.0)));
        assert!(!query.matches(&summary(2, 3.0)));

        let comedy = ContentSummary {
            genre: Genre::Comedy,
            ..summary(5, 3.0)
        };
        assert!(!query.matches(&comedy));
    }
}
