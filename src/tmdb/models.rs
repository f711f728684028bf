//! TMDB API response models

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Base URL for poster images at the size used by the browser
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Overviews longer than this are truncated until expanded
pub const MAX_OVERVIEW_LENGTH: usize = 70;

/// Movie as returned by list endpoints (popular, search, discover)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre_ids: Option<Vec<u32>>,
}

/// Colour band for a movie's rating badge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingClass {
    High,
    Medium,
    Low,
}

impl Movie {
    /// Year part of the release date (`"2019-10-04"` -> `"2019"`)
    pub fn release_year(&self) -> Option<&str> {
        self.release_date
            .split('-')
            .next()
            .filter(|year| !year.is_empty())
    }

    pub fn poster_url(&self) -> Option<String> {
        self.poster_path
            .as_ref()
            .map(|path| format!("{}{}", POSTER_BASE_URL, path))
    }

    pub fn rating_class(&self) -> Option<RatingClass> {
        self.vote_average.map(|rating| {
            if rating >= 7.0 {
                RatingClass::High
            } else if rating >= 5.0 {
                RatingClass::Medium
            } else {
                RatingClass::Low
            }
        })
    }

    /// Rating formatted with one decimal, as shown on the badge
    pub fn rating_label(&self) -> Option<String> {
        self.vote_average.map(|rating| format!("{:.1}", rating))
    }

    /// Overview text, cut at [`MAX_OVERVIEW_LENGTH`] characters unless expanded
    pub fn display_overview(&self, expanded: bool) -> String {
        let overview = self.overview.as_deref().unwrap_or("");
        if expanded || overview.chars().count() <= MAX_OVERVIEW_LENGTH {
            return overview.to_string();
        }
        let cut: String = overview.chars().take(MAX_OVERVIEW_LENGTH).collect();
        format!("{}...", cut)
    }
}

/// One page of movie results
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageResult {
    pub results: Vec<Movie>,
    pub page: u32,
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

impl PageResult {
    /// Page number to request after this one, if any
    pub fn next_page(&self) -> Option<u32> {
        if self.page < self.total_pages {
            Some(self.page + 1)
        } else {
            None
        }
    }
}

/// Genre entry from the genre list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

// Genre list response (genre/movie/list)
#[derive(Debug, Clone, Deserialize)]
pub struct GenresResponse {
    #[serde(default)]
    pub genres: Vec<Genre>,
}

/// Lookup from genre id to display name
#[derive(Debug, Clone, Default)]
pub struct GenreMap {
    genres: Vec<Genre>,
    names: HashMap<u32, String>,
}

impl GenreMap {
    pub fn new(genres: Vec<Genre>) -> Self {
        let names = genres.iter().map(|g| (g.id, g.name.clone())).collect();
        Self { genres, names }
    }

    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }

    /// Names for the given ids, skipping ids the catalog doesn't know
    pub fn genre_names(&self, ids: Option<&[u32]>) -> Vec<&str> {
        ids.unwrap_or_default()
            .iter()
            .filter_map(|id| self.names.get(id).map(String::as_str))
            .collect()
    }
}

/// Actor identity from person search
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Person {
    pub id: u64,
    pub name: String,
}

// Person search response (search/person)
#[derive(Debug, Clone, Deserialize)]
pub struct PersonPage {
    #[serde(default)]
    pub results: Vec<Person>,
}

// Error body returned alongside non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbStatus {
    pub status_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(rating: Option<f64>, overview: Option<&str>) -> Movie {
        Movie {
            id: 550,
            title: "Fight Club".to_string(),
            poster_path: Some("/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg".to_string()),
            release_date: "1999-10-15".to_string(),
            overview: overview.map(str::to_string),
            vote_average: rating,
            backdrop_path: None,
            genre_ids: Some(vec![18]),
        }
    }

    #[test]
    fn test_parse_page() {
        let json = r#"{
            "page": 1,
            "results": [
                {"id": 550, "title": "Fight Club", "poster_path": null, "release_date": "1999-10-15",
                 "vote_average": 8.4, "genre_ids": [18], "adult": false}
            ],
            "total_pages": 3,
            "total_results": 55
        }"#;
        let page: PageResult = serde_json::from_str(json).unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].poster_path, None);
        assert_eq!(page.next_page(), Some(2));
        assert_eq!(page.total_results, 55);
    }

    #[test]
    fn test_parse_person_page_ignores_extra_fields() {
        let json = r#"{
            "page": 1,
            "results": [{"id": 287, "name": "Brad Pitt", "known_for": [{"id": 550}]}],
            "total_pages": 1,
            "total_results": 1
        }"#;
        let page: PersonPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.results, vec![Person { id: 287, name: "Brad Pitt".to_string() }]);
    }

    #[test]
    fn test_last_page_has_no_next() {
        let page = PageResult {
            results: vec![],
            page: 3,
            total_pages: 3,
            total_results: 0,
        };
        assert_eq!(page.next_page(), None);
    }

    #[test]
    fn test_release_year() {
        assert_eq!(movie(None, None).release_year(), Some("1999"));
        let mut undated = movie(None, None);
        undated.release_date.clear();
        assert_eq!(undated.release_year(), None);
    }

    #[test]
    fn test_rating_class_bands() {
        assert_eq!(movie(Some(7.0), None).rating_class(), Some(RatingClass::High));
        assert_eq!(movie(Some(6.9), None).rating_class(), Some(RatingClass::Medium));
        assert_eq!(movie(Some(4.99), None).rating_class(), Some(RatingClass::Low));
        assert_eq!(movie(None, None).rating_class(), None);
        assert_eq!(movie(Some(8.43), None).rating_label().as_deref(), Some("8.4"));
    }

    #[test]
    fn test_overview_truncation() {
        let long = "a".repeat(80);
        let m = movie(None, Some(&long));
        assert_eq!(m.display_overview(false), format!("{}...", "a".repeat(70)));
        assert_eq!(m.display_overview(true), long);
        assert_eq!(movie(None, Some("short")).display_overview(false), "short");
    }

    #[test]
    fn test_genre_names_skip_unknown() {
        let map = GenreMap::new(vec![
            Genre { id: 28, name: "Action".to_string() },
            Genre { id: 18, name: "Drama".to_string() },
        ]);
        assert_eq!(map.genre_names(Some(&[18, 99, 28][..])), vec!["Drama", "Action"]);
        assert!(map.genre_names(None).is_empty());
        assert!(map.genre_names(Some(&[][..])).is_empty());
    }
}
