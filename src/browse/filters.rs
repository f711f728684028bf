//! Filter state driving what the browser shows

use chrono::Datelike;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

/// Canonical sort key; equal to "no sort chosen"
pub const DEFAULT_SORT: &str = "popularity.desc";

/// Sort keys offered by the filter bar, with display labels
pub const SORT_OPTIONS: &[(&str, &str)] = &[
    ("popularity.desc", "Popularity"),
    ("release_date.desc", "Release date (newest)"),
    ("release_date.asc", "Release date (oldest)"),
    ("vote_average.desc", "Rating (highest)"),
    ("vote_average.asc", "Rating (lowest)"),
];

/// Minimum-rating thresholds offered by the filter bar
pub const RATING_OPTIONS: &[f64] = &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];

/// Number of years offered, counting back from the current one
pub const YEAR_RANGE: i32 = 100;

/// Release years offered, newest first
pub fn year_options() -> Vec<i32> {
    let current = chrono::Local::now().year();
    (0..YEAR_RANGE).map(|i| current - i).collect()
}

/// Display label for a sort key
pub fn sort_label(key: &str) -> &str {
    SORT_OPTIONS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| *label)
        .unwrap_or(key)
}

/// Everything the user asked to see
///
/// `movie_text` and `actor_id` never hold values at the same time; the
/// controller clears one whenever the other is set.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub movie_text: String,
    pub actor_text: String,
    pub actor_id: Option<u64>,
    pub year: Option<i32>,
    pub genre_ids: BTreeSet<u32>,
    pub min_rating: Option<f64>,
    pub sort_key: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            movie_text: String::new(),
            actor_text: String::new(),
            actor_id: None,
            year: None,
            genre_ids: BTreeSet::new(),
            min_rating: None,
            sort_key: DEFAULT_SORT.to_string(),
        }
    }
}

impl FilterState {
    /// True when any of year, genres, minimum rating or a non-default sort is set
    pub fn has_discovery_filters(&self) -> bool {
        self.year.is_some()
            || !self.genre_ids.is_empty()
            || self.min_rating.is_some()
            || self.sort_key != DEFAULT_SORT
    }

    /// Trimmed title search text, if any
    pub fn movie_query(&self) -> Option<&str> {
        Some(self.movie_text.trim()).filter(|q| !q.is_empty())
    }

    /// The discovery part of the state, with default sort mapped to `None`
    pub fn discover_filters(&self) -> DiscoverFilters {
        DiscoverFilters {
            year: self.year,
            genre_ids: self.genre_ids.clone(),
            min_rating: self.min_rating,
            sort_by: (self.sort_key != DEFAULT_SORT).then(|| self.sort_key.clone()),
        }
    }

    /// Drop the selected actor and its display text
    pub fn clear_actor(&mut self) {
        self.actor_id = None;
        self.actor_text.clear();
    }

    /// Add the genre if absent, remove it if present
    pub fn toggle_genre(&mut self, genre_id: u32) {
        if !self.genre_ids.remove(&genre_id) {
            self.genre_ids.insert(genre_id);
        }
    }
}

/// Parameters for a filtered discovery request
#[derive(Debug, Clone, Default)]
pub struct DiscoverFilters {
    pub year: Option<i32>,
    pub genre_ids: BTreeSet<u32>,
    pub min_rating: Option<f64>,
    pub sort_by: Option<String>,
}

// Ratings compare by bit pattern so the filters can key a cache entry
impl PartialEq for DiscoverFilters {
    fn eq(&self, other: &Self) -> bool {
        self.year == other.year
            && self.genre_ids == other.genre_ids
            && self.min_rating.map(f64::to_bits) == other.min_rating.map(f64::to_bits)
            && self.sort_by == other.sort_by
    }
}

impl Eq for DiscoverFilters {}

impl Hash for DiscoverFilters {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.year.hash(state);
        self.genre_ids.hash(state);
        self.min_rating.map(f64::to_bits).hash(state);
        self.sort_by.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_discovery_filters() {
        assert!(!FilterState::default().has_discovery_filters());
    }

    #[test]
    fn test_each_discovery_field_counts() {
        let mut year = FilterState::default();
        year.year = Some(2020);
        let mut genres = FilterState::default();
        genres.toggle_genre(28);
        let mut rating = FilterState::default();
        rating.min_rating = Some(7.0);
        let mut sort = FilterState::default();
        sort.sort_key = "vote_average.desc".to_string();

        for state in [year, genres, rating, sort] {
            assert!(state.has_discovery_filters(), "{:?}", state);
        }
    }

    #[test]
    fn test_toggle_genre_twice_removes_it() {
        let mut state = FilterState::default();
        state.toggle_genre(28);
        state.toggle_genre(12);
        state.toggle_genre(28);
        assert_eq!(state.genre_ids, BTreeSet::from([12]));
    }

    #[test]
    fn test_movie_query_is_trimmed() {
        let mut state = FilterState::default();
        state.movie_text = "   ".to_string();
        assert_eq!(state.movie_query(), None);
        state.movie_text = "  alien ".to_string();
        assert_eq!(state.movie_query(), Some("alien"));
    }

    #[test]
    fn test_discover_filters_hide_default_sort() {
        let state = FilterState::default();
        assert_eq!(state.discover_filters().sort_by, None);
    }

    #[test]
    fn test_year_options_cover_a_century() {
        let years = year_options();
        assert_eq!(years.len(), 100);
        assert!(years[0] > years[99]);
        assert_eq!(years[0] - years[99], 99);
    }

    #[test]
    fn test_sort_label_falls_back_to_key() {
        assert_eq!(sort_label("vote_average.asc"), "Rating (lowest)");
        assert_eq!(sort_label("revenue.desc"), "revenue.desc");
    }
}
