//! Query mode selection

use super::filters::{DiscoverFilters, FilterState};

/// The single query strategy behind the current result list
///
/// A mode value doubles as the cache key for its pages: two modes that
/// compare equal share pagination state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryMode {
    Popular,
    TitleSearch { query: String },
    ActorBrowse { actor_id: u64 },
    FilteredDiscovery(DiscoverFilters),
}

impl QueryMode {
    /// Pick the mode for a filter state by fixed precedence:
    /// discovery filters, then a selected actor, then title text, then popular.
    pub fn select(filters: &FilterState) -> Self {
        if filters.has_discovery_filters() {
            return QueryMode::FilteredDiscovery(filters.discover_filters());
        }
        if let Some(actor_id) = filters.actor_id {
            return QueryMode::ActorBrowse { actor_id };
        }
        if let Some(query) = filters.movie_query() {
            return QueryMode::TitleSearch {
                query: query.to_string(),
            };
        }
        QueryMode::Popular
    }

    pub fn label(&self) -> String {
        match self {
            QueryMode::Popular => "Popular".to_string(),
            QueryMode::TitleSearch { query } => format!("Search: {}", query),
            QueryMode::ActorBrowse { actor_id } => format!("Actor #{}", actor_id),
            QueryMode::FilteredDiscovery(_) => "Discover".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_state_is_popular() {
        assert_eq!(QueryMode::select(&FilterState::default()), QueryMode::Popular);
    }

    #[test]
    fn test_blank_movie_text_is_popular() {
        let mut state = FilterState::default();
        state.movie_text = "  ".to_string();
        assert_eq!(QueryMode::select(&state), QueryMode::Popular);
    }

    #[test]
    fn test_title_search() {
        let mut state = FilterState::default();
        state.movie_text = " matrix ".to_string();
        assert_eq!(
            QueryMode::select(&state),
            QueryMode::TitleSearch {
                query: "matrix".to_string()
            }
        );
    }

    #[test]
    fn test_actor_beats_title_text() {
        let mut state = FilterState::default();
        state.movie_text = "matrix".to_string();
        state.actor_id = Some(6384);
        assert_eq!(
            QueryMode::select(&state),
            QueryMode::ActorBrowse { actor_id: 6384 }
        );
    }

    #[test]
    fn test_actor_text_without_id_does_not_browse() {
        let mut state = FilterState::default();
        state.actor_text = "Keanu".to_string();
        assert_eq!(QueryMode::select(&state), QueryMode::Popular);
    }

    #[test]
    fn test_discovery_beats_everything() {
        let mut state = FilterState::default();
        state.movie_text = "matrix".to_string();
        state.actor_id = Some(6384);
        state.min_rating = Some(7.0);
        assert!(matches!(
            QueryMode::select(&state),
            QueryMode::FilteredDiscovery(ref f) if f.min_rating == Some(7.0)
        ));
    }

    #[test]
    fn test_selection_ignores_edit_history() {
        let mut a = FilterState::default();
        a.toggle_genre(28);
        a.toggle_genre(12);
        a.year = Some(1999);

        let mut b = FilterState::default();
        b.year = Some(2005);
        b.toggle_genre(12);
        b.toggle_genre(99);
        b.toggle_genre(28);
        b.toggle_genre(99);
        b.year = Some(1999);

        assert_eq!(QueryMode::select(&a), QueryMode::select(&b));
    }

    #[test]
    fn test_different_filters_are_different_keys() {
        let mut a = FilterState::default();
        a.year = Some(1999);
        let mut b = a.clone();
        b.year = Some(2000);
        assert_ne!(QueryMode::select(&a), QueryMode::select(&b));
    }
}
