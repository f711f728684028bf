//! Location query-string <-> filter state

use tracing::{debug, warn};
use url::Url;
use url::form_urlencoded;

use super::filters::{DEFAULT_SORT, FilterState};

const PARAM_MOVIE: &str = "movie";
const PARAM_ACTOR: &str = "actor";
const PARAM_ACTOR_ID: &str = "actorId";
const PARAM_YEAR: &str = "year";
const PARAM_GENRES: &str = "genres";
const PARAM_MIN_RATING: &str = "minRating";
const PARAM_SORT_BY: &str = "sortBy";

/// Encode filters as a query-string (no leading `?`)
///
/// Unset, empty and default-valued fields are left out, so an empty state
/// serializes to the empty string.
pub fn serialize(filters: &FilterState) -> String {
    let mut out = form_urlencoded::Serializer::new(String::new());

    if let Some(movie) = filters.movie_query() {
        out.append_pair(PARAM_MOVIE, movie);
    }
    let actor = filters.actor_text.trim();
    if !actor.is_empty() {
        out.append_pair(PARAM_ACTOR, actor);
    }
    if let Some(actor_id) = filters.actor_id {
        out.append_pair(PARAM_ACTOR_ID, &actor_id.to_string());
    }
    if let Some(year) = filters.year {
        out.append_pair(PARAM_YEAR, &year.to_string());
    }
    for genre in &filters.genre_ids {
        out.append_pair(PARAM_GENRES, &genre.to_string());
    }
    if let Some(rating) = filters.min_rating {
        out.append_pair(PARAM_MIN_RATING, &rating.to_string());
    }
    if !filters.sort_key.is_empty() && filters.sort_key != DEFAULT_SORT {
        out.append_pair(PARAM_SORT_BY, &filters.sort_key);
    }

    out.finish()
}

/// Decode a query-string into filters
///
/// Numeric values that don't parse are dropped one by one; the rest of the
/// query still applies.
pub fn deserialize(query: &str) -> FilterState {
    let mut filters = FilterState::default();

    for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.as_ref() {
            PARAM_MOVIE => filters.movie_text = value.to_string(),
            PARAM_ACTOR => filters.actor_text = value.to_string(),
            PARAM_ACTOR_ID => filters.actor_id = parse_or_warn(&key, value),
            PARAM_YEAR => filters.year = parse_or_warn(&key, value),
            PARAM_GENRES => {
                if let Some(genre) = parse_or_warn(&key, value) {
                    filters.genre_ids.insert(genre);
                }
            }
            PARAM_MIN_RATING => {
                filters.min_rating = parse_or_warn::<f64>(&key, value).filter(|r| r.is_finite())
            }
            PARAM_SORT_BY => filters.sort_key = value.to_string(),
            other => debug!("Ignoring unknown location parameter '{}'", other),
        }
    }

    if filters.actor_id.is_some() && !filters.movie_text.is_empty() {
        debug!("Location names both a movie and an actor, keeping the actor");
        filters.movie_text.clear();
    }

    filters
}

fn parse_or_warn<T: std::str::FromStr>(key: &str, value: &str) -> Option<T> {
    match value.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Dropping unparseable location parameter {}={}", key, value);
            None
        }
    }
}

/// Extract the query part of a deep link
///
/// Accepts a full URL, a `?`-prefixed query or a bare query-string.
pub fn query_of(location: &str) -> String {
    let location = location.trim();
    match Url::parse(location) {
        Ok(url) => url.query().unwrap_or("").to_string(),
        Err(_) => location.trim_start_matches('?').to_string(),
    }
}

/// Navigation history the browser writes its location into
pub trait History: Send {
    /// Query-string of the current entry
    fn current(&self) -> &str;

    /// Overwrite the current entry without adding a new one
    fn replace(&mut self, query: String);
}

/// History kept in memory for the lifetime of a session
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    current: String,
}

impl MemoryHistory {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            current: initial.into(),
        }
    }
}

impl History for MemoryHistory {
    fn current(&self) -> &str {
        &self.current
    }

    fn replace(&mut self, query: String) {
        self.current = query;
    }
}

/// Keeps a [`History`] in step with the filter state
pub struct UrlSync {
    history: Box<dyn History>,
}

impl UrlSync {
    pub fn new(history: Box<dyn History>) -> Self {
        Self { history }
    }

    /// Read filters from the current entry; done once when the browser mounts
    pub fn hydrate(&self) -> FilterState {
        let filters = deserialize(self.history.current());
        debug!("Hydrated filters from location: {:?}", filters);
        filters
    }

    /// Write filters into the current entry
    pub fn commit(&mut self, filters: &FilterState) {
        let query = serialize(filters);
        if query != self.history.current() {
            debug!("Location -> ?{}", query);
            self.history.replace(query);
        }
    }

    pub fn location(&self) -> &str {
        self.history.current()
    }
}
