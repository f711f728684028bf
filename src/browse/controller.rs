//! Movie browsing controller
//!
//! Owns the filter state and everything derived from it: which query mode is
//! active, which pages are loaded for it, suggestion lookups and the
//! location string. Network requests run as tokio tasks and report back
//! through a channel; results are stored under the key they were requested
//! for, so a late response for an abandoned filter combination never shows
//! up in the active list.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use ratatui::layout::Position;

use super::debounce::{DEFAULT_DEBOUNCE, Debouncer};
use super::filters::{DEFAULT_SORT, FilterState};
use super::mode::QueryMode;
use super::pagination::PageStatus;
use super::query_cache::{InfiniteQuery, LookupCache, QueryCache};
use super::suggestions::{Dropdown, SearchField};
use super::url_sync::{History, UrlSync};
use crate::tmdb::{Catalog, CatalogResult, Genre, GenreMap, Movie, PageResult, Person};

/// Shown when a title or actor search fails
pub const SEARCH_FAILED: &str = "Failed to search movies...";

/// Shown when popular or discovery results fail
pub const LOAD_FAILED: &str = "Failed to load movies...";

/// How long suggestion lookups stay fresh
pub const SUGGESTION_STALE: Duration = Duration::from_secs(30);

/// Pages of a mode left alone this long are dropped
pub const CACHE_IDLE: Duration = Duration::from_secs(300);

/// Tunables for a browser session
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub debounce: Duration,
    pub suggestion_stale: Duration,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            suggestion_stale: SUGGESTION_STALE,
        }
    }
}

/// Completed request, tagged with what it was for
#[derive(Debug)]
pub enum FetchEvent {
    Page {
        mode: QueryMode,
        page: u32,
        result: CatalogResult<PageResult>,
    },
    MovieSuggestions {
        query: String,
        result: CatalogResult<Vec<Movie>>,
    },
    ActorSuggestions {
        query: String,
        result: CatalogResult<Vec<Person>>,
    },
    Genres(CatalogResult<Vec<Genre>>),
}

pub struct MovieBrowser {
    catalog: Arc<dyn Catalog>,
    filters: FilterState,
    movie_input: String,
    actor_input: String,
    movie_debounce: Debouncer<String>,
    actor_debounce: Debouncer<String>,
    url: UrlSync,
    pages: QueryCache<QueryMode>,
    movie_suggestions: LookupCache<String, Vec<Movie>>,
    actor_suggestions: LookupCache<String, Vec<Person>>,
    genre_lookup: LookupCache<(), ()>,
    genres: GenreMap,
    movie_dropdown: Dropdown,
    actor_dropdown: Dropdown,
    events_tx: mpsc::UnboundedSender<FetchEvent>,
    events_rx: mpsc::UnboundedReceiver<FetchEvent>,
    in_flight: usize,
}

impl MovieBrowser {
    /// Create a browser whose filters are read from the history's current entry
    pub fn new(catalog: Arc<dyn Catalog>, history: Box<dyn History>, settings: BrowserSettings) -> Self {
        let url = UrlSync::new(history);
        let filters = url.hydrate();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Self {
            catalog,
            movie_input: filters.movie_text.clone(),
            actor_input: filters.actor_text.clone(),
            filters,
            movie_debounce: Debouncer::new(settings.debounce),
            actor_debounce: Debouncer::new(settings.debounce),
            url,
            pages: QueryCache::new(),
            movie_suggestions: LookupCache::new(Some(settings.suggestion_stale)),
            actor_suggestions: LookupCache::new(Some(settings.suggestion_stale)),
            genre_lookup: LookupCache::new(None),
            genres: GenreMap::default(),
            movie_dropdown: Dropdown::default(),
            actor_dropdown: Dropdown::default(),
            events_tx,
            events_rx,
            in_flight: 0,
        }
    }

    /// Start loading the genre list and the first page of the active mode.
    ///
    /// Needs a running tokio runtime.
    pub fn mount(&mut self) {
        info!("Browsing {}", self.mode().label());
        if self.genre_lookup.begin_fetch(&(), Instant::now()) {
            let catalog = self.catalog.clone();
            self.spawn(async move { FetchEvent::Genres(catalog.fetch_genres().await) });
        }
        self.ensure_loaded();
    }

    // ---- derived state ----

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn mode(&self) -> QueryMode {
        QueryMode::select(&self.filters)
    }

    pub fn movie_input(&self) -> &str {
        &self.movie_input
    }

    pub fn actor_input(&self) -> &str {
        &self.actor_input
    }

    /// Query-string of the current location
    pub fn location(&self) -> &str {
        self.url.location()
    }

    pub fn genres(&self) -> &GenreMap {
        &self.genres
    }

    fn active(&self) -> Option<&InfiniteQuery> {
        self.pages.get(&self.mode())
    }

    /// Movies of the active mode in page order, without poster-less entries
    pub fn movies(&self) -> Vec<&Movie> {
        self.active()
            .map(|q| q.movies().filter(|m| m.poster_path.is_some()).collect())
            .unwrap_or_default()
    }

    /// Result count the catalog reports for the active mode
    pub fn total_results(&self) -> Option<u32> {
        self.active().and_then(InfiniteQuery::total_results)
    }

    pub fn has_next_page(&self) -> bool {
        self.active().is_some_and(InfiniteQuery::has_next_page)
    }

    pub fn is_fetching_next_page(&self) -> bool {
        self.active().is_some_and(InfiniteQuery::is_fetching_next_page)
    }

    pub fn is_loading(&self) -> bool {
        self.active().is_some_and(InfiniteQuery::is_loading)
    }

    pub fn is_error(&self) -> bool {
        self.active().is_some_and(|q| q.error().is_some())
    }

    /// User-facing error line for the active mode, if its last request failed
    pub fn error_message(&self) -> Option<&'static str> {
        if !self.is_error() {
            return None;
        }
        if !self.movie_input.trim().is_empty() || !self.actor_input.trim().is_empty() {
            Some(SEARCH_FAILED)
        } else {
            Some(LOAD_FAILED)
        }
    }

    pub fn page_status(&self) -> PageStatus {
        PageStatus {
            has_more: self.has_next_page(),
            is_loading_more: self.is_fetching_next_page(),
        }
    }

    // ---- paging ----

    /// Request the next page of the active mode unless one is already on its way.
    ///
    /// Does nothing while the active mode has a failed page; only
    /// [`retry`](Self::retry) asks for it again.
    pub fn load_more(&mut self) {
        let mode = self.mode();
        let next = match self.pages.get(&mode) {
            Some(q) if q.error().is_some() => {
                debug!("{} has a failed page, waiting for retry", mode.label());
                None
            }
            Some(q) if q.has_next_page() && !q.is_fetching_next_page() => q.next_page_param(),
            _ => None,
        };
        if let Some(page) = next {
            self.request_page(mode, page);
        }
    }

    /// Ask again for the page that failed in the active mode
    pub fn retry(&mut self) {
        let mode = self.mode();
        if let Some(page) = self.pages.get(&mode).and_then(InfiniteQuery::failed_page) {
            info!("Retrying page {} of {}", page, mode.label());
            self.request_page(mode, page);
        }
    }

    /// Fetch page 1 of the active mode if nothing is loaded or loading for it
    fn ensure_loaded(&mut self) {
        let mode = self.mode();
        let needs_first_page = self
            .pages
            .get(&mode)
            .is_none_or(|q| q.page_count() == 0 && !q.is_loading() && q.error().is_none());
        if needs_first_page {
            self.request_page(mode, 1);
        }
    }

    fn request_page(&mut self, mode: QueryMode, page: u32) {
        if !self.pages.begin_fetch(&mode, page) {
            debug!("Page {} of {} already loaded or in flight", page, mode.label());
            return;
        }
        debug!("Requesting page {} of {}", page, mode.label());
        self.pages.touch(&mode, Instant::now());

        let catalog = self.catalog.clone();
        self.spawn(async move {
            let result = match &mode {
                QueryMode::Popular => catalog.fetch_popular(page).await,
                QueryMode::TitleSearch { query } => catalog.fetch_by_title(query, page).await,
                QueryMode::ActorBrowse { actor_id } => catalog.fetch_by_actor(*actor_id, page).await,
                QueryMode::FilteredDiscovery(filters) => catalog.fetch_discover(filters, page).await,
            };
            FetchEvent::Page { mode, page, result }
        });
    }

    fn spawn<F>(&mut self, request: F)
    where
        F: Future<Output = FetchEvent> + Send + 'static,
    {
        let tx = self.events_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let _ = tx.send(request.await);
        });
    }

    // ---- completions ----

    /// Apply a finished request
    pub fn handle_event(&mut self, event: FetchEvent, now: Instant) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match event {
            FetchEvent::Page { mode, page, result } => {
                match &result {
                    Ok(data) => debug!(
                        "Page {}/{} of {}: {} movies",
                        data.page,
                        data.total_pages,
                        mode.label(),
                        data.results.len()
                    ),
                    Err(e) => warn!("Page {} of {} failed: {}", page, mode.label(), e),
                }
                self.pages.complete(&mode, page, result);
            }
            FetchEvent::MovieSuggestions { query, result } => {
                if let Err(e) = &result {
                    warn!("Movie suggestions for '{}' failed: {}", query, e);
                }
                self.movie_suggestions.complete(&query, result, now);
                let count = self.movie_suggestion_list().len();
                self.movie_dropdown.candidates_ready(count);
            }
            FetchEvent::ActorSuggestions { query, result } => {
                if let Err(e) = &result {
                    warn!("Actor suggestions for '{}' failed: {}", query, e);
                }
                self.actor_suggestions.complete(&query, result, now);
                let count = self.actor_suggestion_list().len();
                self.actor_dropdown.candidates_ready(count);
            }
            FetchEvent::Genres(result) => match result {
                Ok(genres) => {
                    debug!("Loaded {} genres", genres.len());
                    self.genres = GenreMap::new(genres);
                    self.genre_lookup.complete(&(), Ok(()), now);
                }
                Err(e) => {
                    warn!("Genre list failed: {}", e);
                    self.genre_lookup.complete(&(), Err(e), now);
                }
            },
        }
    }

    /// Apply every completion that has already arrived; returns how many
    pub fn drain_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event, Instant::now());
            applied += 1;
        }
        applied
    }

    /// Wait until every started request has been applied
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.events_rx.recv().await {
                Some(event) => self.handle_event(event, Instant::now()),
                None => break,
            }
        }
    }

    // ---- text inputs ----

    /// Title input changed; the text is committed after the debounce period
    pub fn on_movie_input(&mut self, text: &str, now: Instant) {
        self.movie_input = text.to_string();
        let trimmed = text.trim();

        if trimmed.is_empty() {
            self.movie_dropdown.close();
        } else {
            self.movie_dropdown.open();
            if self.has_actor() {
                self.drop_actor();
                self.ensure_loaded();
            }
        }
        self.movie_debounce.schedule(trimmed.to_string(), now);
    }

    /// Actor input changed; any selected actor is dropped right away
    pub fn on_actor_input(&mut self, text: &str, now: Instant) {
        self.actor_input = text.to_string();
        let trimmed = text.trim();

        if trimmed.is_empty() {
            self.actor_dropdown.close();
        } else {
            self.actor_dropdown.open();
        }
        if self.filters.actor_id.take().is_some() {
            self.ensure_loaded();
        }
        self.actor_debounce.schedule(trimmed.to_string(), now);
    }

    /// Commit debounced text whose quiet period is over; true if anything changed
    pub fn tick(&mut self, now: Instant) -> bool {
        let active = self.mode();
        self.pages.touch(&active, now);
        let evicted = self.pages.evict_idle(&active, now, CACHE_IDLE);
        if evicted > 0 {
            debug!("Dropped {} idle result sets", evicted);
        }

        let mut committed = false;

        if let Some(text) = self.movie_debounce.fire_due(now) {
            self.filters.movie_text = text.clone();
            self.request_movie_suggestions(&text, now);
            committed = true;
        }
        if let Some(text) = self.actor_debounce.fire_due(now) {
            self.filters.actor_text = text.clone();
            self.request_actor_suggestions(&text, now);
            committed = true;
        }

        if committed {
            self.commit();
        }
        committed
    }

    /// Earliest pending debounce deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.movie_debounce.deadline(), self.actor_debounce.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn movie_suggestions_enabled(&self, text: &str) -> bool {
        !text.is_empty() && self.actor_input.trim().is_empty() && self.filters.actor_id.is_none()
    }

    fn actor_suggestions_enabled(&self, text: &str) -> bool {
        !text.is_empty() && self.movie_input.trim().is_empty() && self.filters.actor_id.is_none()
    }

    fn request_movie_suggestions(&mut self, text: &str, now: Instant) {
        if !self.movie_suggestions_enabled(text) {
            return;
        }
        let query = text.to_string();
        if !self.movie_suggestions.begin_fetch(&query, now) {
            let count = self.movie_suggestion_list().len();
            self.movie_dropdown.candidates_ready(count);
            return;
        }
        let catalog = self.catalog.clone();
        self.spawn(async move {
            let result = catalog
                .fetch_by_title(&query, 1)
                .await
                .map(|page| page.results);
            FetchEvent::MovieSuggestions { query, result }
        });
    }

    fn request_actor_suggestions(&mut self, text: &str, now: Instant) {
        if !self.actor_suggestions_enabled(text) {
            return;
        }
        let query = text.to_string();
        if !self.actor_suggestions.begin_fetch(&query, now) {
            let count = self.actor_suggestion_list().len();
            self.actor_dropdown.candidates_ready(count);
            return;
        }
        let catalog = self.catalog.clone();
        self.spawn(async move {
            let result = catalog
                .search_actors(&query, 1)
                .await
                .map(|page| page.results);
            FetchEvent::ActorSuggestions { query, result }
        });
    }

    /// Title suggestions for the current input, poster-less movies left out
    pub fn movie_suggestion_list(&self) -> Vec<&Movie> {
        let text = self.movie_input.trim();
        if !self.movie_suggestions_enabled(text) {
            return Vec::new();
        }
        self.movie_suggestions
            .get(text)
            .map(|movies| movies.iter().filter(|m| m.poster_path.is_some()).collect())
            .unwrap_or_default()
    }

    pub fn actor_suggestion_list(&self) -> &[Person] {
        let text = self.actor_input.trim();
        if !self.actor_suggestions_enabled(text) {
            return &[];
        }
        self.actor_suggestions
            .get(text)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    // ---- selections and clears ----

    /// Pick a title from the dropdown; committed immediately
    pub fn select_movie(&mut self, title: &str) {
        self.movie_debounce.cancel();
        self.movie_input = title.to_string();
        self.filters.movie_text = title.trim().to_string();
        self.drop_actor();
        self.movie_dropdown.close();
        self.commit();
    }

    /// Pick an actor from the dropdown; clears title search and commits immediately
    pub fn select_actor(&mut self, actor_id: u64, name: &str) {
        self.actor_debounce.cancel();
        self.movie_debounce.cancel();
        self.filters.actor_id = Some(actor_id);
        self.filters.actor_text = name.trim().to_string();
        self.actor_input = name.to_string();
        self.movie_input.clear();
        self.filters.movie_text.clear();
        self.movie_dropdown.close();
        self.actor_dropdown.close();
        self.commit();
    }

    pub fn select_movie_suggestion(&mut self, index: usize) -> bool {
        let Some(title) = self.movie_suggestion_list().get(index).map(|m| m.title.clone()) else {
            return false;
        };
        self.select_movie(&title);
        true
    }

    pub fn select_actor_suggestion(&mut self, index: usize) -> bool {
        let Some((id, name)) = self
            .actor_suggestion_list()
            .get(index)
            .map(|p| (p.id, p.name.clone()))
        else {
            return false;
        };
        self.select_actor(id, &name);
        true
    }

    pub fn clear_movie(&mut self) {
        self.movie_debounce.cancel();
        self.movie_input.clear();
        self.filters.movie_text.clear();
        self.movie_dropdown.close();
        self.commit();
    }

    pub fn clear_actor(&mut self) {
        self.drop_actor();
        self.commit();
    }

    /// Reset every filter and search
    pub fn clear_all(&mut self) {
        self.movie_debounce.cancel();
        self.actor_debounce.cancel();
        self.movie_input.clear();
        self.actor_input.clear();
        self.movie_dropdown.close();
        self.actor_dropdown.close();
        self.filters = FilterState::default();
        self.commit();
    }

    fn has_actor(&self) -> bool {
        self.filters.actor_id.is_some()
            || !self.filters.actor_text.is_empty()
            || !self.actor_input.is_empty()
    }

    fn drop_actor(&mut self) {
        self.actor_debounce.cancel();
        self.actor_input.clear();
        self.actor_dropdown.close();
        self.filters.clear_actor();
    }

    // ---- discovery filters ----

    pub fn set_year(&mut self, year: Option<i32>) {
        self.filters.year = year;
        self.discovery_changed();
    }

    pub fn toggle_genre(&mut self, genre_id: u32) {
        self.filters.toggle_genre(genre_id);
        self.discovery_changed();
    }

    pub fn set_min_rating(&mut self, rating: Option<f64>) {
        self.filters.min_rating = rating.filter(|r| r.is_finite());
        self.discovery_changed();
    }

    /// Empty key means the default sort
    pub fn set_sort(&mut self, sort_key: &str) {
        self.filters.sort_key = if sort_key.is_empty() {
            DEFAULT_SORT.to_string()
        } else {
            sort_key.to_string()
        };
        self.discovery_changed();
    }

    // Active discovery filters replace any actor selection
    fn discovery_changed(&mut self) {
        if self.filters.has_discovery_filters() && self.has_actor() {
            debug!("Discovery filter set, dropping actor selection");
            self.drop_actor();
        }
        self.commit();
    }

    fn commit(&mut self) {
        self.url.commit(&self.filters);
        self.ensure_loaded();
    }

    // ---- dropdowns ----

    pub fn dropdown(&self, field: SearchField) -> &Dropdown {
        match field {
            SearchField::Movie => &self.movie_dropdown,
            SearchField::Actor => &self.actor_dropdown,
        }
    }

    pub fn dropdown_mut(&mut self, field: SearchField) -> &mut Dropdown {
        match field {
            SearchField::Movie => &mut self.movie_dropdown,
            SearchField::Actor => &mut self.actor_dropdown,
        }
    }

    /// Whether the dropdown should be drawn: open and with something to show
    pub fn dropdown_visible(&self, field: SearchField) -> bool {
        match field {
            SearchField::Movie => {
                self.movie_dropdown.is_open() && !self.movie_suggestion_list().is_empty()
            }
            SearchField::Actor => {
                self.actor_dropdown.is_open() && !self.actor_suggestion_list().is_empty()
            }
        }
    }

    pub fn focus(&mut self, field: SearchField) {
        let movie_count = self.movie_suggestion_list().len();
        let actor_count = self.actor_suggestion_list().len();
        match field {
            SearchField::Movie => {
                self.actor_dropdown.blur();
                self.movie_dropdown.focus(movie_count);
            }
            SearchField::Actor => {
                self.movie_dropdown.blur();
                self.actor_dropdown.focus(actor_count);
            }
        }
    }

    pub fn blur(&mut self) {
        self.movie_dropdown.blur();
        self.actor_dropdown.blur();
    }

    /// Pointer press anywhere; each open dropdown closes unless the press is inside it
    pub fn pointer_down(&mut self, at: Position) {
        self.movie_dropdown.pointer_down(at);
        self.actor_dropdown.pointer_down(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browse::url_sync::MemoryHistory;
    use crate::tmdb::catalog::fake::FakeCatalog;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn browser_at(location: &str, catalog: &Arc<FakeCatalog>) -> MovieBrowser {
        let catalog: Arc<dyn Catalog> = catalog.clone();
        MovieBrowser::new(
            catalog,
            Box::new(MemoryHistory::new(location)),
            BrowserSettings::default(),
        )
    }

    async fn mounted(location: &str, catalog: &Arc<FakeCatalog>) -> MovieBrowser {
        let mut browser = browser_at(location, catalog);
        browser.mount();
        browser.settle().await;
        browser
    }

    fn count(catalog: &FakeCatalog, prefix: &str) -> usize {
        catalog.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    #[tokio::test]
    async fn test_mount_loads_popular_and_genres() {
        let catalog = Arc::new(FakeCatalog::new(3));
        let browser = mounted("", &catalog).await;

        assert_eq!(browser.mode(), QueryMode::Popular);
        assert_eq!(count(&catalog, "popular:1"), 1);
        assert_eq!(count(&catalog, "genres"), 1);
        // Poster-less entries are hidden
        assert_eq!(browser.movies().len(), 2);
        assert!(browser.has_next_page());
        assert_eq!(browser.genres().genre_names(Some(&[28][..])), vec!["Action"]);
    }

    #[tokio::test]
    async fn test_unparseable_year_falls_back_to_popular() {
        let catalog = Arc::new(FakeCatalog::new(1));
        let browser = mounted("year=abc", &catalog).await;
        assert_eq!(browser.filters().year, None);
        assert_eq!(browser.mode(), QueryMode::Popular);
    }

    #[tokio::test]
    async fn test_typed_title_commits_after_quiet_period() {
        let catalog = Arc::new(FakeCatalog::new(2));
        let mut browser = mounted("", &catalog).await;
        let start = Instant::now();

        browser.on_movie_input("al", start);
        browser.on_movie_input("alien ", start + ms(100));
        assert!(!browser.tick(start + ms(599)));
        assert_eq!(browser.mode(), QueryMode::Popular);
        assert_eq!(browser.location(), "");

        assert!(browser.tick(start + ms(600)));
        assert_eq!(
            browser.mode(),
            QueryMode::TitleSearch {
                query: "alien".to_string()
            }
        );
        assert_eq!(browser.location(), "movie=alien");

        browser.settle().await;
        assert_eq!(count(&catalog, "title:alien:1"), 2); // page + suggestions
        assert_eq!(browser.movies().len(), 2);
    }

    #[tokio::test]
    async fn test_load_more_is_coalesced() {
        let catalog = Arc::new(FakeCatalog::new(3));
        let mut browser = mounted("", &catalog).await;

        browser.load_more();
        assert!(browser.is_fetching_next_page());
        browser.load_more();
        browser.settle().await;

        assert_eq!(count(&catalog, "popular:2"), 1);
        assert_eq!(browser.movies().len(), 4);
    }

    #[tokio::test]
    async fn test_last_page_stops_paging() {
        let catalog = Arc::new(FakeCatalog::new(1));
        let mut browser = mounted("", &catalog).await;
        assert!(!browser.has_next_page());
        browser.load_more();
        assert_eq!(browser.in_flight, 0);
    }

    #[tokio::test]
    async fn test_returning_to_a_mode_reuses_its_pages() {
        let catalog = Arc::new(FakeCatalog::new(3));
        let mut browser = mounted("", &catalog).await;
        browser.load_more();
        browser.settle().await;

        browser.set_year(Some(2020));
        browser.settle().await;
        assert_eq!(count(&catalog, "discover:Some(2020):1"), 1);

        browser.set_year(None);
        browser.settle().await;
        assert_eq!(browser.mode(), QueryMode::Popular);
        assert_eq!(count(&catalog, "popular:1"), 1);
        assert_eq!(browser.movies().len(), 4);
    }

    #[tokio::test]
    async fn test_total_results_follow_active_mode() {
        let catalog = Arc::new(FakeCatalog::new(3));
        let mut browser = browser_at("", &catalog);
        assert_eq!(browser.total_results(), None);
        browser.mount();
        browser.settle().await;
        assert_eq!(browser.total_results(), Some(9));
    }

    #[tokio::test]
    async fn test_idle_mode_is_refetched_after_eviction() {
        let catalog = Arc::new(FakeCatalog::new(3));
        let start = Instant::now();
        let mut browser = mounted("", &catalog).await;

        browser.set_year(Some(2020));
        browser.settle().await;
        browser.tick(start + CACHE_IDLE - ms(1));
        browser.set_year(None);
        browser.settle().await;
        assert_eq!(count(&catalog, "popular:1"), 1);

        browser.set_year(Some(2020));
        browser.settle().await;
        browser.tick(start + CACHE_IDLE * 2);
        browser.set_year(None);
        browser.settle().await;
        assert_eq!(count(&catalog, "popular:1"), 2);
        assert_eq!(browser.movies().len(), 2);
    }

    #[tokio::test]
    async fn test_late_response_for_old_filters_is_not_shown() {
        let catalog = Arc::new(FakeCatalog::new(2));
        let mut browser = mounted("", &catalog).await;

        browser.set_year(Some(2020));
        browser.set_year(Some(2021));
        browser.settle().await;

        assert!(
            browser
                .movies()
                .iter()
                .all(|m| m.title.starts_with("discover:Some(2021)"))
        );
        assert_eq!(browser.location(), "year=2021");
    }

    #[tokio::test]
    async fn test_discovery_filter_clears_selected_actor() {
        let catalog = Arc::new(FakeCatalog::new(1));
        let mut browser = mounted("actor=Keanu+Reeves&actorId=6384", &catalog).await;
        assert_eq!(browser.mode(), QueryMode::ActorBrowse { actor_id: 6384 });

        browser.toggle_genre(28);
        assert_eq!(browser.filters().actor_id, None);
        assert_eq!(browser.filters().actor_text, "");
        assert_eq!(browser.actor_input(), "");
        assert!(matches!(browser.mode(), QueryMode::FilteredDiscovery(_)));
        assert_eq!(browser.location(), "genres=28");
    }

    #[tokio::test]
    async fn test_discovery_wins_over_later_title_search() {
        let catalog = Arc::new(FakeCatalog::new(1));
        let mut browser = mounted("minRating=7", &catalog).await;
        let start = Instant::now();

        browser.on_movie_input("heat", start);
        browser.tick(start + ms(500));
        assert!(matches!(browser.mode(), QueryMode::FilteredDiscovery(_)));
        assert_eq!(browser.filters().movie_text, "heat");
    }

    #[tokio::test]
    async fn test_selecting_actor_clears_title_search() {
        let catalog = Arc::new(FakeCatalog::new(1));
        let mut browser = mounted("movie=matrix", &catalog).await;
        let start = Instant::now();

        browser.on_movie_input("matrix re", start);
        browser.select_actor(6384, "Keanu Reeves");
        assert!(!browser.tick(start + ms(1000)));

        assert_eq!(browser.movie_input(), "");
        assert_eq!(browser.mode(), QueryMode::ActorBrowse { actor_id: 6384 });
        assert_eq!(browser.location(), "actor=Keanu+Reeves&actorId=6384");
        browser.settle().await;
        assert_eq!(count(&catalog, "actor:6384:1"), 1);
    }

    #[tokio::test]
    async fn test_typing_title_drops_actor() {
        let catalog = Arc::new(FakeCatalog::new(1));
        let mut browser = mounted("actor=Keanu&actorId=6384", &catalog).await;

        browser.on_movie_input("speed", Instant::now());
        assert_eq!(browser.filters().actor_id, None);
        assert_eq!(browser.actor_input(), "");
        assert_eq!(browser.mode(), QueryMode::Popular);
    }

    #[tokio::test]
    async fn test_typing_actor_name_unselects_actor() {
        let catalog = Arc::new(FakeCatalog::new(1));
        let mut browser = mounted("actor=Keanu&actorId=6384", &catalog).await;
        let start = Instant::now();

        browser.on_actor_input("Keanu R", start);
        assert_eq!(browser.filters().actor_id, None);
        browser.tick(start + ms(500));
        assert_eq!(browser.location(), "actor=Keanu+R");
    }

    #[tokio::test]
    async fn test_clear_movie_cancels_pending_commit() {
        let catalog = Arc::new(FakeCatalog::new(1));
        let mut browser = mounted("", &catalog).await;
        let start = Instant::now();

        browser.on_movie_input("jaws", start);
        browser.clear_movie();
        assert!(!browser.tick(start + ms(2000)));
        assert_eq!(browser.mode(), QueryMode::Popular);
        assert_eq!(browser.next_deadline(), None);
    }

    #[tokio::test]
    async fn test_clear_all_resets_everything() {
        let catalog = Arc::new(FakeCatalog::new(1));
        let mut browser =
            mounted("movie=jaws&year=1975&genres=27&minRating=6&sortBy=vote_average.desc", &catalog).await;

        browser.clear_all();
        assert_eq!(browser.filters(), &FilterState::default());
        assert_eq!(browser.location(), "");
        assert_eq!(browser.mode(), QueryMode::Popular);
    }

    #[tokio::test]
    async fn test_failure_is_reported_and_retried() {
        let catalog = Arc::new(FakeCatalog::new(2));
        catalog.set_failing(true);
        let mut browser = mounted("", &catalog).await;

        assert!(browser.is_error());
        assert_eq!(browser.error_message(), Some(LOAD_FAILED));
        assert!(browser.movies().is_empty());

        catalog.set_failing(false);
        browser.retry();
        browser.settle().await;
        assert!(!browser.is_error());
        assert_eq!(browser.movies().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_next_page_waits_for_retry() {
        use crate::browse::pagination::PaginationDriver;

        let catalog = Arc::new(FakeCatalog::new(3));
        let mut browser = mounted("", &catalog).await;
        catalog.set_failing(true);

        let mut driver = PaginationDriver::new(3);
        driver.mount();
        // Sentinel stays on screen for every frame
        let sentinel = browser.movies().len();
        for _ in 0..6 {
            if driver.observe(browser.page_status(), sentinel, sentinel) {
                browser.load_more();
            }
            driver.observe(browser.page_status(), sentinel, sentinel);
            browser.settle().await;
        }

        assert_eq!(count(&catalog, "popular:2"), 1);
        assert!(browser.is_error());
        assert_eq!(browser.movies().len(), 2);

        catalog.set_failing(false);
        browser.retry();
        browser.settle().await;
        assert_eq!(count(&catalog, "popular:2"), 2);
        assert!(!browser.is_error());
        assert_eq!(browser.movies().len(), 4);
    }

    #[tokio::test]
    async fn test_search_failure_message() {
        let catalog = Arc::new(FakeCatalog::new(1));
        catalog.set_failing(true);
        let mut browser = mounted("", &catalog).await;
        let start = Instant::now();

        browser.on_movie_input("alien", start);
        browser.tick(start + ms(500));
        browser.settle().await;
        assert_eq!(browser.error_message(), Some(SEARCH_FAILED));
    }

    #[tokio::test]
    async fn test_movie_suggestions_open_dropdown_on_focus() {
        let catalog = Arc::new(FakeCatalog::new(1));
        let mut browser = mounted("", &catalog).await;
        let start = Instant::now();

        browser.focus(SearchField::Movie);
        browser.on_movie_input("alien", start);
        browser.tick(start + ms(500));
        browser.settle().await;

        assert_eq!(browser.movie_suggestion_list().len(), 2);
        assert!(browser.dropdown_visible(SearchField::Movie));

        assert!(browser.select_movie_suggestion(0));
        assert!(!browser.dropdown(SearchField::Movie).is_open());
        assert!(matches!(browser.mode(), QueryMode::TitleSearch { .. }));
    }

    #[tokio::test]
    async fn test_actor_suggestions_select_actor() {
        let catalog = Arc::new(FakeCatalog {
            total_pages: 1,
            actors: vec![Person {
                id: 287,
                name: "Brad Pitt".to_string(),
            }],
            ..Default::default()
        });
        let mut browser = mounted("", &catalog).await;
        let start = Instant::now();

        browser.focus(SearchField::Actor);
        browser.on_actor_input("brad", start);
        browser.tick(start + ms(500));
        browser.settle().await;
        assert!(browser.dropdown_visible(SearchField::Actor));

        assert!(browser.select_actor_suggestion(0));
        assert_eq!(browser.mode(), QueryMode::ActorBrowse { actor_id: 287 });
        // Suggestions are off while an actor is locked in
        assert!(browser.actor_suggestion_list().is_empty());
    }

    #[tokio::test]
    async fn test_outside_press_closes_dropdown() {
        let catalog = Arc::new(FakeCatalog::new(1));
        let mut browser = mounted("", &catalog).await;
        browser
            .dropdown_mut(SearchField::Movie)
            .set_bounds(ratatui::layout::Rect::new(0, 0, 10, 5));
        browser.on_movie_input("x", Instant::now());
        assert!(browser.dropdown(SearchField::Movie).is_open());

        browser.pointer_down(Position::new(3, 2));
        assert!(browser.dropdown(SearchField::Movie).is_open());
        browser.pointer_down(Position::new(30, 2));
        assert!(!browser.dropdown(SearchField::Movie).is_open());
    }
}
