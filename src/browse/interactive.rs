//! Interactive TUI for browsing movies

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    layout::{Constraint, Direction, Layout, Position, Rect},
    prelude::*,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use std::collections::HashSet;
use std::io;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use super::controller::MovieBrowser;
use super::filters::{RATING_OPTIONS, SORT_OPTIONS, sort_label, year_options};
use super::pagination::PaginationDriver;
use super::suggestions::SearchField;
use crate::favorites::FavoritesStore;
use crate::tmdb::{Movie, RatingClass};
use crate::utils::TuiModeGuard;

/// Where keystrokes go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    List,
    Input(SearchField),
}

/// Filter choosers opened from the list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PickerKind {
    Year,
    Genre,
    Rating,
    Sort,
}

impl PickerKind {
    fn title(self) -> &'static str {
        match self {
            PickerKind::Year => "Year",
            PickerKind::Genre => "Genres (Space: toggle)",
            PickerKind::Rating => "Minimum rating",
            PickerKind::Sort => "Sort by",
        }
    }
}

#[derive(Debug)]
struct Picker {
    kind: PickerKind,
    list_state: ListState,
}

/// View state that the controller doesn't own
struct BrowserState {
    focus: Focus,
    list_state: ListState,
    /// Highlighted row in the focused input's dropdown
    suggestion_index: Option<usize>,
    picker: Option<Picker>,
    expanded: HashSet<u64>,
    status_message: String,
    status_message_time: Option<std::time::Instant>,
    show_help: bool,
    /// Rows of the movie list visible in the last frame
    list_rows: usize,
    paging: PaginationDriver,
}

impl BrowserState {
    fn new(lead_margin: usize) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            focus: Focus::List,
            list_state,
            suggestion_index: None,
            picker: None,
            expanded: HashSet::new(),
            status_message: String::new(),
            status_message_time: None,
            show_help: false,
            list_rows: 0,
            paging: PaginationDriver::new(lead_margin),
        }
    }

    /// Set status message with auto-clear timeout
    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.status_message_time = Some(std::time::Instant::now());
    }

    fn clear_status(&mut self) {
        self.status_message.clear();
        self.status_message_time = None;
    }

    /// Check and clear status message if timeout expired (3 seconds)
    fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time
            && time.elapsed() > Duration::from_secs(3)
        {
            self.clear_status();
        }
    }

    fn selected(&self) -> usize {
        self.list_state.selected().unwrap_or(0)
    }

    fn move_up(&mut self, len: usize, step: usize) {
        if len == 0 {
            return;
        }
        self.list_state.select(Some(self.selected().saturating_sub(step)));
    }

    // Stops at the last row; the next page arrives through the sentinel
    fn move_down(&mut self, len: usize, step: usize) {
        if len == 0 {
            return;
        }
        self.list_state.select(Some((self.selected() + step).min(len - 1)));
    }

    fn scroll_to_top(&mut self) {
        self.list_state.select(Some(0));
        *self.list_state.offset_mut() = 0;
    }

    /// Past the first screen of results
    fn scrolled_away(&self) -> bool {
        self.list_rows > 0 && self.selected() >= self.list_rows
    }

    /// List changed underneath us (new mode or filters)
    fn reset_list(&mut self) {
        self.scroll_to_top();
        self.expanded.clear();
    }
}

/// Run the interactive browser; returns the final location
pub async fn run_browser(
    mut browser: MovieBrowser,
    favorites: &mut FavoritesStore,
    lead_margin: usize,
) -> Result<String> {
    // Suppress stderr logging until the terminal is restored
    let _tui_mode = TuiModeGuard::enter();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = BrowserState::new(lead_margin);
    state.paging.mount();
    browser.mount();

    // Main loop
    let result = run_browser_loop(&mut terminal, &mut state, &mut browser, favorites).await;
    state.paging.unmount();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;

    result.map(|_| browser.location().to_string())
}

async fn run_browser_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut BrowserState,
    browser: &mut MovieBrowser,
    favorites: &mut FavoritesStore,
) -> Result<()> {
    loop {
        browser.drain_events();
        let mode_before = browser.mode();
        browser.tick(Instant::now());
        if browser.mode() != mode_before {
            state.reset_list();
        }

        state.check_status_timeout();

        terminal.draw(|f| draw_ui(f, state, browser, favorites))?;

        // Sentinel sits one row past the last movie
        let sentinel = browser.movies().len();
        let viewport_end = state.list_state.offset() + state.list_rows;
        if state.paging.observe(browser.page_status(), sentinel, viewport_end) {
            browser.load_more();
        }

        // Wake up early when a debounce is about to fire
        let timeout = browser
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::from_millis(50))
            .min(Duration::from_millis(50));

        if event::poll(timeout)? {
            let quit = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(state, browser, favorites, key),
                Event::Mouse(mouse) => {
                    handle_mouse(state, browser, mouse);
                    false
                }
                _ => false,
            };
            if quit {
                return Ok(());
            }
        }
    }
}

/// Apply one key press; returns true when the browser should exit
fn handle_key(
    state: &mut BrowserState,
    browser: &mut MovieBrowser,
    favorites: &mut FavoritesStore,
    key: KeyEvent,
) -> bool {
    // Any key closes help
    if state.show_help {
        state.show_help = false;
        return false;
    }

    let mode_before = browser.mode();

    let quit = if state.picker.is_some() {
        handle_picker_key(state, browser, key);
        false
    } else {
        match state.focus {
            Focus::Input(field) => {
                handle_input_key(state, browser, field, key);
                false
            }
            Focus::List => handle_list_key(state, browser, favorites, key),
        }
    };

    if browser.mode() != mode_before {
        state.reset_list();
    }
    quit
}

fn handle_list_key(
    state: &mut BrowserState,
    browser: &mut MovieBrowser,
    favorites: &mut FavoritesStore,
    key: KeyEvent,
) -> bool {
    let len = browser.movies().len();
    let page = state.list_rows.max(1);

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Up | KeyCode::Char('k') => state.move_up(len, 1),
        KeyCode::Down | KeyCode::Char('j') => state.move_down(len, 1),
        KeyCode::PageUp => state.move_up(len, page),
        KeyCode::PageDown => state.move_down(len, page),
        KeyCode::Home | KeyCode::Char('t') => state.scroll_to_top(),
        KeyCode::Char('/') | KeyCode::Char('m') => focus_input(state, browser, SearchField::Movie),
        KeyCode::Char('a') => focus_input(state, browser, SearchField::Actor),
        KeyCode::Char('y') => open_picker(state, PickerKind::Year),
        KeyCode::Char('g') => {
            if browser.genres().is_empty() {
                state.set_status("Genres are still loading");
            } else {
                open_picker(state, PickerKind::Genre);
            }
        }
        KeyCode::Char('r') => open_picker(state, PickerKind::Rating),
        KeyCode::Char('o') => open_picker(state, PickerKind::Sort),
        KeyCode::Char('c') => {
            browser.clear_all();
            state.set_status("Filters cleared");
        }
        KeyCode::Char('R') => {
            if browser.is_error() {
                browser.retry();
                state.set_status("Retrying...");
            }
        }
        KeyCode::Char('f') => {
            let movie = browser.movies().get(state.selected()).map(|m| (*m).clone());
            if let Some(movie) = movie {
                let added = favorites.toggle(&movie);
                let verb = if added { "Added to" } else { "Removed from" };
                state.set_status(format!("{} favorites: {}", verb, movie.title));
            }
        }
        KeyCode::Enter => {
            let id = browser.movies().get(state.selected()).map(|m| m.id);
            if let Some(id) = id
                && !state.expanded.remove(&id)
            {
                state.expanded.insert(id);
            }
        }
        KeyCode::Char('?') => state.show_help = true,
        _ => {}
    }
    false
}

fn focus_input(state: &mut BrowserState, browser: &mut MovieBrowser, field: SearchField) {
    state.focus = Focus::Input(field);
    state.suggestion_index = None;
    browser.focus(field);
}

fn suggestion_count(browser: &MovieBrowser, field: SearchField) -> usize {
    if !browser.dropdown_visible(field) {
        return 0;
    }
    match field {
        SearchField::Movie => browser.movie_suggestion_list().len(),
        SearchField::Actor => browser.actor_suggestion_list().len(),
    }
}

fn handle_input_key(state: &mut BrowserState, browser: &mut MovieBrowser, field: SearchField, key: KeyEvent) {
    let now = Instant::now();
    let text = match field {
        SearchField::Movie => browser.movie_input().to_string(),
        SearchField::Actor => browser.actor_input().to_string(),
    };
    let set_text = |browser: &mut MovieBrowser, text: &str| match field {
        SearchField::Movie => browser.on_movie_input(text, now),
        SearchField::Actor => browser.on_actor_input(text, now),
    };

    match key.code {
        KeyCode::Esc => {
            if browser.dropdown(field).is_open() {
                browser.dropdown_mut(field).close();
            } else {
                browser.blur();
                state.focus = Focus::List;
            }
            state.suggestion_index = None;
        }
        KeyCode::Tab => {
            let other = match field {
                SearchField::Movie => SearchField::Actor,
                SearchField::Actor => SearchField::Movie,
            };
            focus_input(state, browser, other);
        }
        KeyCode::Down => {
            let count = suggestion_count(browser, field);
            if count > 0 {
                let next = state.suggestion_index.map_or(0, |i| (i + 1).min(count - 1));
                state.suggestion_index = Some(next);
            }
        }
        KeyCode::Up => {
            state.suggestion_index = match state.suggestion_index {
                Some(0) | None => None,
                Some(i) => Some(i - 1),
            };
        }
        KeyCode::Enter => {
            if let Some(index) = state.suggestion_index.take() {
                let picked = match field {
                    SearchField::Movie => browser.select_movie_suggestion(index),
                    SearchField::Actor => browser.select_actor_suggestion(index),
                };
                if picked {
                    debug!("Picked suggestion {} from {:?}", index, field);
                }
            }
            browser.blur();
            state.focus = Focus::List;
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            match field {
                SearchField::Movie => browser.clear_movie(),
                SearchField::Actor => browser.clear_actor(),
            }
            state.suggestion_index = None;
        }
        KeyCode::Backspace => {
            let mut text = text;
            text.pop();
            set_text(browser, &text);
            state.suggestion_index = None;
        }
        KeyCode::Char(c) => {
            let mut text = text;
            text.push(c);
            set_text(browser, &text);
            state.suggestion_index = None;
        }
        _ => {}
    }
}

fn open_picker(state: &mut BrowserState, kind: PickerKind) {
    let mut list_state = ListState::default();
    list_state.select(Some(0));
    state.picker = Some(Picker { kind, list_state });
}

/// Rows offered by a picker; the first row of single-choice pickers resets the filter
fn picker_rows(kind: PickerKind, browser: &MovieBrowser) -> Vec<(String, bool)> {
    let filters = browser.filters();
    match kind {
        PickerKind::Year => std::iter::once(("All years".to_string(), filters.year.is_none()))
            .chain(
                year_options()
                    .into_iter()
                    .map(|y| (y.to_string(), filters.year == Some(y))),
            )
            .collect(),
        PickerKind::Genre => browser
            .genres()
            .genres()
            .iter()
            .map(|g| (g.name.clone(), filters.genre_ids.contains(&g.id)))
            .collect(),
        PickerKind::Rating => std::iter::once(("Any rating".to_string(), filters.min_rating.is_none()))
            .chain(
                RATING_OPTIONS
                    .iter()
                    .map(|r| (format!("{}+", r), filters.min_rating == Some(*r))),
            )
            .collect(),
        PickerKind::Sort => SORT_OPTIONS
            .iter()
            .map(|(key, label)| (label.to_string(), filters.sort_key == *key))
            .collect(),
    }
}

fn apply_picker_row(browser: &mut MovieBrowser, kind: PickerKind, row: usize) {
    match kind {
        PickerKind::Year => browser.set_year(row.checked_sub(1).and_then(|i| year_options().get(i).copied())),
        PickerKind::Genre => {
            let id = browser.genres().genres().get(row).map(|g| g.id);
            if let Some(id) = id {
                browser.toggle_genre(id);
            }
        }
        PickerKind::Rating => {
            browser.set_min_rating(row.checked_sub(1).and_then(|i| RATING_OPTIONS.get(i).copied()))
        }
        PickerKind::Sort => {
            if let Some((key, _)) = SORT_OPTIONS.get(row) {
                browser.set_sort(key);
            }
        }
    }
}

fn handle_picker_key(state: &mut BrowserState, browser: &mut MovieBrowser, key: KeyEvent) {
    let Some(picker) = state.picker.as_mut() else {
        return;
    };
    let kind = picker.kind;
    let len = picker_rows(kind, browser).len();
    let selected = picker.list_state.selected().unwrap_or(0);

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => state.picker = None,
        KeyCode::Up | KeyCode::Char('k') => picker.list_state.select(Some(selected.saturating_sub(1))),
        KeyCode::Down | KeyCode::Char('j') if len > 0 => {
            picker.list_state.select(Some((selected + 1).min(len - 1)))
        }
        KeyCode::Char(' ') if kind == PickerKind::Genre => apply_picker_row(browser, kind, selected),
        KeyCode::Enter => {
            if kind != PickerKind::Genre {
                apply_picker_row(browser, kind, selected);
            }
            state.picker = None;
        }
        _ => {}
    }
}

fn handle_mouse(state: &mut BrowserState, browser: &mut MovieBrowser, mouse: MouseEvent) {
    let len = browser.movies().len();
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            browser.pointer_down(Position::new(mouse.column, mouse.row));
        }
        MouseEventKind::ScrollDown if state.picker.is_none() => state.move_down(len, 3),
        MouseEventKind::ScrollUp if state.picker.is_none() => state.move_up(len, 3),
        _ => {}
    }
}

fn rating_span(movie: &Movie) -> Span<'static> {
    match (movie.rating_label(), movie.rating_class()) {
        (Some(label), Some(RatingClass::High)) => Span::styled(label, Style::default().fg(Color::Green)),
        (Some(label), Some(RatingClass::Medium)) => Span::styled(label, Style::default().fg(Color::Yellow)),
        (Some(label), _) => Span::styled(label, Style::default().fg(Color::Red)),
        (None, _) => Span::styled(" - ", Style::default().fg(Color::DarkGray)),
    }
}

fn input_widget<'a>(label: &'a str, text: &'a str, focused: bool) -> Paragraph<'a> {
    let (content, style) = if focused {
        (format!("{}█", text), Style::default().fg(Color::Yellow))
    } else {
        (text.to_string(), Style::default())
    };
    Paragraph::new(content)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title(label))
}

fn draw_ui(f: &mut Frame, state: &mut BrowserState, browser: &mut MovieBrowser, favorites: &FavoritesStore) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Length(3), // Search inputs
            Constraint::Length(1), // Filter summary
            Constraint::Min(8),    // Movies
            Constraint::Length(2), // Footer/help
        ])
        .split(f.area());

    // Header
    let header = Paragraph::new(format!("Movies: {}", browser.mode().label()))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(header, chunks[0]);

    // Search inputs
    let inputs = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    let movie_focused = state.focus == Focus::Input(SearchField::Movie);
    let actor_focused = state.focus == Focus::Input(SearchField::Actor);
    f.render_widget(input_widget("Movie (/)", browser.movie_input(), movie_focused), inputs[0]);
    f.render_widget(input_widget("Actor (a)", browser.actor_input(), actor_focused), inputs[1]);

    // Filter summary
    let filters = browser.filters();
    let genre_ids: Vec<u32> = filters.genre_ids.iter().copied().collect();
    let genre_names = browser.genres().genre_names(Some(genre_ids.as_slice()));
    let summary = format!(
        "Year: {} | Genres: {} | Rating: {} | Sort: {}",
        filters.year.map_or("all".to_string(), |y| y.to_string()),
        if genre_names.is_empty() { "all".to_string() } else { genre_names.join(", ") },
        filters.min_rating.map_or("any".to_string(), |r| format!("{}+", r)),
        sort_label(&filters.sort_key),
    );
    f.render_widget(
        Paragraph::new(summary).style(Style::default().fg(Color::DarkGray)),
        chunks[2],
    );

    // Movies with a detail pane
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[3]);
    draw_movie_list(f, state, browser, favorites, body[0]);
    draw_details(f, state, browser, favorites, body[1]);

    // Footer/help
    let mut help_text = match state.focus {
        Focus::List => {
            "↑/↓: Navigate | /: Title | a: Actor | y/g/r/o: Filters | f: Favorite | c: Clear | ?: Help | q: Quit"
                .to_string()
        }
        Focus::Input(_) => "Type to search | ↑/↓: Suggestions | Enter: Pick | Tab: Switch | Esc: Back".to_string(),
    };
    if state.scrolled_away() {
        help_text.push_str(" | t: Top");
    }
    let footer = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::TOP));
    f.render_widget(footer, chunks[4]);

    // Dropdowns under the inputs
    for (field, input_area) in [(SearchField::Movie, inputs[0]), (SearchField::Actor, inputs[1])] {
        let mut bounds = input_area;
        if browser.dropdown_visible(field) {
            let rows: Vec<ListItem> = match field {
                SearchField::Movie => browser
                    .movie_suggestion_list()
                    .iter()
                    .map(|m| ListItem::new(format!("{} ({})", m.title, m.release_year().unwrap_or("----"))))
                    .collect(),
                SearchField::Actor => browser
                    .actor_suggestion_list()
                    .iter()
                    .map(|p| ListItem::new(p.name.clone()))
                    .collect(),
            };
            let height = (rows.len() as u16 + 2).min(12);
            let area = Rect::new(input_area.x, input_area.bottom(), input_area.width, height)
                .intersection(f.area());
            let mut list_state = ListState::default();
            if state.focus == Focus::Input(field) {
                list_state.select(state.suggestion_index);
            }
            let list = List::new(rows)
                .block(Block::default().borders(Borders::ALL).style(Style::default().bg(Color::Black)))
                .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));
            f.render_widget(Clear, area);
            f.render_stateful_widget(list, area, &mut list_state);
            bounds = bounds.union(area);
        }
        browser.dropdown_mut(field).set_bounds(bounds);
    }

    // Filter picker
    if let Some(picker) = state.picker.as_mut() {
        let rows: Vec<ListItem> = picker_rows(picker.kind, browser)
            .into_iter()
            .map(|(label, active)| {
                let prefix = if active { "[x] " } else { "[ ] " };
                ListItem::new(format!("{}{}", prefix, label))
            })
            .collect();
        let list = List::new(rows)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(picker.kind.title())
                    .style(Style::default().bg(Color::Black)),
            )
            .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");
        let area = centered_rect(40, 16, f.area());
        f.render_widget(Clear, area);
        f.render_stateful_widget(list, area, &mut picker.list_state);
    }

    // Help overlay
    if state.show_help {
        let help_lines = vec![
            Line::from("Keyboard Shortcuts"),
            Line::from(""),
            Line::styled("Navigation", Style::default().add_modifier(Modifier::BOLD)),
            Line::from("  ↑/k, ↓/j    Move up/down"),
            Line::from("  PgUp/PgDn   Move a screen"),
            Line::from("  t, Home     Back to top"),
            Line::from("  Enter       Expand overview"),
            Line::from(""),
            Line::styled("Search", Style::default().add_modifier(Modifier::BOLD)),
            Line::from("  /, m        Search by title"),
            Line::from("  a           Search by actor"),
            Line::from("  Ctrl-U      Clear the input"),
            Line::from(""),
            Line::styled("Filters & Actions", Style::default().add_modifier(Modifier::BOLD)),
            Line::from("  y g r o     Year, genres, rating, sort"),
            Line::from("  c           Clear all filters"),
            Line::from("  f           Toggle favorite"),
            Line::from("  R           Retry after an error"),
            Line::from("  q, Esc      Quit"),
            Line::from(""),
            Line::styled("Press any key to close", Style::default().fg(Color::DarkGray)),
        ];
        let help_popup = Paragraph::new(help_lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .style(Style::default().bg(Color::Black)),
        );
        let area = centered_rect(50, 23, f.area());
        f.render_widget(Clear, area);
        f.render_widget(help_popup, area);
    }

    // Status message overlay
    if !state.status_message.is_empty() && !state.show_help {
        let status = Paragraph::new(state.status_message.clone())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL));
        let area = centered_rect(50, 3, f.area());
        f.render_widget(Clear, area);
        f.render_widget(status, area);
    }
}

fn draw_movie_list(
    f: &mut Frame,
    state: &mut BrowserState,
    browser: &MovieBrowser,
    favorites: &FavoritesStore,
    area: Rect,
) {
    let block = Block::default().borders(Borders::ALL);
    state.list_rows = block.inner(area).height as usize;

    let movies = browser.movies();
    let error = browser.error_message().map(|message| format!("{} (R to retry)", message));

    if movies.is_empty() {
        let placeholder = if browser.is_loading() {
            Paragraph::new("Loading...")
        } else if let Some(text) = error {
            Paragraph::new(text).style(Style::default().fg(Color::Red))
        } else {
            Paragraph::new("No movies found")
        };
        f.render_widget(placeholder.block(block), area);
        return;
    }

    let mut items: Vec<ListItem> = movies
        .iter()
        .map(|m| {
            let marker = if favorites.is_favorite(m.id) {
                Span::styled("♥ ", Style::default().fg(Color::Red))
            } else {
                Span::raw("  ")
            };
            ListItem::new(Line::from(vec![
                marker,
                rating_span(m),
                Span::raw(" "),
                Span::styled(m.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(
                    format!(" ({})", m.release_year().unwrap_or("----")),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    if browser.is_fetching_next_page() {
        items.push(ListItem::new(Span::styled(
            "  Loading more...",
            Style::default().fg(Color::DarkGray),
        )));
    }
    // Loaded pages stay listed when a later page fails
    if let Some(text) = error {
        items.push(ListItem::new(Span::styled(
            format!("  {}", text),
            Style::default().fg(Color::Red),
        )));
    }

    if state.selected() >= movies.len() {
        state.list_state.select(Some(movies.len() - 1));
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, &mut state.list_state);
}

fn draw_details(f: &mut Frame, state: &BrowserState, browser: &MovieBrowser, favorites: &FavoritesStore, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Details");
    let movies = browser.movies();
    let Some(movie) = movies.get(state.selected()) else {
        f.render_widget(block, area);
        return;
    };

    let genres = browser.genres().genre_names(movie.genre_ids.as_deref()).join(", ");
    let mut lines = vec![
        Line::styled(movie.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Line::from(vec![
            Span::raw("Rating: "),
            rating_span(movie),
            Span::raw(format!("   Year: {}", movie.release_year().unwrap_or("----"))),
        ]),
    ];
    if !genres.is_empty() {
        lines.push(Line::from(format!("Genres: {}", genres)));
    }
    if favorites.is_favorite(movie.id) {
        lines.push(Line::styled("♥ Favorite", Style::default().fg(Color::Red)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(movie.display_overview(state.expanded.contains(&movie.id))));
    if let Some(url) = movie.poster_url() {
        lines.push(Line::from(""));
        lines.push(Line::styled(url, Style::default().fg(Color::DarkGray)));
    }

    let details = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    f.render_widget(details, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
