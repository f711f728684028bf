//! CLI command handlers

use anyhow::{Context, Result};
use clap_complete::generate;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::sync::Arc;
use std::time::Duration;

use super::{AuthManager, FavoritesAction};
use crate::browse::{self, MemoryHistory, MovieBrowser, url_sync::query_of};
use crate::config::Settings;
use crate::favorites::{FavoritesStore, FileFavorites};
use crate::tmdb::{Catalog, GenreMap, Movie, RatingClass, TmdbClient};

/// Build a catalog client from the resolved API key and settings
fn connect(api_key: Option<String>, settings: &Settings) -> Result<Arc<dyn Catalog>> {
    let api_key = AuthManager::resolve(api_key)?;
    let client = TmdbClient::new(&settings.base_url, &api_key, &settings.language)?;
    Ok(Arc::new(client))
}

fn open_favorites() -> Result<FavoritesStore> {
    let port = FileFavorites::default_location()?;
    Ok(FavoritesStore::open(Box::new(port)))
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// One result line: title, year, rating and genres
fn print_movie(movie: &Movie, genres: &GenreMap, favorite: bool) {
    let year = movie.release_year().unwrap_or("----");
    let rating = match (movie.rating_label(), movie.rating_class()) {
        (Some(label), Some(RatingClass::High)) => label.green().to_string(),
        (Some(label), Some(RatingClass::Medium)) => label.yellow().to_string(),
        (Some(label), _) => label.red().to_string(),
        (None, _) => "  - ".dimmed().to_string(),
    };
    let marker = if favorite { "♥".red().to_string() } else { " ".to_string() };
    let genre_names = genres.genre_names(movie.genre_ids.as_deref()).join(", ");

    println!(
        "{} {:>8}  {} {} ({})  {}",
        marker,
        movie.id.to_string().dimmed(),
        rating,
        movie.title.bold(),
        year,
        genre_names.dimmed()
    );
}

/// Handle the `auth` command
pub async fn auth(api_key: Option<String>, force: bool) -> Result<()> {
    println!("{}", "Configuring TMDB API key...".cyan());
    let settings = Settings::load()?;

    AuthManager::authenticate(api_key, force, &settings).await?;

    let settings_path = Settings::config_path()?;
    if !settings_path.exists() {
        settings.save_to(&settings_path)?;
        println!("Wrote default settings to {}", settings_path.display());
    }

    println!();
    println!("{}", "Authentication successful!".green().bold());
    println!("  Server: {}", settings.base_url);
    println!("  Language: {}", settings.language);
    println!();
    println!("API key stored securely in system keyring.");

    Ok(())
}

/// Handle the `browse` command
pub async fn browse(api_key: Option<String>, location: Option<String>) -> Result<()> {
    let settings = Settings::load()?;
    let catalog = connect(api_key, &settings)?;
    let mut favorites = open_favorites()?;

    let history = MemoryHistory::new(query_of(location.as_deref().unwrap_or("")));
    let browser = MovieBrowser::new(catalog, Box::new(history), settings.browser_settings());

    let final_location = browse::interactive::run_browser(browser, &mut favorites, settings.lead_margin).await?;

    if final_location.is_empty() {
        println!("{}", "Location: (popular)".dimmed());
    } else {
        println!("Location: ?{}", final_location.cyan());
    }
    Ok(())
}

/// Handle the `list` command
pub async fn list(api_key: Option<String>, location: Option<String>, pages: u32) -> Result<()> {
    let settings = Settings::load()?;
    let catalog = connect(api_key, &settings)?;
    let favorites = open_favorites()?;

    let history = MemoryHistory::new(query_of(location.as_deref().unwrap_or("")));
    let mut browser = MovieBrowser::new(catalog, Box::new(history), settings.browser_settings());

    let progress = spinner(&format!("Loading {}...", browser.mode().label()));
    browser.mount();
    browser.settle().await;

    for _ in 1..pages.max(1) {
        if !browser.has_next_page() || browser.is_error() {
            break;
        }
        browser.load_more();
        browser.settle().await;
    }
    progress.finish_and_clear();

    if let Some(message) = browser.error_message() {
        anyhow::bail!("{}", message);
    }

    let movies = browser.movies();
    let shown = match browser.total_results() {
        Some(total) => format!("{} of {} movies", movies.len(), total),
        None => format!("{} movies", movies.len()),
    };
    println!("{} ({})", browser.mode().label().cyan().bold(), shown);
    println!();
    if movies.is_empty() {
        println!("{}", "No movies found.".yellow());
        return Ok(());
    }
    for movie in &movies {
        print_movie(movie, browser.genres(), favorites.is_favorite(movie.id));
    }
    if browser.has_next_page() {
        println!();
        println!("More results available, use {} to fetch them.", "--pages".cyan());
    }

    Ok(())
}

/// Handle the `genres` command
pub async fn genres(api_key: Option<String>) -> Result<()> {
    let settings = Settings::load()?;
    let catalog = connect(api_key, &settings)?;

    let genres = catalog.fetch_genres().await.context("Failed to load genres")?;
    println!("{}", "Genres:".green().bold());
    for genre in &genres {
        println!("  {:>6}  {}", genre.id.to_string().dimmed(), genre.name);
    }
    Ok(())
}

/// Handle the `favorites` command
pub async fn favorites(api_key: Option<String>, action: FavoritesAction) -> Result<()> {
    let mut store = open_favorites()?;

    match action {
        FavoritesAction::List => {
            if store.is_empty() {
                println!("{}", "No favorites yet.".yellow());
                return Ok(());
            }
            println!("{} ({})", "Favorites".green().bold(), store.len());
            for movie in store.movies() {
                print_movie(movie, &GenreMap::default(), true);
            }
        }
        FavoritesAction::Add { id } => {
            if store.is_favorite(id) {
                println!("Movie {} is already a favorite.", id);
                return Ok(());
            }
            let settings = Settings::load()?;
            let catalog = connect(api_key, &settings)?;
            let movie = catalog
                .fetch_movie(id)
                .await
                .with_context(|| format!("Failed to look up movie {}", id))?;
            println!("{} {}", "Added".green(), movie.title.bold());
            store.add(movie);
        }
        FavoritesAction::Remove { id } => {
            if store.remove(id) {
                println!("{} movie {}", "Removed".green(), id);
            } else {
                println!("{}", format!("Movie {} is not a favorite.", id).yellow());
            }
        }
    }
    Ok(())
}

/// Handle the `completion` command
pub fn completion(shell: clap_complete::Shell) {
    let mut cmd = super::Cli::command();
    generate(shell, &mut cmd, "reelscout", &mut io::stdout());
}

// Extension trait for Cli to get clap Command
impl super::Cli {
    fn command() -> clap::Command {
        <Self as clap::CommandFactory>::command()
    }
}
