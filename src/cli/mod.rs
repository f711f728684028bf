//! CLI module for reelscout

use clap::{Parser, Subcommand};

pub mod auth;
pub mod commands;

pub use auth::AuthManager;

#[derive(Parser, Debug)]
#[command(name = "reelscout", about = "Browse and search the TMDB movie catalog")]
#[command(version, author)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// TMDB API key (overrides the one stored by `auth`)
    #[arg(long, global = true, env = "TMDB_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store and verify a TMDB API key
    Auth {
        /// Ignore the stored key and ask for a new one
        #[arg(long)]
        force: bool,
    },

    /// Interactive movie browser
    Browse {
        /// Starting location, e.g. `?year=2020&genres=28` or a full URL
        #[arg(value_name = "LOCATION")]
        location: Option<String>,
    },

    /// Print movies for a location without the interactive view
    List {
        /// Location to read filters from
        #[arg(value_name = "LOCATION")]
        location: Option<String>,

        /// Number of pages to fetch
        #[arg(short, long, default_value = "1")]
        pages: u32,
    },

    /// Print the genre table
    Genres,

    /// Manage favorite movies
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum FavoritesAction {
    /// Show all favorites
    List,

    /// Add a movie by TMDB id
    Add {
        #[arg(value_name = "ID")]
        id: u64,
    },

    /// Remove a movie by TMDB id
    Remove {
        #[arg(value_name = "ID")]
        id: u64,
    },
}
