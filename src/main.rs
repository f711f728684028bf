//! reelscout - Browse and search the TMDB movie catalog from the terminal

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod browse;
mod cli;
mod config;
mod favorites;
mod tmdb;
mod utils;

use cli::{Cli, Commands};
use utils::ConditionalStderrLayer;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "reelscout=debug,reqwest=debug"
    } else {
        "reelscout=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(ConditionalStderrLayer::new(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        ))
        .init();

    match cli.command {
        Commands::Auth { force } => {
            cli::commands::auth(cli.api_key, force).await?;
        }
        Commands::Browse { location } => {
            cli::commands::browse(cli.api_key, location).await?;
        }
        Commands::List { location, pages } => {
            cli::commands::list(cli.api_key, location, pages).await?;
        }
        Commands::Genres => {
            cli::commands::genres(cli.api_key).await?;
        }
        Commands::Favorites { action } => {
            cli::commands::favorites(cli.api_key, action).await?;
        }
        Commands::Completion { shell } => {
            cli::commands::completion(shell);
        }
    }

    Ok(())
}
