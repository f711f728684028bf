//! Keyring-based storage for the TMDB API key

use anyhow::{Context, Result};
use dialoguer::Password;
use keyring::Entry;
use tracing::{debug, info};

use crate::config::Settings;
use crate::tmdb::{Catalog, TmdbClient};

const KEYRING_SERVICE: &str = "reelscout";
const KEYRING_ENTRY: &str = "tmdb:api_key";

/// Manages the stored API key
pub struct AuthManager;

impl AuthManager {
    /// Obtain an API key and store it in the keyring
    ///
    /// Reuses a stored key unless `force` is set; otherwise prompts for one
    /// when none was given. The key is verified before it is stored.
    pub async fn authenticate(api_key: Option<String>, force: bool, settings: &Settings) -> Result<String> {
        if !force && api_key.is_none() {
            if let Ok(key) = Self::load() {
                info!("Found existing API key in keyring");
                return Ok(key);
            }
        } else if force {
            debug!("Force flag set, ignoring stored API key");
        }

        let api_key = match api_key {
            Some(key) => key,
            None => Password::new()
                .with_prompt("TMDB API key")
                .interact()
                .context("Failed to read API key")?,
        };
        let api_key = api_key.trim().to_string();

        Self::verify(&api_key, settings).await?;
        Self::store(&api_key)?;
        info!("API key stored in keyring");

        Ok(api_key)
    }

    /// Key given on the command line or in the environment, else the stored one
    pub fn resolve(api_key: Option<String>) -> Result<String> {
        match api_key.filter(|k| !k.trim().is_empty()) {
            Some(key) => Ok(key),
            None => Self::load().context("No TMDB API key found. Run `reelscout auth` or set TMDB_API_KEY"),
        }
    }

    pub fn load() -> Result<String> {
        Self::get_entry()?
            .get_password()
            .context("No TMDB API key in keyring")
    }

    pub fn store(api_key: &str) -> Result<()> {
        Self::get_entry()?
            .set_password(api_key)
            .context("Failed to store API key in keyring")?;
        debug!("API key stored in keyring");
        Ok(())
    }

    /// Verify the key with a genre list request
    async fn verify(api_key: &str, settings: &Settings) -> Result<()> {
        debug!("Verifying API key against {}", settings.base_url);

        let client = TmdbClient::new(&settings.base_url, api_key, &settings.language)?;
        let genres = client.fetch_genres().await.context("Failed to verify API key")?;

        info!("API key verified ({} genres available)", genres.len());
        Ok(())
    }

    fn get_entry() -> Result<Entry> {
        Entry::new(KEYRING_SERVICE, KEYRING_ENTRY).context("Failed to access keyring")
    }
}
