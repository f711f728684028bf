//! User settings
//!
//! Stored in ~/.config/reelscout/settings.json. Every field is optional in
//! the file; anything missing takes its default.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::browse::BrowserSettings;
use crate::browse::controller::SUGGESTION_STALE;
use crate::browse::pagination::DEFAULT_LEAD_MARGIN;
use crate::tmdb::client::{DEFAULT_BASE_URL, DEFAULT_LANGUAGE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Response locale sent with every catalog request
    pub language: String,
    pub base_url: String,
    /// Quiet period before typed search text is applied
    pub debounce_ms: u64,
    /// Rows ahead of the end of the list at which the next page is requested
    pub lead_margin: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            debounce_ms: 500,
            lead_margin: DEFAULT_LEAD_MARGIN,
        }
    }
}

impl Settings {
    /// Load from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        let settings: Self =
            serde_json::from_str(&contents).with_context(|| format!("Failed to parse settings in {:?}", path))?;

        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }
        let contents = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, contents).with_context(|| format!("Failed to write settings to {:?}", path))?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("reelscout").join("settings.json"))
    }

    pub fn browser_settings(&self) -> BrowserSettings {
        BrowserSettings {
            debounce: Duration::from_millis(self.debounce_ms),
            suggestion_stale: SUGGESTION_STALE,
        }
    }
}
