//! Storage slot for the favorites blob
//!
//! The blob lives in ~/.local/share/reelscout/favorites.json (or the
//! platform's data directory).

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// A single named slot holding the serialized favorites
pub trait FavoritesPort: Send {
    /// Raw blob, or `None` when nothing was ever saved
    fn load(&self) -> Result<Option<String>>;

    fn save(&mut self, blob: &str) -> Result<()>;
}

/// Favorites kept in a JSON file
#[derive(Debug, Clone)]
pub struct FileFavorites {
    path: PathBuf,
}

impl FileFavorites {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// File in the user's data directory
    pub fn default_location() -> Result<Self> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(Self::new(data_dir.join("reelscout").join("favorites.json")))
    }
}

impl FavoritesPort for FileFavorites {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            debug!("No favorites file at {:?}", self.path);
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read favorites from {:?}", self.path))?;
        Ok(Some(contents))
    }

    fn save(&mut self, blob: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory {:?}", parent))?;
        }
        fs::write(&self.path, blob)
            .with_context(|| format!("Failed to write favorites to {:?}", self.path))?;
        Ok(())
    }
}

/// In-memory slot with failure injection
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryFavorites {
    pub blob: std::sync::Arc<std::sync::Mutex<Option<String>>>,
    pub saves: std::sync::Arc<std::sync::atomic::AtomicUsize>,
    pub fail_writes: bool,
}

#[cfg(test)]
impl FavoritesPort for MemoryFavorites {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.blob.lock().unwrap().clone())
    }

    fn save(&mut self, blob: &str) -> Result<()> {
        if self.fail_writes {
            anyhow::bail!("quota exceeded");
        }
        self.saves.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        *self.blob.lock().unwrap() = Some(blob.to_string());
        Ok(())
    }
}
