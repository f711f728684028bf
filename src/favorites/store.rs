//! Favorites set backed by a persistence port

use tracing::{debug, warn};

use super::port::FavoritesPort;
use crate::tmdb::Movie;

/// Liked movies, kept as snapshots in the order they were added.
///
/// Loaded once on open and written back after every change. A failed write
/// is logged and the in-memory set stays as it is.
pub struct FavoritesStore {
    movies: Vec<Movie>,
    port: Box<dyn FavoritesPort>,
}

impl FavoritesStore {
    /// Read the stored blob; missing or malformed data gives an empty set
    pub fn open(port: Box<dyn FavoritesPort>) -> Self {
        let movies = match port.load() {
            Ok(Some(blob)) => match serde_json::from_str::<Vec<Movie>>(&blob) {
                Ok(movies) => movies,
                Err(e) => {
                    warn!("Ignoring malformed favorites data: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Could not read favorites: {:#}", e);
                Vec::new()
            }
        };
        debug!("Loaded {} favorites", movies.len());
        Self { movies, port }
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn is_favorite(&self, id: u64) -> bool {
        self.movies.iter().any(|m| m.id == id)
    }

    /// Add a snapshot of `movie`; false if it was already a favorite
    pub fn add(&mut self, movie: Movie) -> bool {
        if self.is_favorite(movie.id) {
            return false;
        }
        debug!("Adding favorite {} ({})", movie.id, movie.title);
        self.movies.push(movie);
        self.persist();
        true
    }

    /// Remove by id; false if it wasn't a favorite
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.movies.len();
        self.movies.retain(|m| m.id != id);
        if self.movies.len() == before {
            return false;
        }
        debug!("Removed favorite {}", id);
        self.persist();
        true
    }

    /// Add or remove; returns whether the movie is a favorite afterwards
    pub fn toggle(&mut self, movie: &Movie) -> bool {
        if self.remove(movie.id) {
            false
        } else {
            self.add(movie.clone())
        }
    }

    fn persist(&mut self) {
        let blob = match serde_json::to_string(&self.movies) {
            Ok(blob) => blob,
            Err(e) => {
                warn!("Could not serialize favorites: {}", e);
                return;
            }
        };
        if let Err(e) = self.port.save(&blob) {
            warn!("Could not save favorites: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::favorites::MemoryFavorites;
    use std::sync::atomic::Ordering;

    fn movie(id: u64) -> Movie {
        Movie {
            id,
            title: format!("Movie {}", id),
            poster_path: Some("/p.jpg".to_string()),
            release_date: "1999-10-15".to_string(),
            overview: None,
            vote_average: Some(8.4),
            backdrop_path: None,
            genre_ids: None,
        }
    }

    #[test]
    fn test_add_then_remove_unknown_id() {
        let mut store = FavoritesStore::open(Box::new(MemoryFavorites::default()));
        assert!(store.add(movie(550)));
        assert!(!store.remove(551));

        assert!(store.is_favorite(550));
        assert!(!store.is_favorite(551));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_open_does_not_write() {
        let port = MemoryFavorites::default();
        *port.blob.lock().unwrap() = Some(serde_json::to_string(&vec![movie(1)]).unwrap());
        let saves = port.saves.clone();

        let store = FavoritesStore::open(Box::new(port.clone()));
        assert_eq!(store.len(), 1);
        assert_eq!(saves.load(Ordering::SeqCst), 0);
        assert!(port.blob.lock().unwrap().is_some());
    }

    #[test]
    fn test_mutations_are_persisted() {
        let port = MemoryFavorites::default();
        let mut store = FavoritesStore::open(Box::new(port.clone()));
        store.add(movie(550));
        store.add(movie(550));
        store.add(movie(13));
        store.remove(550);

        assert_eq!(port.saves.load(Ordering::SeqCst), 3);
        let saved: Vec<Movie> = serde_json::from_str(port.blob.lock().unwrap().as_deref().unwrap()).unwrap();
        assert_eq!(saved, vec![movie(13)]);
    }

    #[test]
    fn test_malformed_blob_gives_empty_set() {
        let port = MemoryFavorites::default();
        *port.blob.lock().unwrap() = Some("{not json".to_string());
        let store = FavoritesStore::open(Box::new(port));
        assert!(store.is_empty());
    }

    #[test]
    fn test_failed_write_keeps_memory_state() {
        let port = MemoryFavorites {
            fail_writes: true,
            ..Default::default()
        };
        let mut store = FavoritesStore::open(Box::new(port));
        assert!(store.add(movie(550)));
        assert!(store.is_favorite(550));
    }

    #[test]
    fn test_toggle() {
        let mut store = FavoritesStore::open(Box::new(MemoryFavorites::default()));
        assert!(store.toggle(&movie(7)));
        assert!(!store.toggle(&movie(7)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut store = FavoritesStore::open(Box::new(MemoryFavorites::default()));
        let mut original = movie(550);
        store.add(original.clone());
        original.title = "Changed".to_string();
        assert_eq!(store.movies()[0].title, "Movie 550");
    }
}
