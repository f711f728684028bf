//! Locally persisted favorite movies

mod port;
mod store;

pub use port::{FavoritesPort, FileFavorites};
pub use store::FavoritesStore;

#[cfg(test)]
pub use port::MemoryFavorites;
