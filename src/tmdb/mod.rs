//! TMDB catalog client module

pub mod catalog;
pub mod client;
pub mod error;
pub mod models;

pub use catalog::Catalog;
pub use client::TmdbClient;
pub use error::{CatalogError, CatalogResult};
pub use models::*;
