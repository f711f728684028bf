//! Catalog fetch errors

use thiserror::Error;

/// A catalog request that did not produce a usable response.
///
/// None of these are retried by the client; callers decide whether to ask again.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    #[error("TMDB API key is invalid or missing")]
    Unauthorized,

    #[error("{endpoint} returned status {status}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("failed to parse {endpoint} response: {message}")]
    Parse { endpoint: String, message: String },
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
