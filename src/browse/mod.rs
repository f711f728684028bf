//! Movie browsing: filter state, mode selection, location sync and paging

pub mod controller;
pub mod debounce;
pub mod filters;
pub mod interactive;
pub mod mode;
pub mod pagination;
pub mod query_cache;
pub mod suggestions;
pub mod url_sync;

pub use controller::{BrowserSettings, MovieBrowser};
pub use url_sync::MemoryHistory;
