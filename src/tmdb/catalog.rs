//! Catalog contract consumed by the browser

use async_trait::async_trait;

use super::error::CatalogResult;
use super::models::{Genre, Movie, PageResult, PersonPage};
use crate::browse::filters::DiscoverFilters;

/// Remote movie catalog
///
/// Every operation is a single request. Failures come back as
/// [`CatalogError`](super::CatalogError) and are never retried here.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn fetch_popular(&self, page: u32) -> CatalogResult<PageResult>;

    async fn fetch_by_title(&self, query: &str, page: u32) -> CatalogResult<PageResult>;

    async fn fetch_by_actor(&self, actor_id: u64, page: u32) -> CatalogResult<PageResult>;

    async fn fetch_discover(&self, filters: &DiscoverFilters, page: u32) -> CatalogResult<PageResult>;

    async fn fetch_genres(&self) -> CatalogResult<Vec<Genre>>;

    async fn search_actors(&self, query: &str, page: u32) -> CatalogResult<PersonPage>;

    async fn fetch_movie(&self, id: u64) -> CatalogResult<Movie>;
}
