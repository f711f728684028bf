//! TMDB HTTP client

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::catalog::Catalog;
use super::error::{CatalogError, CatalogResult};
use super::models::*;
use crate::browse::filters::{DEFAULT_SORT, DiscoverFilters};

/// Default TMDB API root
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Default response locale
pub const DEFAULT_LANGUAGE: &str = "ru-RU";

/// HTTP client for the TMDB v3 REST API
#[derive(Clone)]
pub struct TmdbClient {
    base_url: String,
    api_key: String,
    language: String,
    http_client: Client,
}

impl TmdbClient {
    /// Create a new TMDB client
    pub fn new(base_url: &str, api_key: &str, language: &str) -> Result<Self> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            anyhow::bail!("TMDB API key cannot be empty");
        }

        let http_client = Client::builder()
            .user_agent(concat!("reelscout/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            language: language.to_string(),
            http_client,
        })
    }

    /// Query parameters sent with every request
    fn base_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("api_key", self.api_key.clone()),
            ("language", self.language.clone()),
        ]
    }

    /// GET an endpoint and decode its JSON body
    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&'static str, String)],
    ) -> CatalogResult<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("GET {} ({} params)", url, params.len());

        let mut query = self.base_params();
        query.extend_from_slice(params);

        let response = self
            .http_client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| CatalogError::Transport {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(CatalogError::Unauthorized);
        }

        let bytes = response.bytes().await.map_err(|e| CatalogError::Transport {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;

        if !status.is_success() {
            let message = serde_json::from_slice::<TmdbStatus>(&bytes)
                .ok()
                .and_then(|s| s.status_message)
                .unwrap_or_else(|| String::from_utf8_lossy(&bytes).into_owned());
            return Err(CatalogError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| CatalogError::Parse {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }
}

/// Translate discovery filters into `discover/movie` parameters, leaving out unset ones
pub fn discover_params(filters: &DiscoverFilters, page: u32) -> Vec<(&'static str, String)> {
    let mut params = vec![("page", page.to_string())];

    if let Some(year) = filters.year {
        params.push(("primary_release_year", year.to_string()));
    }

    if !filters.genre_ids.is_empty() {
        let genres: Vec<String> = filters.genre_ids.iter().map(u32::to_string).collect();
        params.push(("with_genres", genres.join(",")));
    }

    if let Some(rating) = filters.min_rating {
        params.push(("vote_average.gte", rating.to_string()));
    }

    let sort = filters.sort_by.as_deref().unwrap_or(DEFAULT_SORT);
    params.push(("sort_by", sort.to_string()));

    params
}

#[async_trait]
impl Catalog for TmdbClient {
    async fn fetch_popular(&self, page: u32) -> CatalogResult<PageResult> {
        self.get("/movie/popular", &[("page", page.to_string())])
            .await
    }

    async fn fetch_by_title(&self, query: &str, page: u32) -> CatalogResult<PageResult> {
        self.get(
            "/search/movie",
            &[("query", query.to_string()), ("page", page.to_string())],
        )
        .await
    }

    async fn fetch_by_actor(&self, actor_id: u64, page: u32) -> CatalogResult<PageResult> {
        self.get(
            "/discover/movie",
            &[("with_cast", actor_id.to_string()), ("page", page.to_string())],
        )
        .await
    }

    async fn fetch_discover(&self, filters: &DiscoverFilters, page: u32) -> CatalogResult<PageResult> {
        self.get("/discover/movie", &discover_params(filters, page))
            .await
    }

    async fn fetch_genres(&self) -> CatalogResult<Vec<Genre>> {
        let response: GenresResponse = self.get("/genre/movie/list", &[]).await?;
        debug!("Found {} genres", response.genres.len());
        Ok(response.genres)
    }

    async fn search_actors(&self, query: &str, page: u32) -> CatalogResult<PersonPage> {
        self.get(
            "/search/person",
            &[("query", query.to_string()), ("page", page.to_string())],
        )
        .await
    }

    async fn fetch_movie(&self, id: u64) -> CatalogResult<Movie> {
        self.get(&format!("/movie/{}", id), &[]).await
    }
}
