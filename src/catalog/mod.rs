//! Catalog search: one query fanned out to IGDB (games) and TMDB (movies
//! and TV), results concatenated in provider-call order.
//!
//! A provider failure never fails the whole search; that provider simply
//! contributes nothing for this query. Callers cannot distinguish "no
//! results" from "provider error" and must treat both identically.

mod cache;
mod igdb;
mod tmdb;

use secrecy::SecretString;
use thiserror::Error;

pub use cache::QueryCache;

use crate::storage::Item;
use crate::util::strip_control_chars;

/// Errors internal to a single provider call. Degraded to an empty result
/// set (and a warning) before leaving this module.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network-level error (DNS, connection, TLS, timeout)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Response body was not the expected JSON shape
    #[error("Decode error: {0}")]
    Decode(String),
    /// Provider credentials are not configured
    #[error("Provider credentials not configured")]
    MissingCredentials,
}

/// Endpoints and credentials for the two catalogs. Base URLs are
/// parameters so tests can point them at a mock server.
#[derive(Clone)]
pub struct CatalogSettings {
    pub igdb_base_url: String,
    pub tmdb_base_url: String,
    pub igdb_client_id: Option<SecretString>,
    pub igdb_access_token: Option<SecretString>,
    pub tmdb_api_token: Option<SecretString>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            igdb_base_url: "https://api.igdb.com".to_string(),
            tmdb_base_url: "https://api.themoviedb.org".to_string(),
            igdb_client_id: None,
            igdb_access_token: None,
            tmdb_api_token: None,
        }
    }
}

/// The search adapter: `search(query) -> Vec<Item>`, never an error.
#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    settings: CatalogSettings,
}

impl CatalogClient {
    pub fn new(http: reqwest::Client, settings: CatalogSettings) -> Self {
        Self { http, settings }
    }

    /// True when at least one provider has credentials; without any, every
    /// search would come back empty and the UI can say so up front.
    pub fn has_any_credentials(&self) -> bool {
        (self.settings.igdb_client_id.is_some() && self.settings.igdb_access_token.is_some())
            || self.settings.tmdb_api_token.is_some()
    }

    /// Query all providers concurrently and concatenate their results in
    /// call order (games, movies, tv). Provider names are sanitized and
    /// items with blank names dropped before they enter the app.
    pub async fn search(&self, query: &str) -> Vec<Item> {
        let (games, movies, tv) =
            tokio::join!(self.games(query), self.movies(query), self.tv(query));

        let mut combined = Vec::new();
        for (provider, result) in [("igdb", games), ("tmdb_movie", movies), ("tmdb_tv", tv)] {
            match result {
                Ok(items) => combined.extend(items),
                Err(ProviderError::MissingCredentials) => {
                    tracing::debug!(provider, "Skipping provider without credentials");
                }
                Err(e) => {
                    tracing::warn!(provider, error = %e, "Catalog provider failed, degrading to empty");
                }
            }
        }

        combined.retain_mut(|item| {
            item.name = strip_control_chars(&item.name).into_owned();
            !item.name.trim().is_empty()
        });
        combined
    }

    async fn games(&self, query: &str) -> Result<Vec<Item>, ProviderError> {
        let (Some(client_id), Some(token)) = (
            self.settings.igdb_client_id.as_ref(),
            self.settings.igdb_access_token.as_ref(),
        ) else {
            return Err(ProviderError::MissingCredentials);
        };
        igdb::search_games(
            &self.http,
            &self.settings.igdb_base_url,
            client_id,
            token,
            query,
        )
        .await
    }

    async fn movies(&self, query: &str) -> Result<Vec<Item>, ProviderError> {
        let Some(token) = self.settings.tmdb_api_token.as_ref() else {
            return Err(ProviderError::MissingCredentials);
        };
        tmdb::search_movies(&self.http, &self.settings.tmdb_base_url, token, query).await
    }

    async fn tv(&self, query: &str) -> Result<Vec<Item>, ProviderError> {
        let Some(token) = self.settings.tmdb_api_token.as_ref() else {
            return Err(ProviderError::MissingCredentials);
        };
        tmdb::search_tv(&self.http, &self.settings.tmdb_base_url, token, query).await
    }
}
