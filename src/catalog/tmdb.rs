//! TMDB movie and TV providers.
//!
//! Both endpoints share the Bearer-authenticated GET shape and the w500
//! poster CDN; they differ only in the field names for title and date.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::ProviderError;
use crate::storage::{Item, ItemKind};

#[derive(Debug, Deserialize)]
struct TmdbPage<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovie {
    id: i64,
    title: String,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbShow {
    id: i64,
    name: String,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    first_air_date: Option<String>,
}

fn poster_url(path: &str) -> String {
    format!("https://image.tmdb.org/t/p/w500{path}")
}

/// TMDB sends empty strings for unknown dates; treat those as absent.
fn non_empty(date: Option<String>) -> Option<String> {
    date.filter(|d| !d.is_empty())
}

async fn search_page<T: serde::de::DeserializeOwned>(
    http: &reqwest::Client,
    url: String,
    api_token: &SecretString,
    query: &str,
) -> Result<Vec<T>, ProviderError> {
    let response = http
        .get(url)
        .query(&[
            ("query", query),
            ("include_adult", "false"),
            ("language", "en-US"),
            ("page", "1"),
        ])
        .header(
            "Authorization",
            format!("Bearer {}", api_token.expose_secret()),
        )
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(ProviderError::HttpStatus(response.status().as_u16()));
    }

    let page: TmdbPage<T> = response
        .json()
        .await
        .map_err(|e| ProviderError::Decode(e.to_string()))?;
    Ok(page.results)
}

pub(super) async fn search_movies(
    http: &reqwest::Client,
    base_url: &str,
    api_token: &SecretString,
    query: &str,
) -> Result<Vec<Item>, ProviderError> {
    let movies: Vec<TmdbMovie> = search_page(
        http,
        format!("{base_url}/3/search/movie"),
        api_token,
        query,
    )
    .await?;

    Ok(movies
        .into_iter()
        .map(|movie| Item {
            name: movie.title,
            image: movie.poster_path.map(|p| poster_url(&p)),
            release_date: non_empty(movie.release_date),
            kind: Some(ItemKind::Movie),
            id: Some(movie.id),
        })
        .collect())
}

pub(super) async fn search_tv(
    http: &reqwest::Client,
    base_url: &str,
    api_token: &SecretString,
    query: &str,
) -> Result<Vec<Item>, ProviderError> {
    let shows: Vec<TmdbShow> =
        search_page(http, format!("{base_url}/3/search/tv"), api_token, query).await?;

    Ok(shows
        .into_iter()
        .map(|show| Item {
            name: show.name,
            image: show.poster_path.map(|p| poster_url(&p)),
            release_date: non_empty(show.first_air_date),
            kind: Some(ItemKind::Tv),
            id: Some(show.id),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poster_url_prefixes_cdn() {
        assert_eq!(
            poster_url("/abc.jpg"),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
    }

    #[test]
    fn empty_dates_become_none() {
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(
            non_empty(Some("2021-10-22".to_string())),
            Some("2021-10-22".to_string())
        );
        assert_eq!(non_empty(None), None);
    }
}
