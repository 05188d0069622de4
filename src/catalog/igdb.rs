//! IGDB games provider.
//!
//! Speaks the apicalypse query format over POST. Cover image ids expand to
//! the t_cover_big CDN URL; `first_release_date` arrives as unix seconds
//! and is rendered as a `YYYY-MM-DD` string.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::ProviderError;
use crate::storage::{Item, ItemKind};

const RESULT_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
struct IgdbGame {
    id: i64,
    name: String,
    #[serde(default)]
    cover: Option<IgdbCover>,
    #[serde(default)]
    first_release_date: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct IgdbCover {
    #[serde(default)]
    image_id: Option<String>,
}

fn cover_url(image_id: &str) -> String {
    format!("https://images.igdb.com/igdb/image/upload/t_cover_big/{image_id}.jpg")
}

/// Unix seconds to `YYYY-MM-DD`, dropping unrepresentable timestamps.
fn release_date(unix_secs: i64) -> Option<String> {
    chrono::DateTime::from_timestamp(unix_secs, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}

pub(super) async fn search_games(
    http: &reqwest::Client,
    base_url: &str,
    client_id: &SecretString,
    access_token: &SecretString,
    query: &str,
) -> Result<Vec<Item>, ProviderError> {
    // Apicalypse string literals cannot escape embedded quotes; drop them.
    let sanitized = query.replace('"', "");
    let body = format!(
        "search \"{sanitized}\"; fields id, name, cover.image_id, first_release_date; limit {RESULT_LIMIT};"
    );

    let response = http
        .post(format!("{base_url}/v4/games"))
        .header("Client-ID", client_id.expose_secret())
        .header(
            "Authorization",
            format!("Bearer {}", access_token.expose_secret()),
        )
        .header("Content-Type", "text/plain")
        .body(body)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(ProviderError::HttpStatus(response.status().as_u16()));
    }

    let games: Vec<IgdbGame> = response
        .json()
        .await
        .map_err(|e| ProviderError::Decode(e.to_string()))?;

    Ok(games
        .into_iter()
        .map(|game| Item {
            name: game.name,
            image: game
                .cover
                .and_then(|c| c.image_id)
                .map(|id| cover_url(&id)),
            release_date: game.first_release_date.and_then(release_date),
            kind: Some(ItemKind::Game),
            id: Some(game.id),
        })
        .collect())
}
