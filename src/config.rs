//! Configuration file parser for ~/.config/spinpick/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are silently ignored by serde (with `deny_unknown_fields`
//! off), though we log a warning when the file contains potential typos.
use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::catalog::CatalogSettings;
use crate::picker::SpinParams;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`.
///
/// Custom Debug impl masks catalog credentials to prevent secret leakage
/// in logs, error messages, and debug output.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of shuffle frames shown before a pick is revealed.
    pub spin_frames: u32,

    /// Delay between shuffle frames, in milliseconds.
    pub spin_frame_ms: u64,

    /// How long the search input must be idle before a query fires, in
    /// milliseconds.
    pub search_debounce_ms: u64,

    /// Whether clearing the whole item collection asks for confirmation.
    pub confirm_clear_items: bool,

    /// TMDB API read access token (alternative to TMDB_API_TOKEN env var).
    /// Env var takes precedence over config file.
    pub tmdb_api_token: Option<String>,

    /// Twitch client id for IGDB (alternative to IGDB_CLIENT_ID env var).
    pub igdb_client_id: Option<String>,

    /// IGDB OAuth access token (alternative to IGDB_ACCESS_TOKEN env var).
    pub igdb_access_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spin_frames: 30,
            spin_frame_ms: 80,
            search_debounce_ms: 400,
            confirm_clear_items: true,
            tmdb_api_token: None,
            igdb_client_id: None,
            igdb_access_token: None,
        }
    }
}

/// Mask catalog credentials in Debug output to prevent secret leakage.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("spin_frames", &self.spin_frames)
            .field("spin_frame_ms", &self.spin_frame_ms)
            .field("search_debounce_ms", &self.search_debounce_ms)
            .field("confirm_clear_items", &self.confirm_clear_items)
            .field(
                "tmdb_api_token",
                &self.tmdb_api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("igdb_client_id", &self.igdb_client_id)
            .field(
                "igdb_access_token",
                &self.igdb_access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading so a corrupted or runaway config
        // file cannot exhaust memory.
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse the TOML content first as a raw table to detect unknown keys
        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = [
                "spin_frames",
                "spin_frame_ms",
                "search_debounce_ms",
                "confirm_clear_items",
                "tmdb_api_token",
                "igdb_client_id",
                "igdb_access_token",
            ];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Spin animation parameters, clamped to sane bounds.
    pub fn spin_params(&self) -> SpinParams {
        SpinParams::clamped(self.spin_frames as usize, self.spin_frame_ms)
    }

    /// Catalog endpoints plus credentials, with environment variables taking
    /// precedence over config file values.
    pub fn catalog_settings(&self) -> CatalogSettings {
        let from_env_or =
            |var: &str, fallback: &Option<String>| -> Option<SecretString> {
                std::env::var(var)
                    .ok()
                    .filter(|v| !v.trim().is_empty())
                    .or_else(|| fallback.clone())
                    .map(SecretString::from)
            };

        CatalogSettings {
            tmdb_api_token: from_env_or("TMDB_API_TOKEN", &self.tmdb_api_token),
            igdb_client_id: from_env_or("IGDB_CLIENT_ID", &self.igdb_client_id),
            igdb_access_token: from_env_or("IGDB_ACCESS_TOKEN", &self.igdb_access_token),
            ..CatalogSettings::default()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
