use std::time::Duration;

use crate::error::{AppError, Result};

pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
pub const DEFAULT_AUTH_ENDPOINT: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://api.spotify.com/v1/search";
pub const DEFAULT_ME_ENDPOINT: &str = "https://api.spotify.com/v1/me";
pub const DEFAULT_PLAYLISTS_ENDPOINT: &str = "https://api.spotify.com/v1/users/{user_id}/playlists";
pub const DEFAULT_PLAYLIST_TRACKS_ENDPOINT: &str =
    "https://api.spotify.com/v1/playlists/{playlist_id}/tracks";
pub const DEFAULT_GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 300;

/// Spotify application credentials and endpoints.
///
/// `playlists_endpoint` and `playlist_tracks_endpoint` are templates; the
/// `{user_id}` and `{playlist_id}` placeholders are filled per call.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_endpoint: String,
    pub token_endpoint: String,
    pub search_endpoint: String,
    pub me_endpoint: String,
    pub playlists_endpoint: String,
    pub playlist_tracks_endpoint: String,
}

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub api_key: String,
    pub endpoint: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub generator: GeneratorConfig,
    pub http_timeout: Duration,
    pub auth_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Missing credentials are left empty rather than rejected so the CLI can
    /// list every one of them at once; see [`Config::get_missing_config`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credential = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };
        let or_default = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let seconds = |key: &str, default: u64| -> Result<Duration> {
            match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|_| AppError::Config(format!("{} must be a number of seconds", key))),
                None => Ok(Duration::from_secs(default)),
            }
        };

        let catalog = CatalogConfig {
            client_id: credential("SPOTIFY_CLIENT_ID"),
            client_secret: credential("SPOTIFY_CLIENT_SECRET"),
            redirect_uri: or_default("SPOTIFY_REDIRECT_URI", DEFAULT_REDIRECT_URI),
            auth_endpoint: or_default("SPOTIFY_AUTH_ENDPOINT", DEFAULT_AUTH_ENDPOINT),
            token_endpoint: or_default("SPOTIFY_TOKEN_ENDPOINT", DEFAULT_TOKEN_ENDPOINT),
            search_endpoint: or_default("SPOTIFY_SEARCH_ENDPOINT", DEFAULT_SEARCH_ENDPOINT),
            me_endpoint: or_default("SPOTIFY_ME_ENDPOINT", DEFAULT_ME_ENDPOINT),
            playlists_endpoint: or_default("SPOTIFY_PLAYLISTS_ENDPOINT", DEFAULT_PLAYLISTS_ENDPOINT),
            playlist_tracks_endpoint: or_default(
                "SPOTIFY_PLAYLIST_TRACKS_ENDPOINT",
                DEFAULT_PLAYLIST_TRACKS_ENDPOINT,
            ),
        };

        let generator = GeneratorConfig {
            api_key: credential("GEMINI_API_KEY"),
            endpoint: or_default("GEMINI_ENDPOINT", DEFAULT_GEMINI_ENDPOINT),
        };

        Ok(Self {
            catalog,
            generator,
            http_timeout: seconds("HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?,
            auth_timeout: seconds("AUTH_TIMEOUT_SECS", DEFAULT_AUTH_TIMEOUT_SECS)?,
        })
    }

    pub fn get_missing_config(&self) -> Vec<String> {
        let mut missing = Vec::new();

        if self.catalog.client_id.is_empty() {
            missing.push("SPOTIFY_CLIENT_ID".to_string());
        }
        if self.catalog.client_secret.is_empty() {
            missing.push("SPOTIFY_CLIENT_SECRET".to_string());
        }
        if self.generator.api_key.is_empty() {
            missing.push("GEMINI_API_KEY".to_string());
        }

        missing
    }
}
