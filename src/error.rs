use std::time::Duration;

use thiserror::Error;

/// Failure talking to the Spotify Web API.
///
/// A successful call whose body lacks the expected field is not an error;
/// the catalog operations return `Ok(None)` for that case.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Spotify API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Malformed Spotify response: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No authorization redirect received within {0:?}")]
    TimedOut(Duration),

    #[error("Authorization denied: {0}")]
    Denied(String),

    #[error("Authorization code exchange failed: {0}")]
    Exchange(#[from] CatalogError),

    #[error("Token endpoint returned no access token")]
    NoToken,

    #[error("Callback listener error: {0}")]
    Listener(#[from] std::io::Error),

    #[error("Invalid redirect URI: {0}")]
    InvalidRedirectUri(String),

    #[error("Invalid authorization endpoint: {0}")]
    InvalidAuthEndpoint(String),
}

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Could not retrieve the current Spotify user ID")]
    MissingUserId,

    #[error("Failed to create playlist '{0}'")]
    CreateFailed(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gemini API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Malformed Gemini response: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Spotify API error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Playlist sync failed: {0}")]
    Reconcile(#[from] ReconcileError),

    #[error("Song generation failed: {0}")]
    Generator(#[from] GeneratorError),

    #[error("{0}")]
    Pipeline(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
