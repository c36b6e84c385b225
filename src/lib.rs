pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extractor;
pub mod generator;
pub mod sync;

pub use auth::{AuthorizationFlow, ConsentPresenter, PLAYLIST_SCOPES};
pub use catalog::{AccessToken, CatalogApi, CatalogClient, PlaylistHandle};
pub use config::Config;
pub use error::{AppError, Result};
pub use extractor::{SongEntry, SongExtractor, extract_songs};
pub use generator::{GeminiClient, PlaylistRequest, SongGenerator};
pub use sync::{PlaylistReconciler, PlaylistSync, ReconcileStrategy, SyncOptions, SyncReport};
