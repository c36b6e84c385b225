pub mod client;
pub mod models;

use async_trait::async_trait;

use crate::error::CatalogError;

pub use client::CatalogClient;
pub use models::{AccessToken, CatalogTrackId, PlaylistHandle, TokenKind, TrackUri, track_uri};

/// The Spotify operations the sync pipeline needs.
///
/// `Ok(None)` means the call succeeded but the response lacked the expected
/// field; transport, status and decode failures are `Err`.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn client_credentials_token(&self) -> Result<Option<AccessToken>, CatalogError>;

    async fn exchange_authorization_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<Option<AccessToken>, CatalogError>;

    async fn search_track(
        &self,
        title: &str,
        artist: &str,
        token: &AccessToken,
    ) -> Result<Option<CatalogTrackId>, CatalogError>;

    async fn current_user_id(&self, token: &AccessToken) -> Result<Option<String>, CatalogError>;

    async fn find_playlist_by_name(
        &self,
        name: &str,
        token: &AccessToken,
    ) -> Result<Option<PlaylistHandle>, CatalogError>;

    async fn create_playlist(
        &self,
        name: &str,
        token: &AccessToken,
        user_id: &str,
    ) -> Result<Option<PlaylistHandle>, CatalogError>;

    async fn playlist_track_uris(
        &self,
        playlist_id: &str,
        token: &AccessToken,
    ) -> Result<Vec<TrackUri>, CatalogError>;

    /// No request is sent when `uris` is empty.
    async fn remove_tracks(
        &self,
        playlist_id: &str,
        uris: &[TrackUri],
        token: &AccessToken,
    ) -> Result<(), CatalogError>;

    /// No request is sent when `track_ids` is empty.
    async fn add_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[CatalogTrackId],
        token: &AccessToken,
    ) -> Result<(), CatalogError>;
}

#[cfg(test)]
pub(crate) mod fake;
