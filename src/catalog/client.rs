use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::catalog::CatalogApi;
use crate::catalog::models::{
    AccessToken, AddTracksRequest, ApiPlaylist, ApiPlaylistItem, ApiUser, CatalogTrackId,
    CreatePlaylistRequest, Paging, PlaylistHandle, RemoveTracksRequest, SearchResponse,
    TokenResponse, TrackUri, UriRef, track_uri,
};
use crate::config::CatalogConfig;
use crate::error::CatalogError;

pub const PLAYLIST_DESCRIPTION: &str = "Playlist generated by Gemini for running training.";

const PLAYLIST_PAGE_LIMIT: &str = "50";
const TRACK_PAGE_LIMIT: &str = "100";

/// Spotify Web API client backed by `reqwest`.
///
/// Holds app credentials and endpoints only; every token is passed in per
/// call. Each operation is a single request (list operations follow `next`
/// links), with no retry.
pub struct CatalogClient {
    http_client: Client,
    config: CatalogConfig,
}

impl CatalogClient {
    pub fn new(config: &CatalogConfig, timeout: Duration) -> Result<Self, CatalogError> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            config: config.clone(),
        })
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, CatalogError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(CatalogError::Status { status, body });
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn ensure_success(response: Response) -> Result<(), CatalogError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(CatalogError::Status { status, body })
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<Option<String>, CatalogError> {
        let response = self
            .http_client
            .post(&self.config.token_endpoint)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(form)
            .send()
            .await?;

        let token: TokenResponse = Self::read_json(response).await?;
        Ok(token.access_token.filter(|t| !t.is_empty()))
    }

    fn playlists_url(&self, user_id: &str) -> String {
        self.config
            .playlists_endpoint
            .replace("{user_id}", &urlencoding::encode(user_id))
    }

    fn playlist_tracks_url(&self, playlist_id: &str) -> String {
        self.config
            .playlist_tracks_endpoint
            .replace("{playlist_id}", &urlencoding::encode(playlist_id))
    }

    /// Collect every item of a paged listing, following `next` links.
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        url: &str,
        limit: &str,
        token: &AccessToken,
    ) -> Result<Vec<T>, CatalogError> {
        let mut items = Vec::new();

        let first = self
            .http_client
            .get(url)
            .bearer_auth(token.secret())
            .query(&[("limit", limit)])
            .send()
            .await?;
        let mut page: Paging<T> = Self::read_json(first).await?;

        loop {
            items.extend(page.items);

            let Some(next) = page.next.filter(|n| !n.is_empty()) else {
                break;
            };

            debug!("Fetching next page: {}", next);
            let response = self
                .http_client
                .get(&next)
                .bearer_auth(token.secret())
                .send()
                .await?;
            page = Self::read_json(response).await?;
        }

        Ok(items)
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn client_credentials_token(&self) -> Result<Option<AccessToken>, CatalogError> {
        let token = self
            .request_token(&[("grant_type", "client_credentials")])
            .await?;

        Ok(token.map(AccessToken::client))
    }

    async fn exchange_authorization_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<Option<AccessToken>, CatalogError> {
        let token = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ])
            .await?;

        Ok(token.map(AccessToken::user))
    }

    async fn search_track(
        &self,
        title: &str,
        artist: &str,
        token: &AccessToken,
    ) -> Result<Option<CatalogTrackId>, CatalogError> {
        let query = format!("track:{} artist:{}", title, artist);

        let response = self
            .http_client
            .get(&self.config.search_endpoint)
            .bearer_auth(token.secret())
            .query(&[("q", query.as_str()), ("type", "track"), ("limit", "1")])
            .send()
            .await?;

        let search: SearchResponse = Self::read_json(response).await?;

        let found = search
            .tracks
            .and_then(|page| page.items.into_iter().next())
            .and_then(|track| track.verified_id());

        match &found {
            Some(id) => debug!("Found {} - {} as {}", artist, title, id),
            None => debug!("No verified match for {} - {}", artist, title),
        }

        Ok(found)
    }

    async fn current_user_id(&self, token: &AccessToken) -> Result<Option<String>, CatalogError> {
        let response = self
            .http_client
            .get(&self.config.me_endpoint)
            .bearer_auth(token.secret())
            .send()
            .await?;

        let user: ApiUser = Self::read_json(response).await?;
        Ok(user.id.filter(|id| !id.is_empty()))
    }

    async fn find_playlist_by_name(
        &self,
        name: &str,
        token: &AccessToken,
    ) -> Result<Option<PlaylistHandle>, CatalogError> {
        let url = format!("{}/playlists", self.config.me_endpoint.trim_end_matches('/'));
        let playlists: Vec<Option<ApiPlaylist>> =
            self.get_all_pages(&url, PLAYLIST_PAGE_LIMIT, token).await?;

        let wanted = name.to_lowercase();
        let found = playlists.into_iter().flatten().find_map(|p| match (p.id, p.name) {
            (Some(id), Some(playlist_name)) if playlist_name.to_lowercase() == wanted => {
                Some(PlaylistHandle {
                    id,
                    name: playlist_name,
                })
            }
            _ => None,
        });

        Ok(found)
    }

    async fn create_playlist(
        &self,
        name: &str,
        token: &AccessToken,
        user_id: &str,
    ) -> Result<Option<PlaylistHandle>, CatalogError> {
        let request = CreatePlaylistRequest {
            name,
            public: false,
            description: PLAYLIST_DESCRIPTION,
        };

        let response = self
            .http_client
            .post(self.playlists_url(user_id))
            .bearer_auth(token.secret())
            .json(&request)
            .send()
            .await?;

        let created: ApiPlaylist = Self::read_json(response).await?;

        let handle = created.id.filter(|id| !id.is_empty()).map(|id| PlaylistHandle {
            id,
            name: created.name.unwrap_or_else(|| name.to_string()),
        });

        if let Some(playlist) = &handle {
            info!("Created Spotify playlist: {} ({})", playlist.name, playlist.id);
        }

        Ok(handle)
    }

    async fn playlist_track_uris(
        &self,
        playlist_id: &str,
        token: &AccessToken,
    ) -> Result<Vec<TrackUri>, CatalogError> {
        let url = self.playlist_tracks_url(playlist_id);
        let items: Vec<ApiPlaylistItem> =
            self.get_all_pages(&url, TRACK_PAGE_LIMIT, token).await?;

        Ok(items
            .into_iter()
            .filter_map(|item| item.track.and_then(|t| t.uri))
            .filter(|uri| !uri.is_empty())
            .collect())
    }

    async fn remove_tracks(
        &self,
        playlist_id: &str,
        uris: &[TrackUri],
        token: &AccessToken,
    ) -> Result<(), CatalogError> {
        if uris.is_empty() {
            return Ok(());
        }

        let request = RemoveTracksRequest {
            tracks: uris.iter().map(|uri| UriRef { uri }).collect(),
        };

        let response = self
            .http_client
            .delete(self.playlist_tracks_url(playlist_id))
            .bearer_auth(token.secret())
            .json(&request)
            .send()
            .await?;

        Self::ensure_success(response).await
    }

    async fn add_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[CatalogTrackId],
        token: &AccessToken,
    ) -> Result<(), CatalogError> {
        if track_ids.is_empty() {
            return Ok(());
        }

        let request = AddTracksRequest {
            uris: track_ids.iter().map(|id| track_uri(id)).collect(),
        };

        let response = self
            .http_client
            .post(self.playlist_tracks_url(playlist_id))
            .bearer_auth(token.secret())
            .json(&request)
            .send()
            .await?;

        Self::ensure_success(response).await
    }
}
