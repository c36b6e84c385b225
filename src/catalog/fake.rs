//! In-memory `CatalogApi` used by the reconciler, auth flow and sync tests.
//! Every call is recorded, including bulk calls with nothing to send.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::catalog::{
    AccessToken, CatalogApi, CatalogTrackId, PlaylistHandle, TrackUri, track_uri,
};
use crate::error::CatalogError;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ClientToken,
    Exchange { code: String, redirect_uri: String },
    Search { title: String, artist: String },
    CurrentUser,
    Find(String),
    Create(String),
    ListTracks(String),
    Remove(String, Vec<TrackUri>),
    Add(String, Vec<CatalogTrackId>),
}

#[derive(Default)]
pub struct FakeCatalog {
    pub user_id: Option<String>,
    pub user_token: Option<String>,
    pub client_token: Option<String>,
    pub fail_create: bool,
    pub fail_exchange: bool,
    /// "artist - title" -> track id
    pub tracks: HashMap<String, CatalogTrackId>,
    pub playlists: Mutex<Vec<(PlaylistHandle, Vec<TrackUri>)>>,
    pub calls: Mutex<Vec<Call>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self {
            user_id: Some("user123".to_string()),
            user_token: Some("user-token".to_string()),
            client_token: Some("client-token".to_string()),
            ..Default::default()
        }
    }

    pub fn with_playlist(self, id: &str, name: &str, uris: &[&str]) -> Self {
        self.playlists.lock().unwrap().push((
            PlaylistHandle {
                id: id.to_string(),
                name: name.to_string(),
            },
            uris.iter().map(|u| u.to_string()).collect(),
        ));
        self
    }

    pub fn with_track(mut self, artist: &str, title: &str, id: &str) -> Self {
        self.tracks
            .insert(format!("{} - {}", artist, title), id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn contents(&self, name: &str) -> Option<Vec<TrackUri>> {
        self.playlists
            .lock()
            .unwrap()
            .iter()
            .find(|(p, _)| p.name == name)
            .map(|(_, uris)| uris.clone())
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn client_credentials_token(&self) -> Result<Option<AccessToken>, CatalogError> {
        self.record(Call::ClientToken);
        Ok(self.client_token.clone().map(AccessToken::client))
    }

    async fn exchange_authorization_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<Option<AccessToken>, CatalogError> {
        self.record(Call::Exchange {
            code: code.to_string(),
            redirect_uri: redirect_uri.to_string(),
        });
        if self.fail_exchange {
            return Err(CatalogError::Status {
                status: reqwest::StatusCode::BAD_REQUEST,
                body: "invalid_grant".to_string(),
            });
        }
        Ok(self.user_token.clone().map(AccessToken::user))
    }

    async fn search_track(
        &self,
        title: &str,
        artist: &str,
        _token: &AccessToken,
    ) -> Result<Option<CatalogTrackId>, CatalogError> {
        self.record(Call::Search {
            title: title.to_string(),
            artist: artist.to_string(),
        });
        Ok(self.tracks.get(&format!("{} - {}", artist, title)).cloned())
    }

    async fn current_user_id(&self, _token: &AccessToken) -> Result<Option<String>, CatalogError> {
        self.record(Call::CurrentUser);
        Ok(self.user_id.clone())
    }

    async fn find_playlist_by_name(
        &self,
        name: &str,
        _token: &AccessToken,
    ) -> Result<Option<PlaylistHandle>, CatalogError> {
        self.record(Call::Find(name.to_string()));
        Ok(self
            .playlists
            .lock()
            .unwrap()
            .iter()
            .find(|(p, _)| p.name.to_lowercase() == name.to_lowercase())
            .map(|(p, _)| p.clone()))
    }

    async fn create_playlist(
        &self,
        name: &str,
        _token: &AccessToken,
        _user_id: &str,
    ) -> Result<Option<PlaylistHandle>, CatalogError> {
        self.record(Call::Create(name.to_string()));
        if self.fail_create {
            return Ok(None);
        }

        let mut playlists = self.playlists.lock().unwrap();
        let handle = PlaylistHandle {
            id: format!("pl{}", playlists.len() + 1),
            name: name.to_string(),
        };
        playlists.push((handle.clone(), Vec::new()));
        Ok(Some(handle))
    }

    async fn playlist_track_uris(
        &self,
        playlist_id: &str,
        _token: &AccessToken,
    ) -> Result<Vec<TrackUri>, CatalogError> {
        self.record(Call::ListTracks(playlist_id.to_string()));
        Ok(self
            .playlists
            .lock()
            .unwrap()
            .iter()
            .find(|(p, _)| p.id == playlist_id)
            .map(|(_, uris)| uris.clone())
            .unwrap_or_default())
    }

    async fn remove_tracks(
        &self,
        playlist_id: &str,
        uris: &[TrackUri],
        _token: &AccessToken,
    ) -> Result<(), CatalogError> {
        self.record(Call::Remove(playlist_id.to_string(), uris.to_vec()));

        let mut playlists = self.playlists.lock().unwrap();
        if let Some((_, current)) = playlists.iter_mut().find(|(p, _)| p.id == playlist_id) {
            current.retain(|uri| !uris.contains(uri));
        }
        Ok(())
    }

    async fn add_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[CatalogTrackId],
        _token: &AccessToken,
    ) -> Result<(), CatalogError> {
        self.record(Call::Add(playlist_id.to_string(), track_ids.to_vec()));

        let mut playlists = self.playlists.lock().unwrap();
        if let Some((_, current)) = playlists.iter_mut().find(|(p, _)| p.id == playlist_id) {
            current.extend(track_ids.iter().map(|id| track_uri(id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_bulk_calls_are_recorded() {
        let catalog = FakeCatalog::new().with_playlist("plid", "MyDailyTrain", &[]);
        let token = AccessToken::user("user-token");

        catalog.remove_tracks("plid", &[], &token).await.unwrap();
        catalog.add_tracks("plid", &[], &token).await.unwrap();

        assert_eq!(
            catalog.calls(),
            vec![
                Call::Remove("plid".to_string(), Vec::new()),
                Call::Add("plid".to_string(), Vec::new()),
            ]
        );
    }
}
