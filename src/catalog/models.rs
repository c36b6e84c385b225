use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque Spotify track id, as returned by search.
pub type CatalogTrackId = String;

/// `spotify:track:<id>` form used by the playlist-tracks endpoint.
pub type TrackUri = String;

pub const TRACK_URI_PREFIX: &str = "spotify:track:";

pub fn track_uri(id: &str) -> TrackUri {
    format!("{}{}", TRACK_URI_PREFIX, id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// App-level token from the client-credentials grant, used for search.
    Client,
    /// User-delegated token from the authorization-code grant.
    User,
}

/// Bearer credential scoped to a single run. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    secret: String,
    kind: TokenKind,
}

impl AccessToken {
    pub fn client(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            kind: TokenKind::Client,
        }
    }

    pub fn user(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            kind: TokenKind::User,
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("kind", &self.kind)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistHandle {
    pub id: String,
    pub name: String,
}

// Wire shapes. Every field is optional so that a well-formed but incomplete
// body maps to "absent" instead of a decode error.

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub tracks: Option<Paging<ApiTrack>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiTrack {
    pub id: Option<String>,
    pub name: Option<String>,
    pub uri: Option<String>,
    #[serde(default)]
    pub artists: Vec<ApiArtist>,
}

impl ApiTrack {
    /// The id of a candidate whose name and primary artist are both present.
    pub fn verified_id(self) -> Option<CatalogTrackId> {
        let has_name = self.name.as_deref().is_some_and(|n| !n.is_empty());
        let has_artist = self
            .artists
            .first()
            .and_then(|a| a.name.as_deref())
            .is_some_and(|n| !n.is_empty());

        if has_name && has_artist {
            self.id.filter(|id| !id.is_empty())
        } else {
            None
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiArtist {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiUser {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiPlaylist {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiPlaylistItem {
    pub track: Option<ApiTrack>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreatePlaylistRequest<'a> {
    pub name: &'a str,
    pub public: bool,
    pub description: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct AddTracksRequest {
    pub uris: Vec<TrackUri>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RemoveTracksRequest<'a> {
    pub tracks: Vec<UriRef<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UriRef<'a> {
    pub uri: &'a str,
}
