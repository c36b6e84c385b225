use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::catalog::{AccessToken, CatalogApi, CatalogTrackId, TrackUri, track_uri};
use crate::error::ReconcileError;
use crate::sync::report::ReconcileReport;

/// How the current playlist contents are converged to the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReconcileStrategy {
    /// Remove everything currently in the playlist, then add the whole target.
    #[default]
    FullReplace,
    /// Remove only tracks absent from the target, add only tracks not yet present.
    Minimal,
}

/// Find-or-create a playlist by name and converge its contents to a target
/// track list.
pub struct PlaylistReconciler<'a> {
    catalog: &'a dyn CatalogApi,
    strategy: ReconcileStrategy,
}

impl<'a> PlaylistReconciler<'a> {
    pub fn new(catalog: &'a dyn CatalogApi) -> Self {
        Self {
            catalog,
            strategy: ReconcileStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: ReconcileStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// After success the playlist holds exactly the tracks in `targets`,
    /// duplicates included, whatever it held before. `FullReplace` also keeps
    /// the target order; `Minimal` leaves untouched tracks where they were. A failed user lookup or playlist creation aborts before any
    /// track is added or removed.
    pub async fn reconcile(
        &self,
        playlist_name: &str,
        targets: &[CatalogTrackId],
        user_token: &AccessToken,
    ) -> Result<ReconcileReport, ReconcileError> {
        let user_id = self
            .catalog
            .current_user_id(user_token)
            .await?
            .ok_or(ReconcileError::MissingUserId)?;
        debug!("Reconciling '{}' for user {}", playlist_name, user_id);

        let (playlist, created, current) =
            match self.catalog.find_playlist_by_name(playlist_name, user_token).await? {
                Some(playlist) => {
                    info!(
                        "Playlist '{}' found. Replacing its tracks.",
                        playlist_name
                    );
                    let current = self
                        .catalog
                        .playlist_track_uris(&playlist.id, user_token)
                        .await?;
                    (playlist, false, current)
                }
                None => {
                    info!("Playlist '{}' not found. Creating new playlist.", playlist_name);
                    let playlist = self
                        .catalog
                        .create_playlist(playlist_name, user_token, &user_id)
                        .await?
                        .ok_or_else(|| ReconcileError::CreateFailed(playlist_name.to_string()))?;
                    (playlist, true, Vec::new())
                }
            };

        let (to_remove, to_add) = match self.strategy {
            ReconcileStrategy::FullReplace => (current, targets.to_vec()),
            ReconcileStrategy::Minimal => minimal_changes(&current, targets),
        };

        if !to_remove.is_empty() {
            self.catalog
                .remove_tracks(&playlist.id, &to_remove, user_token)
                .await?;
            info!(
                "Removed {} existing tracks from playlist '{}'.",
                to_remove.len(),
                playlist_name
            );
        } else if !created {
            info!("Nothing to remove from playlist '{}'.", playlist_name);
        }

        let empty_target = targets.is_empty();
        if empty_target {
            warn!("No tracks provided to add to playlist '{}'.", playlist_name);
        } else if !to_add.is_empty() {
            self.catalog
                .add_tracks(&playlist.id, &to_add, user_token)
                .await?;
            info!("Added {} tracks to playlist '{}'.", to_add.len(), playlist_name);
        }

        Ok(ReconcileReport {
            playlist,
            created,
            removed: to_remove.len(),
            added: to_add.len(),
            empty_target,
        })
    }
}

/// Multiset difference between the current URIs and the target ids.
///
/// Removing a URI drops every copy of it from the playlist, so a URI held
/// more often than the target wants is removed outright and re-added the
/// wanted number of times.
fn minimal_changes(
    current: &[TrackUri],
    targets: &[CatalogTrackId],
) -> (Vec<TrackUri>, Vec<CatalogTrackId>) {
    let mut wanted: HashMap<TrackUri, usize> = HashMap::new();
    for id in targets {
        *wanted.entry(track_uri(id)).or_default() += 1;
    }

    let mut present: HashMap<&str, usize> = HashMap::new();
    for uri in current {
        *present.entry(uri.as_str()).or_default() += 1;
    }

    let surplus: HashSet<&str> = present
        .iter()
        .filter(|(uri, have)| **have > wanted.get(**uri).copied().unwrap_or(0))
        .map(|(uri, _)| *uri)
        .collect();

    let mut to_remove: Vec<TrackUri> = Vec::new();
    for uri in current {
        if surplus.contains(uri.as_str()) && !to_remove.contains(uri) {
            to_remove.push(uri.clone());
        }
    }

    let mut kept: HashMap<&str, usize> = present
        .into_iter()
        .filter(|(uri, _)| !surplus.contains(uri))
        .collect();

    let mut to_add = Vec::new();
    for id in targets {
        match kept.get_mut(track_uri(id).as_str()) {
            Some(left) if *left > 0 => *left -= 1,
            _ => to_add.push(id.clone()),
        }
    }

    (to_remove, to_add)
}
