use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogTrackId, PlaylistHandle};
use crate::extractor::SongEntry;

/// What a single reconciliation did to the remote playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub playlist: PlaylistHandle,
    pub created: bool,
    pub removed: usize,
    pub added: usize,
    pub empty_target: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub playlist_name: String,
    pub songs: Vec<SongEntry>,
    pub matched_track_ids: Vec<CatalogTrackId>,
    pub unmatched: Vec<SongEntry>,
    pub match_rate: f64,
    pub reconcile: Option<ReconcileReport>,
}

impl SyncReport {
    pub fn new(playlist_name: String, songs: Vec<SongEntry>) -> Self {
        Self {
            playlist_name,
            songs,
            matched_track_ids: Vec::new(),
            unmatched: Vec::new(),
            match_rate: 0.0,
            reconcile: None,
        }
    }

    pub fn calculate_match_rate(&mut self) {
        if !self.songs.is_empty() {
            self.match_rate =
                (self.matched_track_ids.len() as f64 / self.songs.len() as f64) * 100.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_rate() {
        let mut report = SyncReport::new(
            "MyDailyTrain".to_string(),
            vec![
                SongEntry::new("Song1", "Artist1"),
                SongEntry::new("Song2", "Artist2"),
                SongEntry::new("Song3", "Artist3"),
                SongEntry::new("Song4", "Artist4"),
            ],
        );
        report.matched_track_ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        report.calculate_match_rate();

        assert!((report.match_rate - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_match_rate_without_songs_is_zero() {
        let mut report = SyncReport::new("Empty".to_string(), Vec::new());
        report.calculate_match_rate();
        assert_eq!(report.match_rate, 0.0);
    }
}
