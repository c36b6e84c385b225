use lazy_regex::regex;
use serde::{Deserialize, Serialize};

/// One song suggested by the model, as `Artist, Title;` in its response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SongEntry {
    pub title: String,
    pub artist: String,
}

impl SongEntry {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }
}

/// Tolerant parser for `Artist, Title;Artist, Title;` model output.
#[derive(Debug, Default, Clone, Copy)]
pub struct SongExtractor;

impl SongExtractor {
    pub fn extract(&self, text: &str) -> Vec<SongEntry> {
        extract_songs(text)
    }
}

/// Extract every well-formed `artist, title;` entry from `text`.
///
/// Never fails: malformed entries are skipped. Only `;`-terminated entries
/// count, and an entry holding more than one comma is dropped rather than
/// split at the wrong comma.
pub fn extract_songs(text: &str) -> Vec<SongEntry> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let bytes = text.as_bytes();
    regex!(r"([^,;]+),([^,;]+);")
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            // A match that does not start an entry is the tail of a multi-comma entry
            if whole.start() > 0 && bytes[whole.start() - 1] != b';' {
                return None;
            }

            let artist = caps.get(1)?.as_str().trim();
            let title = caps.get(2)?.as_str().trim();
            if artist.is_empty() || title.is_empty() {
                return None;
            }

            Some(SongEntry::new(title, artist))
        })
        .collect()
}
