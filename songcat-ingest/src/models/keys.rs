//! Natural keys
//!
//! The batch context builder and the song reconciler must derive album keys
//! identically, otherwise songs silently lose their album. Both go through
//! `AlbumKey::for_record`, which is the only place the trim/join rules live.

use chrono::NaiveDate;
use std::fmt;

use super::record::NormalizedSongRecord;

/// Artist string used in album keys when a record names no artist at all
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Split a comma-joined artist string into trimmed, non-empty names
pub fn split_artist_names(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|name| !name.is_empty())
}

/// Canonical joined form of an artist string ("P ,Q," -> "P, Q")
pub fn joined_artist_names(raw: &str) -> String {
    let names: Vec<&str> = split_artist_names(raw).collect();
    if names.is_empty() {
        UNKNOWN_ARTIST.to_string()
    } else {
        names.join(", ")
    }
}

/// Trimmed album title, or `None` when missing or blank
pub fn normalize_album_title(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_string)
}

pub fn normalize_song_title(raw: &str) -> String {
    raw.trim().to_string()
}

/// Album natural key: (title, release date, joined artist names)
///
/// Field-wise equality; a `None` release date equals only another `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlbumKey {
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub artists: String,
}

impl AlbumKey {
    pub fn new(
        title: impl Into<String>,
        release_date: Option<NaiveDate>,
        artists: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            release_date,
            artists: artists.into(),
        }
    }

    /// Derive the album key of a record; `None` when the record has no album title
    pub fn for_record(record: &NormalizedSongRecord) -> Option<Self> {
        let title = normalize_album_title(record.album.as_deref())?;
        Some(Self {
            title,
            release_date: record.release_date,
            artists: joined_artist_names(&record.artists),
        })
    }
}

impl fmt::Display for AlbumKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.release_date {
            Some(date) => write!(f, "'{}' ({}) by {}", self.title, date, self.artists),
            None => write!(f, "'{}' (undated) by {}", self.title, self.artists),
        }
    }
}
