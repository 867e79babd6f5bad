//! Batch context: the dedup sets a batch needs before touching storage
//!
//! Pure fold over the records. A record without an album title simply
//! contributes nothing to album dedup.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{split_artist_names, AlbumKey, NormalizedSongRecord};

/// Album title → distinct (release date, joined artists) pairs seen under it
pub type AlbumGroups = BTreeMap<String, BTreeSet<(Option<NaiveDate>, String)>>;

/// Distinct natural keys of one batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchContext {
    pub artist_names: BTreeSet<String>,
    pub album_groups: AlbumGroups,
}

impl BatchContext {
    pub fn from_records(records: &[NormalizedSongRecord]) -> Self {
        let mut context = Self::default();

        for record in records {
            context
                .artist_names
                .extend(split_artist_names(&record.artists).map(str::to_string));

            if let Some(key) = AlbumKey::for_record(record) {
                context
                    .album_groups
                    .entry(key.title)
                    .or_default()
                    .insert((key.release_date, key.artists));
            }
        }

        context
    }

    /// Number of distinct album keys across all titles
    pub fn album_key_count(&self) -> usize {
        self.album_groups.values().map(BTreeSet::len).sum()
    }
}

/// Expand album groups back into full keys, ordered by title then group
pub fn flatten_album_groups(groups: &AlbumGroups) -> Vec<AlbumKey> {
    groups
        .iter()
        .flat_map(|(title, pairs)| {
            pairs
                .iter()
                .map(move |(date, artists)| AlbumKey::new(title.clone(), *date, artists.clone()))
        })
        .collect()
}
