//! Song reconciliation
//!
//! Every record becomes exactly one prepared song row, album resolved or not.
//! After the bulk insert the rows are reloaded by title and matched back on
//! `(album_id, title)`. Each prepared row keeps the index of its record, so a
//! row that fails to match back is dropped without shifting any other song
//! onto the wrong record.

use songcat_common::Result;
use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::db::{Album, CatalogStore, NewSong, Song};
use crate::models::{normalize_song_title, AlbumKey, NormalizedSongRecord};

/// A stored song and the record it came from
#[derive(Debug, Clone, PartialEq)]
pub struct SavedSong {
    pub record_index: usize,
    pub song: Song,
}

/// Outcome of song reconciliation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SongReconciliation {
    /// Successfully reloaded songs, in record order
    pub saved: Vec<SavedSong>,
    /// One entry per input record: the album key it resolved to, if any
    pub index_to_album_key: Vec<Option<AlbumKey>>,
    /// Prepared rows that could not be matched back after insert
    pub dropped: usize,
}

type ReloadKey = (Option<i64>, String);

/// Map each record to a song row and record its album key
///
/// The index map gets an entry for every record, `None` when the record has
/// no album title or its album did not resolve.
pub fn prepare_songs(
    records: &[NormalizedSongRecord],
    albums: &HashMap<AlbumKey, Album>,
) -> (Vec<NewSong>, Vec<Option<AlbumKey>>) {
    let mut prepared = Vec::with_capacity(records.len());
    let mut index_to_album_key = Vec::with_capacity(records.len());

    for (record_index, record) in records.iter().enumerate() {
        let key = AlbumKey::for_record(record);
        let album_id = key.as_ref().and_then(|k| albums.get(k)).map(|album| album.id);

        prepared.push(NewSong {
            record_index,
            title: normalize_song_title(&record.title),
            album_id,
            features: record.features.clone(),
        });
        index_to_album_key.push(key.filter(|_| album_id.is_some()));
    }

    (prepared, index_to_album_key)
}

pub async fn reconcile_songs<S>(
    store: &S,
    records: &[NormalizedSongRecord],
    albums: &HashMap<AlbumKey, Album>,
) -> Result<SongReconciliation>
where
    S: CatalogStore + ?Sized,
{
    if records.is_empty() {
        return Ok(SongReconciliation::default());
    }

    let (prepared, index_to_album_key) = prepare_songs(records, albums);

    let inserted = store.insert_songs(&prepared).await?;

    let titles: Vec<String> = prepared
        .iter()
        .map(|song| song.title.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let reloaded = store.find_songs_by_titles(&titles).await?;

    let (saved, dropped) = match_reloaded(prepared, reloaded);

    tracing::debug!(
        records = records.len(),
        inserted,
        saved = saved.len(),
        dropped,
        "Songs reconciled"
    );

    Ok(SongReconciliation {
        saved,
        index_to_album_key,
        dropped,
    })
}

/// Match prepared rows back to reloaded rows on `(album_id, title)`
///
/// The reload also returns songs stored by earlier batches under the same
/// key. When `k` prepared rows share a key, the `k` newest reloaded rows are
/// this batch's insert and are handed out oldest-first in record order.
/// Prepared rows left without a candidate are dropped with a warning.
fn match_reloaded(prepared: Vec<NewSong>, mut reloaded: Vec<Song>) -> (Vec<SavedSong>, usize) {
    let mut demand: HashMap<ReloadKey, usize> = HashMap::new();
    for song in &prepared {
        *demand.entry((song.album_id, song.title.clone())).or_default() += 1;
    }

    reloaded.sort_by_key(|song| song.id);
    let mut candidates: HashMap<ReloadKey, Vec<Song>> = HashMap::new();
    for song in reloaded {
        let key = (song.album_id, song.title.clone());
        if demand.contains_key(&key) {
            candidates.entry(key).or_default().push(song);
        }
    }

    let mut claimable: HashMap<ReloadKey, VecDeque<Song>> = candidates
        .into_iter()
        .map(|(key, mut rows)| {
            let wanted = demand.get(&key).copied().unwrap_or(0);
            let newest = rows.split_off(rows.len().saturating_sub(wanted));
            (key, VecDeque::from(newest))
        })
        .collect();

    let mut saved = Vec::with_capacity(prepared.len());
    let mut dropped = 0;

    for song in prepared {
        let key = (song.album_id, song.title);
        match claimable.get_mut(&key).and_then(VecDeque::pop_front) {
            Some(stored) => saved.push(SavedSong {
                record_index: song.record_index,
                song: stored,
            }),
            None => {
                dropped += 1;
                tracing::warn!(
                    record_index = song.record_index,
                    title = %key.1,
                    album_id = ?key.0,
                    "Inserted song could not be matched after reload; dropping it"
                );
            }
        }
    }

    (saved, dropped)
}
