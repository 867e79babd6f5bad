//! Relationship rows derived from resolved artists, albums and songs
//!
//! - artist–song: one row per resolved artist of each saved song
//! - artist–album: deduplicated across the whole batch
//! - similar song: one row per declaration, score clamped into [0, 1]

use songcat_common::Result;
use std::collections::{HashMap, HashSet};

use super::songs::SavedSong;
use crate::db::{Album, Artist, ArtistAlbum, ArtistSong, CatalogStore, SimilarSong};
use crate::models::{split_artist_names, AlbumKey, NormalizedSongRecord};

/// Relation rows of one batch, each list insertable in one write
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relationships {
    pub artist_songs: Vec<ArtistSong>,
    pub artist_albums: Vec<ArtistAlbum>,
    pub similar_songs: Vec<SimilarSong>,
}

/// Rows written per relation type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelationshipCounts {
    pub artist_songs: u64,
    pub artist_albums: u64,
    pub similar_songs: u64,
}

/// Clamp a declared similarity into [0, 1]; missing (or NaN) scores become 0
pub fn clamp_similarity(score: Option<f64>) -> f64 {
    match score {
        Some(value) if !value.is_nan() => value.clamp(0.0, 1.0),
        _ => 0.0,
    }
}

/// Derive relation rows for every saved song
///
/// Each saved song is tied to its record through `record_index`; unresolved
/// artist names and unresolved albums are skipped, not errors.
pub fn build_relationships(
    saved: &[SavedSong],
    records: &[NormalizedSongRecord],
    artists: &HashMap<String, Artist>,
    albums: &HashMap<AlbumKey, Album>,
    index_to_album_key: &[Option<AlbumKey>],
) -> Relationships {
    let mut relationships = Relationships::default();
    let mut linked_albums: HashSet<ArtistAlbum> = HashSet::new();

    for SavedSong { record_index, song } in saved {
        let Some(record) = records.get(*record_index) else {
            tracing::warn!(
                record_index,
                song_id = song.id,
                "Saved song refers to a record outside the batch; skipping its relations"
            );
            continue;
        };

        let mut song_artists: Vec<&Artist> = Vec::new();
        for name in split_artist_names(&record.artists) {
            if let Some(artist) = artists.get(name) {
                if !song_artists.iter().any(|seen| seen.id == artist.id) {
                    song_artists.push(artist);
                }
            }
        }

        for artist in &song_artists {
            relationships.artist_songs.push(ArtistSong {
                artist_id: artist.id,
                song_id: song.id,
            });
        }

        let album = index_to_album_key
            .get(*record_index)
            .and_then(Option::as_ref)
            .and_then(|key| albums.get(key));
        if let Some(album) = album {
            for artist in &song_artists {
                let link = ArtistAlbum {
                    artist_id: artist.id,
                    album_id: album.id,
                };
                if linked_albums.insert(link) {
                    relationships.artist_albums.push(link);
                }
            }
        }

        for similar in &record.similar_songs {
            relationships.similar_songs.push(SimilarSong {
                song_id: song.id,
                artist_name: similar.artist.trim().to_string(),
                title: similar.title.trim().to_string(),
                similarity: clamp_similarity(similar.score),
            });
        }
    }

    relationships
}

/// Bulk insert each relation list; an empty list makes no storage call
pub async fn persist_relationships<S>(store: &S, relationships: &Relationships) -> Result<RelationshipCounts>
where
    S: CatalogStore + ?Sized,
{
    let mut counts = RelationshipCounts::default();

    if !relationships.artist_songs.is_empty() {
        counts.artist_songs = store.insert_artist_songs(&relationships.artist_songs).await?;
    }
    if !relationships.artist_albums.is_empty() {
        counts.artist_albums = store.insert_artist_albums(&relationships.artist_albums).await?;
    }
    if !relationships.similar_songs.is_empty() {
        counts.similar_songs = store.insert_similar_songs(&relationships.similar_songs).await?;
    }

    Ok(counts)
}
