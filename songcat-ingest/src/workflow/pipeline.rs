//! Batch pipeline
//!
//! # Architecture
//! - **Stage 0**: Batch context (distinct artist names, album groups)
//! - **Stage 1**: Artists ∥ albums (`tokio::try_join!`)
//! - **Stage 2**: Songs (needs the album map)
//! - **Stage 3**: Relationship rows, then one bulk insert per relation type
//!
//! # Error Handling
//! - Any storage error aborts the batch and is returned unchanged
//! - `ingest_batch` rolls back on error: a batch commits fully or not at all
//! - No retries at this layer

use songcat_common::Result;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::statistics::BatchStats;
use crate::db::{Album, Artist, CatalogStore, SqliteCatalogStore};
use crate::models::{AlbumKey, NormalizedSongRecord};
use crate::reconcile::{
    build_relationships, persist_relationships, reconcile_albums, reconcile_artists,
    reconcile_songs, BatchContext, Relationships, SavedSong,
};

/// Everything one batch resolved and wrote
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub artists: HashMap<String, Artist>,
    pub albums: HashMap<AlbumKey, Album>,
    pub songs: Vec<SavedSong>,
    /// One entry per input record
    pub index_to_album_key: Vec<Option<AlbumKey>>,
    pub relationships: Relationships,
    pub stats: BatchStats,
}

/// Run every reconciliation stage of one batch against `store`
///
/// Does not commit; the caller owns the unit of work.
pub async fn reconcile_batch<S>(store: &S, records: &[NormalizedSongRecord]) -> Result<BatchOutcome>
where
    S: CatalogStore + ?Sized,
{
    let context = BatchContext::from_records(records);
    debug!(
        records = records.len(),
        artist_names = context.artist_names.len(),
        album_keys = context.album_key_count(),
        "Batch context built"
    );

    let (artists, albums) = tokio::try_join!(
        reconcile_artists(store, &context.artist_names),
        reconcile_albums(store, &context.album_groups),
    )?;

    let songs = reconcile_songs(store, records, &albums).await?;

    let relationships = build_relationships(
        &songs.saved,
        records,
        &artists,
        &albums,
        &songs.index_to_album_key,
    );
    let counts = persist_relationships(store, &relationships).await?;

    let stats = BatchStats {
        records: records.len(),
        artists_resolved: artists.len(),
        albums_resolved: albums.len(),
        songs_saved: songs.saved.len(),
        songs_dropped: songs.dropped,
        artist_songs: counts.artist_songs,
        artist_albums: counts.artist_albums,
        similar_songs: counts.similar_songs,
    };

    Ok(BatchOutcome {
        artists,
        albums,
        songs: songs.saved,
        index_to_album_key: songs.index_to_album_key,
        relationships,
        stats,
    })
}

/// Reconcile one batch inside a single transaction
///
/// Commits on success. On error the transaction is rolled back and the
/// original error is returned.
pub async fn ingest_batch(pool: &SqlitePool, records: &[NormalizedSongRecord]) -> Result<BatchOutcome> {
    let batch_id = Uuid::new_v4();

    if records.is_empty() {
        debug!(batch_id = %batch_id, "Empty batch, nothing to reconcile");
        return Ok(BatchOutcome::default());
    }

    let store = SqliteCatalogStore::begin(pool).await?;

    match reconcile_batch(&store, records).await {
        Ok(outcome) => {
            store.commit().await?;

            if outcome.stats.songs_dropped > 0 {
                warn!(
                    batch_id = %batch_id,
                    songs_dropped = outcome.stats.songs_dropped,
                    "Batch committed with songs lost during reload"
                );
            }
            info!(batch_id = %batch_id, "Batch committed: {}", outcome.stats.display_string());

            Ok(outcome)
        }
        Err(err) => {
            warn!(batch_id = %batch_id, error = %err, "Batch failed, rolling back");
            if let Err(rollback_err) = store.rollback().await {
                warn!(batch_id = %batch_id, error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}
