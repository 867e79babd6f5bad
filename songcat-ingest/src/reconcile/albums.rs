//! Album reconciliation
//!
//! **Algorithm:**
//! 1. Read every album carrying one of the requested titles
//! 2. Partition the requested keys into found / missing
//! 3. If anything is missing: one bulk insert of exactly the missing keys,
//!    then re-read by title and keep only rows whose key was requested
//! 4. Return found + reloaded as `AlbumKey -> Album`

use songcat_common::Result;
use std::collections::{HashMap, HashSet};

use super::context::{flatten_album_groups, AlbumGroups};
use crate::db::{Album, CatalogStore};
use crate::models::AlbumKey;

pub async fn reconcile_albums<S>(store: &S, groups: &AlbumGroups) -> Result<HashMap<AlbumKey, Album>>
where
    S: CatalogStore + ?Sized,
{
    let requested = flatten_album_groups(groups);
    if requested.is_empty() {
        return Ok(HashMap::new());
    }

    let titles: Vec<String> = groups.keys().cloned().collect();
    let wanted: HashSet<&AlbumKey> = requested.iter().collect();

    let mut resolved = index_requested(store.find_albums_by_titles(&titles).await?, &wanted);

    let missing: Vec<AlbumKey> = requested
        .iter()
        .filter(|key| !resolved.contains_key(*key))
        .cloned()
        .collect();

    if missing.is_empty() {
        tracing::debug!(requested = requested.len(), "All albums already stored");
        return Ok(resolved);
    }

    let inserted = store.insert_albums(&missing).await?;

    // Same titles may now also match rows other batches inserted concurrently;
    // only requested keys are taken.
    for (key, album) in index_requested(store.find_albums_by_titles(&titles).await?, &wanted) {
        resolved.entry(key).or_insert(album);
    }

    tracing::debug!(
        requested = requested.len(),
        missing = missing.len(),
        inserted,
        resolved = resolved.len(),
        "Albums reconciled"
    );

    Ok(resolved)
}

/// Key rows by natural key, dropping rows nobody asked for (first row wins)
fn index_requested(albums: Vec<Album>, wanted: &HashSet<&AlbumKey>) -> HashMap<AlbumKey, Album> {
    let mut index = HashMap::with_capacity(albums.len());
    for album in albums {
        let key = album.key();
        if wanted.contains(&key) {
            index.entry(key).or_insert(album);
        }
    }
    index
}
