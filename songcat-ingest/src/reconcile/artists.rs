//! Artist reconciliation: insert missing, then reload

use songcat_common::Result;
use std::collections::{BTreeSet, HashMap};

use crate::db::{Artist, CatalogStore};

/// Resolve artist names to persisted rows
///
/// One bulk "insert if absent" followed by one read. Empty input touches no storage.
pub async fn reconcile_artists<S>(store: &S, names: &BTreeSet<String>) -> Result<HashMap<String, Artist>>
where
    S: CatalogStore + ?Sized,
{
    if names.is_empty() {
        return Ok(HashMap::new());
    }

    let names: Vec<String> = names.iter().cloned().collect();

    let inserted = store.insert_artists(&names).await?;
    let artists = store.find_artists_by_names(&names).await?;

    tracing::debug!(
        requested = names.len(),
        inserted,
        resolved = artists.len(),
        "Artists reconciled"
    );

    Ok(artists
        .into_iter()
        .map(|artist| (artist.name.clone(), artist))
        .collect())
}
