//! Transaction-backed catalog store
//!
//! All gateway calls of one batch run on the same SQLite transaction. The
//! transaction sits behind an async mutex, so reconcilers may be driven
//! concurrently (`tokio::try_join!`); their statements simply take turns on
//! the connection. Nothing is visible to other connections until `commit`.

use async_trait::async_trait;
use songcat_common::Result;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::time::Instant;
use tokio::sync::Mutex;

use super::{
    albums, artists, relations, songs, Album, Artist, ArtistAlbum, ArtistSong, CatalogStore,
    NewSong, SimilarSong, Song,
};
use crate::models::AlbumKey;

/// `CatalogStore` over one open SQLite transaction
///
/// Dropping the store without calling `commit` rolls the transaction back.
pub struct SqliteCatalogStore {
    tx: Mutex<Transaction<'static, Sqlite>>,
    opened_at: Instant,
}

impl SqliteCatalogStore {
    /// Begin a transaction on a pooled connection
    pub async fn begin(pool: &SqlitePool) -> Result<Self> {
        tracing::debug!("Connection acquisition requested");
        let tx = pool.begin().await?;

        Ok(Self {
            tx: Mutex::new(tx),
            opened_at: Instant::now(),
        })
    }

    /// Commit every write made through this store
    pub async fn commit(self) -> Result<()> {
        let held_ms = self.opened_at.elapsed().as_millis();
        self.tx.into_inner().commit().await?;

        if held_ms > 1000 {
            tracing::warn!(held_ms, "Catalog transaction held longer than expected (>1s)");
        } else {
            tracing::debug!(held_ms, "Catalog transaction committed");
        }
        Ok(())
    }

    /// Discard every write made through this store
    pub async fn rollback(self) -> Result<()> {
        self.tx.into_inner().rollback().await?;
        tracing::debug!("Catalog transaction rolled back");
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalogStore {
    async fn insert_artists(&self, names: &[String]) -> Result<u64> {
        let mut tx = self.tx.lock().await;
        artists::insert_artists(&mut **tx, names).await
    }

    async fn find_artists_by_names(&self, names: &[String]) -> Result<Vec<Artist>> {
        let mut tx = self.tx.lock().await;
        artists::find_artists_by_names(&mut **tx, names).await
    }

    async fn insert_albums(&self, keys: &[AlbumKey]) -> Result<u64> {
        let mut tx = self.tx.lock().await;
        albums::insert_albums(&mut **tx, keys).await
    }

    async fn find_albums_by_titles(&self, titles: &[String]) -> Result<Vec<Album>> {
        let mut tx = self.tx.lock().await;
        albums::find_albums_by_titles(&mut **tx, titles).await
    }

    async fn insert_songs(&self, songs: &[NewSong]) -> Result<u64> {
        let mut tx = self.tx.lock().await;
        songs::insert_songs(&mut **tx, songs).await
    }

    async fn find_songs_by_titles(&self, titles: &[String]) -> Result<Vec<Song>> {
        let mut tx = self.tx.lock().await;
        songs::find_songs_by_titles(&mut **tx, titles).await
    }

    async fn insert_artist_songs(&self, rows: &[ArtistSong]) -> Result<u64> {
        let mut tx = self.tx.lock().await;
        relations::insert_artist_songs(&mut **tx, rows).await
    }

    async fn insert_artist_albums(&self, rows: &[ArtistAlbum]) -> Result<u64> {
        let mut tx = self.tx.lock().await;
        relations::insert_artist_albums(&mut **tx, rows).await
    }

    async fn insert_similar_songs(&self, rows: &[SimilarSong]) -> Result<u64> {
        let mut tx = self.tx.lock().await;
        relations::insert_similar_songs(&mut **tx, rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        songcat_common::db::create_catalog_schema(&pool)
            .await
            .expect("Schema initialization failed");
        pool
    }

    async fn artist_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM artists")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_commit_makes_writes_visible() {
        let pool = test_pool().await;

        let store = SqliteCatalogStore::begin(&pool).await.unwrap();
        store.insert_artists(&["P".to_string()]).await.unwrap();
        store.commit().await.unwrap();

        assert_eq!(artist_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() {
        let pool = test_pool().await;

        let store = SqliteCatalogStore::begin(&pool).await.unwrap();
        store.insert_artists(&["P".to_string()]).await.unwrap();
        store.rollback().await.unwrap();

        assert_eq!(artist_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_drop_without_commit_discards_writes() {
        let pool = test_pool().await;

        {
            let store = SqliteCatalogStore::begin(&pool).await.unwrap();
            store.insert_artists(&["P".to_string()]).await.unwrap();
        }

        assert_eq!(artist_count(&pool).await, 0);
    }
}
