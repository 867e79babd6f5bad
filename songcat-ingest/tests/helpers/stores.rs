//! `CatalogStore` wrappers for observing and disturbing the reconcilers

use async_trait::async_trait;
use songcat_common::{Error, Result};
use songcat_ingest::db::{
    Album, Artist, ArtistAlbum, ArtistSong, CatalogStore, NewSong, SimilarSong, Song,
};
use songcat_ingest::models::AlbumKey;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Records every gateway call by name before delegating
pub struct CountingStore<S> {
    inner: S,
    calls: Mutex<Vec<&'static str>>,
    album_keys_inserted: AtomicUsize,
}

impl<S: CatalogStore> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            album_keys_inserted: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls().iter().filter(|call| **call == name).count()
    }

    /// Album keys handed to `insert_albums`, summed over calls
    pub fn album_keys_inserted(&self) -> usize {
        self.album_keys_inserted.load(Ordering::SeqCst)
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn record(&self, name: &'static str) {
        self.calls.lock().unwrap().push(name);
    }
}

#[async_trait]
impl<S: CatalogStore> CatalogStore for CountingStore<S> {
    async fn insert_artists(&self, names: &[String]) -> Result<u64> {
        self.record("insert_artists");
        self.inner.insert_artists(names).await
    }

    async fn find_artists_by_names(&self, names: &[String]) -> Result<Vec<Artist>> {
        self.record("find_artists_by_names");
        self.inner.find_artists_by_names(names).await
    }

    async fn insert_albums(&self, keys: &[AlbumKey]) -> Result<u64> {
        self.record("insert_albums");
        self.album_keys_inserted.fetch_add(keys.len(), Ordering::SeqCst);
        self.inner.insert_albums(keys).await
    }

    async fn find_albums_by_titles(&self, titles: &[String]) -> Result<Vec<Album>> {
        self.record("find_albums_by_titles");
        self.inner.find_albums_by_titles(titles).await
    }

    async fn insert_songs(&self, songs: &[NewSong]) -> Result<u64> {
        self.record("insert_songs");
        self.inner.insert_songs(songs).await
    }

    async fn find_songs_by_titles(&self, titles: &[String]) -> Result<Vec<Song>> {
        self.record("find_songs_by_titles");
        self.inner.find_songs_by_titles(titles).await
    }

    async fn insert_artist_songs(&self, rows: &[ArtistSong]) -> Result<u64> {
        self.record("insert_artist_songs");
        self.inner.insert_artist_songs(rows).await
    }

    async fn insert_artist_albums(&self, rows: &[ArtistAlbum]) -> Result<u64> {
        self.record("insert_artist_albums");
        self.inner.insert_artist_albums(rows).await
    }

    async fn insert_similar_songs(&self, rows: &[SimilarSong]) -> Result<u64> {
        self.record("insert_similar_songs");
        self.inner.insert_similar_songs(rows).await
    }
}

/// Hides reloaded songs with the given title, as if the read lost them
pub struct LossyStore<S> {
    inner: S,
    lost_title: String,
}

impl<S: CatalogStore> LossyStore<S> {
    pub fn new(inner: S, lost_title: &str) -> Self {
        Self {
            inner,
            lost_title: lost_title.to_string(),
        }
    }
}

#[async_trait]
impl<S: CatalogStore> CatalogStore for LossyStore<S> {
    async fn insert_artists(&self, names: &[String]) -> Result<u64> {
        self.inner.insert_artists(names).await
    }

    async fn find_artists_by_names(&self, names: &[String]) -> Result<Vec<Artist>> {
        self.inner.find_artists_by_names(names).await
    }

    async fn insert_albums(&self, keys: &[AlbumKey]) -> Result<u64> {
        self.inner.insert_albums(keys).await
    }

    async fn find_albums_by_titles(&self, titles: &[String]) -> Result<Vec<Album>> {
        self.inner.find_albums_by_titles(titles).await
    }

    async fn insert_songs(&self, songs: &[NewSong]) -> Result<u64> {
        self.inner.insert_songs(songs).await
    }

    async fn find_songs_by_titles(&self, titles: &[String]) -> Result<Vec<Song>> {
        let mut songs = self.inner.find_songs_by_titles(titles).await?;
        songs.retain(|song| song.title != self.lost_title);
        Ok(songs)
    }

    async fn insert_artist_songs(&self, rows: &[ArtistSong]) -> Result<u64> {
        self.inner.insert_artist_songs(rows).await
    }

    async fn insert_artist_albums(&self, rows: &[ArtistAlbum]) -> Result<u64> {
        self.inner.insert_artist_albums(rows).await
    }

    async fn insert_similar_songs(&self, rows: &[SimilarSong]) -> Result<u64> {
        self.inner.insert_similar_songs(rows).await
    }
}

/// Fails the last write of the pipeline (similar songs)
pub struct FailingStore<S> {
    inner: S,
}

impl<S: CatalogStore> FailingStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait]
impl<S: CatalogStore> CatalogStore for FailingStore<S> {
    async fn insert_artists(&self, names: &[String]) -> Result<u64> {
        self.inner.insert_artists(names).await
    }

    async fn find_artists_by_names(&self, names: &[String]) -> Result<Vec<Artist>> {
        self.inner.find_artists_by_names(names).await
    }

    async fn insert_albums(&self, keys: &[AlbumKey]) -> Result<u64> {
        self.inner.insert_albums(keys).await
    }

    async fn find_albums_by_titles(&self, titles: &[String]) -> Result<Vec<Album>> {
        self.inner.find_albums_by_titles(titles).await
    }

    async fn insert_songs(&self, songs: &[NewSong]) -> Result<u64> {
        self.inner.insert_songs(songs).await
    }

    async fn find_songs_by_titles(&self, titles: &[String]) -> Result<Vec<Song>> {
        self.inner.find_songs_by_titles(titles).await
    }

    async fn insert_artist_songs(&self, rows: &[ArtistSong]) -> Result<u64> {
        self.inner.insert_artist_songs(rows).await
    }

    async fn insert_artist_albums(&self, rows: &[ArtistAlbum]) -> Result<u64> {
        self.inner.insert_artist_albums(rows).await
    }

    async fn insert_similar_songs(&self, _rows: &[SimilarSong]) -> Result<u64> {
        Err(Error::Database(sqlx::Error::Protocol(
            "similar_songs write failed".to_string(),
        )))
    }
}
