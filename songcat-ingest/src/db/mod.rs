//! Catalog storage gateway
//!
//! `CatalogStore` is the only way the reconcilers touch storage: one bulk
//! insert and one natural-key-set read per entity type, and one bulk insert
//! per relation type. `SqliteCatalogStore` runs all of them inside a single
//! transaction so a batch commits or aborts as a unit.

pub mod albums;
pub mod artists;
pub mod relations;
pub mod songs;
pub mod store;

pub use albums::Album;
pub use artists::Artist;
pub use relations::{ArtistAlbum, ArtistSong, SimilarSong};
pub use songs::{NewSong, Song};
pub use store::SqliteCatalogStore;

use async_trait::async_trait;
use songcat_common::Result;

use crate::models::AlbumKey;

/// SQLite's default SQLITE_MAX_VARIABLE_NUMBER (3.32+)
pub const MAX_BIND_PARAMS: usize = 32_766;

/// Rows that fit in one statement given the bound parameters per row
pub(crate) fn rows_per_statement(binds_per_row: usize) -> usize {
    (MAX_BIND_PARAMS / binds_per_row.max(1)).max(1)
}

/// Storage gateway used by the reconcilers
///
/// Inserts return the number of rows actually written. Natural-key conflicts
/// are ignored rather than reported, so an insert may write fewer rows than
/// it was given.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Insert artists by name, ignoring names that already exist
    async fn insert_artists(&self, names: &[String]) -> Result<u64>;

    async fn find_artists_by_names(&self, names: &[String]) -> Result<Vec<Artist>>;

    /// Insert one album per key, ignoring keys that already exist
    async fn insert_albums(&self, keys: &[AlbumKey]) -> Result<u64>;

    async fn find_albums_by_titles(&self, titles: &[String]) -> Result<Vec<Album>>;

    async fn insert_songs(&self, songs: &[NewSong]) -> Result<u64>;

    /// Songs whose title is in `titles`, in ascending id order
    async fn find_songs_by_titles(&self, titles: &[String]) -> Result<Vec<Song>>;

    async fn insert_artist_songs(&self, rows: &[ArtistSong]) -> Result<u64>;

    async fn insert_artist_albums(&self, rows: &[ArtistAlbum]) -> Result<u64>;

    async fn insert_similar_songs(&self, rows: &[SimilarSong]) -> Result<u64>;
}
