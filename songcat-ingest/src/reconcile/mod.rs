//! Batch reconciliation and deduplication
//!
//! Stages, leaf first:
//! - `context`: distinct artist names and album keys of the batch (no storage)
//! - `artists` / `albums`: resolve natural keys to stored rows (independent)
//! - `songs`: one song row per record, needs the album map
//! - `relationships`: artist–song, artist–album and similar-song rows
//!
//! All state here lives for one batch only.

pub mod albums;
pub mod artists;
pub mod context;
pub mod relationships;
pub mod songs;

pub use albums::reconcile_albums;
pub use artists::reconcile_artists;
pub use context::{flatten_album_groups, AlbumGroups, BatchContext};
pub use relationships::{
    build_relationships, clamp_similarity, persist_relationships, RelationshipCounts,
    Relationships,
};
pub use songs::{prepare_songs, reconcile_songs, SavedSong, SongReconciliation};
