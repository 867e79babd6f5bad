//! Data models for the catalog ingest pipeline
//!
//! - `record`: normalized input records handed over by the supplier
//! - `keys`: natural keys and the one normalization routine every stage shares

pub mod keys;
pub mod record;

pub use keys::{
    joined_artist_names, normalize_album_title, normalize_song_title, split_artist_names,
    AlbumKey, UNKNOWN_ARTIST,
};
pub use record::{AudioFeatures, NormalizedSongRecord, SimilarSongDeclaration};
