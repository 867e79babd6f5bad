//! Normalized catalog records
//!
//! One `NormalizedSongRecord` per catalog entry. Dates and numeric fields are
//! already typed; anything the supplier could not make sense of is `None`.

use chrono::NaiveDate;

/// One catalog entry, ready for reconciliation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedSongRecord {
    /// Artist names as a single comma-joined string ("P, Q")
    pub artists: String,
    /// Album title (may be missing or blank)
    pub album: Option<String>,
    /// Album release date
    pub release_date: Option<NaiveDate>,
    /// Song title
    pub title: String,
    pub features: AudioFeatures,
    /// Declared similar songs, kept as free text
    pub similar_songs: Vec<SimilarSongDeclaration>,
}

/// Audio-feature scalars carried onto the songs row
#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct AudioFeatures {
    pub genre: Option<String>,
    pub emotion: Option<String>,
    pub musical_key: Option<String>,
    pub time_signature: Option<String>,
    pub duration_ms: Option<i64>,
    pub tempo: Option<f64>,
    pub loudness_db: Option<f64>,
    pub explicit: Option<bool>,
    pub popularity: Option<i64>,
    pub energy: Option<f64>,
    pub danceability: Option<f64>,
    pub positiveness: Option<f64>,
    pub speechiness: Option<f64>,
    pub liveness: Option<f64>,
    pub acousticness: Option<f64>,
    pub instrumentalness: Option<f64>,
}

/// "Songs like this one", as declared by the catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimilarSongDeclaration {
    pub artist: String,
    pub title: String,
    /// Raw similarity; clamped into [0, 1] when the relation row is built
    pub score: Option<f64>,
}
