//! Database test utilities

use chrono::NaiveDate;
use songcat_ingest::models::{AudioFeatures, NormalizedSongRecord, SimilarSongDeclaration};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// In-memory catalog database with the full schema
///
/// Single connection, kept open for the whole test so the database survives.
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    songcat_common::db::create_catalog_schema(&pool)
        .await
        .expect("Schema initialization failed");
    pool
}

pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    let query = format!("SELECT COUNT(*) FROM {}", table);
    sqlx::query_scalar(&query)
        .fetch_one(pool)
        .await
        .unwrap_or_else(|e| panic!("Failed to count {}: {}", table, e))
}

/// Record with the given artists, album, release date (`YYYY-MM-DD`) and title
pub fn record(
    artists: &str,
    album: Option<&str>,
    release_date: Option<&str>,
    title: &str,
) -> NormalizedSongRecord {
    NormalizedSongRecord {
        artists: artists.to_string(),
        album: album.map(str::to_string),
        release_date: release_date
            .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").expect("bad test date")),
        title: title.to_string(),
        features: AudioFeatures::default(),
        similar_songs: Vec::new(),
    }
}

pub fn similar(artist: &str, title: &str, score: Option<f64>) -> SimilarSongDeclaration {
    SimilarSongDeclaration {
        artist: artist.to_string(),
        title: title.to_string(),
        score,
    }
}
