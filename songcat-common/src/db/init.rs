//! Database initialization
//!
//! Opens (or creates) the catalog database and provisions the normalized
//! artist / album / song model plus its relation tables. Every statement is
//! idempotent, so opening an existing database is safe.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Busy timeout applied to every pooled connection
const BUSY_TIMEOUT_MS: u64 = 5000;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path, max_connections: u32) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_catalog_schema(&pool).await?;

    Ok(pool)
}

/// Create every catalog table and index (idempotent)
pub async fn create_catalog_schema(pool: &SqlitePool) -> Result<()> {
    create_artists_table(pool).await?;
    create_albums_table(pool).await?;
    create_songs_table(pool).await?;

    // Linking tables
    create_artist_songs_table(pool).await?;
    create_artist_albums_table(pool).await?;
    create_similar_songs_table(pool).await?;

    Ok(())
}

/// Create the artists table
///
/// Natural key: `name` (already trimmed by the ingest normalization).
pub async fn create_artists_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS artists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the albums table
///
/// Natural key: `(title, release_date, artists)`. A plain UNIQUE constraint
/// would treat NULL release dates as distinct, so the key is enforced by an
/// expression index that folds NULL to the empty string.
pub async fn create_albums_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS albums (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            release_date TEXT,
            artists TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_albums_natural_key
        ON albums (title, IFNULL(release_date, ''), artists)
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the songs table
pub async fn create_songs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            album_id INTEGER REFERENCES albums(id),
            genre TEXT,
            emotion TEXT,
            musical_key TEXT,
            time_signature TEXT,
            duration_ms INTEGER,
            tempo REAL,
            loudness_db REAL,
            explicit INTEGER,
            popularity INTEGER,
            energy REAL,
            danceability REAL,
            positiveness REAL,
            speechiness REAL,
            liveness REAL,
            acousticness REAL,
            instrumentalness REAL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_songs_title ON songs (title)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the artist_songs linking table
pub async fn create_artist_songs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS artist_songs (
            artist_id INTEGER NOT NULL REFERENCES artists(id) ON DELETE CASCADE,
            song_id INTEGER NOT NULL REFERENCES songs(id) ON DELETE CASCADE,
            PRIMARY KEY (artist_id, song_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the artist_albums linking table
pub async fn create_artist_albums_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS artist_albums (
            artist_id INTEGER NOT NULL REFERENCES artists(id) ON DELETE CASCADE,
            album_id INTEGER NOT NULL REFERENCES albums(id) ON DELETE CASCADE,
            PRIMARY KEY (artist_id, album_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the similar_songs table
///
/// The similar song is kept as free text; it is never resolved to a songs row.
pub async fn create_similar_songs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS similar_songs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            song_id INTEGER NOT NULL REFERENCES songs(id) ON DELETE CASCADE,
            artist_name TEXT NOT NULL,
            title TEXT NOT NULL,
            similarity REAL NOT NULL CHECK (similarity >= 0.0 AND similarity <= 1.0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_similar_songs_song ON similar_songs (song_id)")
        .execute(pool)
        .await?;

    Ok(())
}
