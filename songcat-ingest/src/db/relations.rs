//! Relation row operations (artist–song, artist–album, similar songs)
//!
//! Artist links use `INSERT OR IGNORE`: a pair already written by an earlier
//! batch is not an error, it simply does not count as inserted.

use songcat_common::Result;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::rows_per_statement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtistSong {
    pub artist_id: i64,
    pub song_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtistAlbum {
    pub artist_id: i64,
    pub album_id: i64,
}

/// Declared similarity from one stored song to a free-text artist/title
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarSong {
    pub song_id: i64,
    pub artist_name: String,
    pub title: String,
    /// Always within [0, 1]
    pub similarity: f64,
}

pub async fn insert_artist_songs(conn: &mut SqliteConnection, rows: &[ArtistSong]) -> Result<u64> {
    let mut inserted = 0;

    for chunk in rows.chunks(rows_per_statement(2)) {
        let mut query =
            QueryBuilder::<Sqlite>::new("INSERT OR IGNORE INTO artist_songs (artist_id, song_id) ");
        query.push_values(chunk, |mut row, link| {
            row.push_bind(link.artist_id).push_bind(link.song_id);
        });

        inserted += query.build().execute(&mut *conn).await?.rows_affected();
    }

    Ok(inserted)
}

pub async fn insert_artist_albums(
    conn: &mut SqliteConnection,
    rows: &[ArtistAlbum],
) -> Result<u64> {
    let mut inserted = 0;

    for chunk in rows.chunks(rows_per_statement(2)) {
        let mut query = QueryBuilder::<Sqlite>::new(
            "INSERT OR IGNORE INTO artist_albums (artist_id, album_id) ",
        );
        query.push_values(chunk, |mut row, link| {
            row.push_bind(link.artist_id).push_bind(link.album_id);
        });

        inserted += query.build().execute(&mut *conn).await?.rows_affected();
    }

    Ok(inserted)
}

pub async fn insert_similar_songs(
    conn: &mut SqliteConnection,
    rows: &[SimilarSong],
) -> Result<u64> {
    let mut inserted = 0;

    for chunk in rows.chunks(rows_per_statement(4)) {
        let mut query = QueryBuilder::<Sqlite>::new(
            "INSERT INTO similar_songs (song_id, artist_name, title, similarity) ",
        );
        query.push_values(chunk, |mut row, similar| {
            row.push_bind(similar.song_id)
                .push_bind(similar.artist_name.as_str())
                .push_bind(similar.title.as_str())
                .push_bind(similar.similarity);
        });

        inserted += query.build().execute(&mut *conn).await?.rows_affected();
    }

    Ok(inserted)
}
