//! Album database operations

use chrono::NaiveDate;
use songcat_common::Result;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::{rows_per_statement, MAX_BIND_PARAMS};
use crate::models::AlbumKey;

const ALBUM_BINDS: usize = 3;

/// Persisted album
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Album {
    pub id: i64,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub artists: String,
}

impl Album {
    /// Natural key of this row
    pub fn key(&self) -> AlbumKey {
        AlbumKey::new(self.title.clone(), self.release_date, self.artists.clone())
    }
}

/// Bulk insert one album per key; keys already stored are skipped by the natural-key index
pub async fn insert_albums(conn: &mut SqliteConnection, keys: &[AlbumKey]) -> Result<u64> {
    let mut inserted = 0;

    for chunk in keys.chunks(rows_per_statement(ALBUM_BINDS)) {
        let mut query = QueryBuilder::<Sqlite>::new(
            "INSERT OR IGNORE INTO albums (title, release_date, artists) ",
        );
        query.push_values(chunk, |mut row, key| {
            row.push_bind(key.title.as_str())
                .push_bind(key.release_date)
                .push_bind(key.artists.as_str());
        });

        inserted += query.build().execute(&mut *conn).await?.rows_affected();
    }

    Ok(inserted)
}

/// Load every album carrying one of the given titles
pub async fn find_albums_by_titles(
    conn: &mut SqliteConnection,
    titles: &[String],
) -> Result<Vec<Album>> {
    let mut albums = Vec::new();

    for chunk in titles.chunks(MAX_BIND_PARAMS) {
        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT id, title, release_date, artists FROM albums WHERE title IN (",
        );
        let mut values = query.separated(", ");
        for title in chunk {
            values.push_bind(title.as_str());
        }
        values.push_unseparated(") ORDER BY id");

        albums.extend(
            query
                .build_query_as::<Album>()
                .fetch_all(&mut *conn)
                .await?,
        );
    }

    Ok(albums)
}
