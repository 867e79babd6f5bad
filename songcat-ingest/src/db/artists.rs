//! Artist database operations

use songcat_common::Result;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::{rows_per_statement, MAX_BIND_PARAMS};

/// Persisted artist
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Artist {
    pub id: i64,
    pub name: String,
}

/// Bulk insert artist names; existing names are skipped by the UNIQUE constraint
pub async fn insert_artists(conn: &mut SqliteConnection, names: &[String]) -> Result<u64> {
    let mut inserted = 0;

    for chunk in names.chunks(rows_per_statement(1)) {
        let mut query = QueryBuilder::<Sqlite>::new("INSERT OR IGNORE INTO artists (name) ");
        query.push_values(chunk, |mut row, name| {
            row.push_bind(name.as_str());
        });

        inserted += query.build().execute(&mut *conn).await?.rows_affected();
    }

    Ok(inserted)
}

/// Load artists by name
pub async fn find_artists_by_names(
    conn: &mut SqliteConnection,
    names: &[String],
) -> Result<Vec<Artist>> {
    let mut artists = Vec::with_capacity(names.len());

    for chunk in names.chunks(MAX_BIND_PARAMS) {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT id, name FROM artists WHERE name IN (");
        let mut values = query.separated(", ");
        for name in chunk {
            values.push_bind(name.as_str());
        }
        values.push_unseparated(")");

        artists.extend(
            query
                .build_query_as::<Artist>()
                .fetch_all(&mut *conn)
                .await?,
        );
    }

    Ok(artists)
}
