//! Song database operations

use songcat_common::Result;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::{rows_per_statement, MAX_BIND_PARAMS};
use crate::models::AudioFeatures;

const SONG_BINDS: usize = 18;

const SONG_COLUMNS: &str = "title, album_id, genre, emotion, musical_key, time_signature, \
     duration_ms, tempo, loudness_db, explicit, popularity, energy, danceability, \
     positiveness, speechiness, liveness, acousticness, instrumentalness";

/// Song row prepared for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewSong {
    /// Position of the source record in its batch; never stored
    pub record_index: usize,
    pub title: String,
    /// Resolved album, `None` when the record had no resolvable album
    pub album_id: Option<i64>,
    pub features: AudioFeatures,
}

/// Persisted song
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Song {
    pub id: i64,
    pub title: String,
    pub album_id: Option<i64>,
    #[sqlx(flatten)]
    pub features: AudioFeatures,
}

/// Bulk insert songs
pub async fn insert_songs(conn: &mut SqliteConnection, songs: &[NewSong]) -> Result<u64> {
    let mut inserted = 0;

    for chunk in songs.chunks(rows_per_statement(SONG_BINDS)) {
        let mut query = QueryBuilder::<Sqlite>::new(format!("INSERT INTO songs ({}) ", SONG_COLUMNS));
        query.push_values(chunk, |mut row, song| {
            let f = &song.features;
            row.push_bind(song.title.as_str())
                .push_bind(song.album_id)
                .push_bind(f.genre.as_deref())
                .push_bind(f.emotion.as_deref())
                .push_bind(f.musical_key.as_deref())
                .push_bind(f.time_signature.as_deref())
                .push_bind(f.duration_ms)
                .push_bind(f.tempo)
                .push_bind(f.loudness_db)
                .push_bind(f.explicit)
                .push_bind(f.popularity)
                .push_bind(f.energy)
                .push_bind(f.danceability)
                .push_bind(f.positiveness)
                .push_bind(f.speechiness)
                .push_bind(f.liveness)
                .push_bind(f.acousticness)
                .push_bind(f.instrumentalness);
        });

        inserted += query.build().execute(&mut *conn).await?.rows_affected();
    }

    Ok(inserted)
}

/// Load every song carrying one of the given titles, oldest first
pub async fn find_songs_by_titles(
    conn: &mut SqliteConnection,
    titles: &[String],
) -> Result<Vec<Song>> {
    let mut songs = Vec::new();

    for chunk in titles.chunks(MAX_BIND_PARAMS) {
        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT id, {} FROM songs WHERE title IN (",
            SONG_COLUMNS
        ));
        let mut values = query.separated(", ");
        for title in chunk {
            values.push_bind(title.as_str());
        }
        values.push_unseparated(")");

        songs.extend(
            query
                .build_query_as::<Song>()
                .fetch_all(&mut *conn)
                .await?,
        );
    }

    // chunks are ordered individually
    songs.sort_by_key(|song| song.id);
    Ok(songs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn test_insert_and_reload_songs() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        songcat_common::db::create_catalog_schema(&pool)
            .await
            .expect("Schema initialization failed");

        let mut conn = pool.acquire().await.unwrap();
        let features = AudioFeatures {
            genre: Some("rock".to_string()),
            tempo: Some(120.5),
            explicit: Some(true),
            duration_ms: Some(227_000),
            ..Default::default()
        };
        let songs = vec![
            NewSong {
                record_index: 0,
                title: "A".to_string(),
                album_id: None,
                features: features.clone(),
            },
            NewSong {
                record_index: 1,
                title: "B".to_string(),
                album_id: None,
                features: AudioFeatures::default(),
            },
        ];

        assert_eq!(insert_songs(&mut conn, &songs).await.unwrap(), 2);

        let loaded = find_songs_by_titles(&mut conn, &["A".to_string()])
            .await
            .unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title, "A");
        assert_eq!(loaded[0].album_id, None);
        assert_eq!(loaded[0].features, features);
    }
}
