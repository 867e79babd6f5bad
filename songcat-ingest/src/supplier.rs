//! Record supplier: newline-delimited JSON → batches of normalized records
//!
//! One catalog entry per line. Field names follow the usual export
//! spellings ("Artist(s)", "song", "Release Date", ...). Values that cannot
//! be interpreted (bad dates, "n/a" numbers) become `None`; only a line that
//! is not a JSON object at all is skipped.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};
use songcat_common::Result;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::warn;

use crate::models::{AudioFeatures, NormalizedSongRecord, SimilarSongDeclaration};

/// Export spellings accepted for each raw field
///
/// When one line carries several spellings of the same field, the canonical
/// name wins, then the aliases in the order listed here.
const FIELD_ALIASES: &[(&str, &[&str])] = &[
    ("artists", &["Artist(s)", "artist", "Artist"]),
    ("title", &["song", "Song", "name"]),
    ("album", &["Album"]),
    ("release_date", &["Release Date", "releaseDate"]),
    ("genre", &["Genre"]),
    ("emotion", &["Emotion"]),
    ("musical_key", &["Key", "key"]),
    ("time_signature", &["Time signature", "Time Signature"]),
    ("duration_ms", &["Length", "length", "duration"]),
    ("tempo", &["Tempo"]),
    ("loudness_db", &["Loudness (db)", "loudness"]),
    ("explicit", &["Explicit"]),
    ("popularity", &["Popularity"]),
    ("energy", &["Energy"]),
    ("danceability", &["Danceability"]),
    ("positiveness", &["Positiveness"]),
    ("speechiness", &["Speechiness"]),
    ("liveness", &["Liveness"]),
    ("acousticness", &["Acousticness"]),
    ("instrumentalness", &["Instrumentalness"]),
    ("similar_songs", &["Similar Songs", "similar"]),
];

/// One line as exported; every field optional and loosely typed
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSongRecord {
    artists: Option<Value>,
    title: Option<Value>,
    album: Option<Value>,
    release_date: Option<Value>,

    genre: Option<Value>,
    emotion: Option<Value>,
    musical_key: Option<Value>,
    time_signature: Option<Value>,
    duration_ms: Option<Value>,
    tempo: Option<Value>,
    loudness_db: Option<Value>,
    explicit: Option<Value>,
    popularity: Option<Value>,
    energy: Option<Value>,
    danceability: Option<Value>,
    positiveness: Option<Value>,
    speechiness: Option<Value>,
    liveness: Option<Value>,
    acousticness: Option<Value>,
    instrumentalness: Option<Value>,

    similar_songs: Option<Value>,
}

impl RawSongRecord {
    fn normalize(self) -> NormalizedSongRecord {
        NormalizedSongRecord {
            artists: text(self.artists.as_ref()).unwrap_or_default(),
            album: text(self.album.as_ref()),
            release_date: self.release_date.as_ref().and_then(parse_release_date),
            title: text(self.title.as_ref()).unwrap_or_default(),
            features: AudioFeatures {
                genre: text(self.genre.as_ref()),
                emotion: text(self.emotion.as_ref()),
                musical_key: text(self.musical_key.as_ref()),
                time_signature: text(self.time_signature.as_ref()),
                duration_ms: self.duration_ms.as_ref().and_then(parse_duration_ms),
                tempo: number(self.tempo.as_ref()),
                loudness_db: number(self.loudness_db.as_ref()),
                explicit: self.explicit.as_ref().and_then(parse_flag),
                popularity: number(self.popularity.as_ref()).map(|v| v.round() as i64),
                energy: number(self.energy.as_ref()),
                danceability: number(self.danceability.as_ref()),
                positiveness: number(self.positiveness.as_ref()),
                speechiness: number(self.speechiness.as_ref()),
                liveness: number(self.liveness.as_ref()),
                acousticness: number(self.acousticness.as_ref()),
                instrumentalness: number(self.instrumentalness.as_ref()),
            },
            similar_songs: self
                .similar_songs
                .as_ref()
                .map(parse_similar_songs)
                .unwrap_or_default(),
        }
    }
}

/// Parse one JSON line into a normalized record
///
/// Fails only when the line is not a JSON object.
pub fn parse_line(line: &str) -> std::result::Result<NormalizedSongRecord, serde_json::Error> {
    let mut fields: Map<String, Value> = serde_json::from_str(line)?;

    let mut canonical = Map::new();
    for (field, aliases) in FIELD_ALIASES {
        let value = std::iter::once(*field)
            .chain(aliases.iter().copied())
            .find_map(|name| fields.remove(name));
        if let Some(value) = value {
            canonical.insert(field.to_string(), value);
        }
    }

    serde_json::from_value::<RawSongRecord>(Value::Object(canonical)).map(RawSongRecord::normalize)
}

/// Release dates: `YYYY-MM-DD`, `YYYY-MM`, `YYYY`, `DD/MM/YYYY`; partial dates pin to day 1
pub fn parse_release_date(value: &Value) -> Option<NaiveDate> {
    let raw = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(&raw, "%d/%m/%Y") {
        return Some(date);
    }
    if raw.len() == 7 {
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d") {
            return Some(date);
        }
    }
    if raw.len() == 4 && raw.chars().all(|c| c.is_ascii_digit()) {
        return NaiveDate::parse_from_str(&format!("{}-01-01", raw), "%Y-%m-%d").ok();
    }

    None
}

/// Numbers, or numeric strings with a unit suffix ("-6.85db", "87%")
fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s
                .trim()
                .trim_end_matches(|c: char| c.is_ascii_alphabetic() || c == '%' || c.is_whitespace());
            trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}

/// "mm:ss" / "hh:mm:ss" strings, or a plain millisecond count
fn parse_duration_ms(value: &Value) -> Option<i64> {
    if let Value::String(s) = value {
        if s.contains(':') {
            let mut seconds: i64 = 0;
            for part in s.trim().split(':') {
                let part = part.trim().parse::<i64>().ok().filter(|v| *v >= 0)?;
                seconds = seconds.checked_mul(60)?.checked_add(part)?;
            }
            return seconds.checked_mul(1000);
        }
    }
    number(Some(value)).map(|ms| ms.round() as i64)
}

fn parse_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|v| v != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "true" | "1" => Some(true),
            "no" | "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Non-blank text; numbers are rendered ("4" for a time signature of 4)
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Similar-song declarations
///
/// Accepts both `{"artist", "title", "score"}` objects and the numbered export
/// form `{"Similar Artist 1", "Similar Song 1", "Similarity Score"}`.
fn parse_similar_songs(value: &Value) -> Vec<SimilarSongDeclaration> {
    let Value::Array(entries) = value else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let fields = entry.as_object()?;
            let mut declaration = SimilarSongDeclaration::default();

            for (name, field) in fields {
                let name = name.to_ascii_lowercase();
                if name.starts_with("similar artist") || name == "artist" {
                    declaration.artist = text(Some(field)).unwrap_or_default();
                } else if name.starts_with("similar song") || name == "title" || name == "song" {
                    declaration.title = text(Some(field)).unwrap_or_default();
                } else if name.contains("score") || name == "similarity" {
                    declaration.score = number(Some(field));
                }
            }

            if declaration.artist.is_empty() && declaration.title.is_empty() {
                None
            } else {
                Some(declaration)
            }
        })
        .collect()
}

/// Streams batches of normalized records from a line-oriented reader
pub struct RecordSupplier<R> {
    lines: Lines<R>,
    batch_size: usize,
    line_number: usize,
    skipped: usize,
}

impl RecordSupplier<BufReader<File>> {
    /// Open a JSON-lines file
    pub async fn open(path: &Path, batch_size: usize) -> Result<Self> {
        let file = File::open(path).await?;
        Ok(Self::new(BufReader::new(file), batch_size))
    }
}

impl<R: AsyncBufRead + Unpin> RecordSupplier<R> {
    pub fn new(reader: R, batch_size: usize) -> Self {
        Self {
            lines: reader.lines(),
            batch_size: batch_size.max(1),
            line_number: 0,
            skipped: 0,
        }
    }

    /// Next batch of at most `batch_size` records; `None` once input is exhausted
    pub async fn next_batch(&mut self) -> Result<Option<Vec<NormalizedSongRecord>>> {
        let mut batch = Vec::with_capacity(self.batch_size);

        while batch.len() < self.batch_size {
            let Some(line) = self.lines.next_line().await? else {
                break;
            };
            self.line_number += 1;

            if line.trim().is_empty() {
                continue;
            }

            match parse_line(&line) {
                Ok(record) => batch.push(record),
                Err(e) => {
                    self.skipped += 1;
                    warn!(line = self.line_number, error = %e, "Skipping unparsable record");
                }
            }
        }

        if batch.is_empty() {
            Ok(None)
        } else {
            Ok(Some(batch))
        }
    }

    /// Lines skipped because they were not valid JSON objects
    pub fn skipped_lines(&self) -> usize {
        self.skipped
    }
}
