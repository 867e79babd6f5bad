//! Per-batch and per-run ingest statistics

use serde::Serialize;

/// Counts for one reconciled batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    /// Input records in the batch
    pub records: usize,
    /// Distinct artist names resolved to rows
    pub artists_resolved: usize,
    /// Distinct album keys resolved to rows
    pub albums_resolved: usize,
    /// Songs stored and matched back to their record
    pub songs_saved: usize,
    /// Songs stored but lost during reload matching
    pub songs_dropped: usize,
    pub artist_songs: u64,
    pub artist_albums: u64,
    pub similar_songs: u64,
}

impl BatchStats {
    pub fn display_string(&self) -> String {
        format!(
            "{} records: {} artists, {} albums, {} songs ({} dropped), {} artist-song, {} artist-album, {} similar",
            self.records,
            self.artists_resolved,
            self.albums_resolved,
            self.songs_saved,
            self.songs_dropped,
            self.artist_songs,
            self.artist_albums,
            self.similar_songs
        )
    }
}

/// Running totals across every batch of one ingest run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestTotals {
    pub batches: usize,
    pub records: usize,
    pub songs_saved: usize,
    pub songs_dropped: usize,
    pub artist_songs: u64,
    pub artist_albums: u64,
    pub similar_songs: u64,
    /// Input lines the supplier could not parse
    pub skipped_lines: usize,
}

impl IngestTotals {
    pub fn add_batch(&mut self, stats: &BatchStats) {
        self.batches += 1;
        self.records += stats.records;
        self.songs_saved += stats.songs_saved;
        self.songs_dropped += stats.songs_dropped;
        self.artist_songs += stats.artist_songs;
        self.artist_albums += stats.artist_albums;
        self.similar_songs += stats.similar_songs;
    }
}
