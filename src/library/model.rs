use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One audio file known to the library.
///
/// `path` is the identity key; two `Track` values describe the same track
/// exactly when their paths are equal. Everything else is metadata captured
/// at scan time, except the play statistics which only ever change through
/// [`Track::mark_played`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<Duration>,
    pub track_number: Option<u32>,
    pub year: Option<u32>,
    pub genre: Option<String>,
    #[serde(default)]
    pub has_embedded_art: bool,
    pub date_added: DateTime<Utc>,
    #[serde(default)]
    pub last_played_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub play_count: u32,
}

impl Track {
    /// Record one playback: bump the play count and stamp the time.
    pub fn mark_played(&mut self) {
        self.play_count = self.play_count.saturating_add(1);
        self.last_played_at = Some(Utc::now());
    }

    /// Display label for lists: "Artist - Title", or just the title when no
    /// artist is known.
    pub fn display_label(&self) -> String {
        match self.artist.as_deref().map(str::trim) {
            Some(a) if !a.is_empty() => format!("{} - {}", a, self.title),
            _ => self.title.clone(),
        }
    }
}
