//! Plain serde records written to and read from the JSON store.
//!
//! Every record tolerates being absent or malformed on disk: loading falls
//! back to `Default`, so a corrupt file means an empty library, never a
//! startup failure.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::library::Track;
use crate::playlist::Playlist;
use crate::queue::RepeatMode;

/// Store keys, matching one JSON file each.
pub const KEY_LIBRARY: &str = "library";
pub const KEY_LIBRARY_FOLDERS: &str = "libraryFolders";
pub const KEY_RECENTLY_PLAYED: &str = "recentlyPlayed";
pub const KEY_PLAYLISTS: &str = "playlists";
pub const KEY_SETTINGS: &str = "settings";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LibraryCache {
    #[serde(default)]
    pub tracks: Vec<Track>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LibraryFolders {
    #[serde(default)]
    pub folders: Vec<PathBuf>,
    #[serde(default)]
    pub last_scanned: HashMap<PathBuf, DateTime<Utc>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RecentlyPlayedCache {
    #[serde(default)]
    pub items: Vec<RecentlyPlayedItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentlyPlayedItem {
    pub path: PathBuf,
    pub last_played: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PlaylistsCache {
    #[serde(default)]
    pub playlists: Vec<Playlist>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default)]
    pub player: Option<PlayerState>,
}

/// Player knobs that survive a restart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlayerState {
    pub shuffle: bool,
    pub repeat: RepeatMode,
    pub volume: f32,
}
