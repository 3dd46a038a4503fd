//! Playlists: named, ordered lists of weak track references.
//!
//! A playlist stores file paths, not track copies; the real `Track` values
//! are looked up against the catalog whenever they are needed, so edits to
//! the library never leave stale duplicates behind.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::library::{Track, TrackCatalog};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub track_paths: Vec<PathBuf>,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl Playlist {
    pub fn new(name: &str, description: &str) -> Self {
        let now = Utc::now();
        Self {
            name: name.to_string(),
            description: description.to_string(),
            track_paths: Vec::new(),
            created_at: now,
            last_modified: now,
        }
    }

    /// Append a track unless it is already in the playlist.
    pub fn add_track(&mut self, track: &Track) -> bool {
        if self.track_paths.iter().any(|p| p == &track.path) {
            return false;
        }
        self.track_paths.push(track.path.clone());
        self.last_modified = Utc::now();
        true
    }

    pub fn remove_track(&mut self, path: &Path) -> bool {
        let before = self.track_paths.len();
        self.track_paths.retain(|p| p != path);
        let removed = self.track_paths.len() != before;
        if removed {
            self.last_modified = Utc::now();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.track_paths.clear();
        self.last_modified = Utc::now();
    }

    pub fn len(&self) -> usize {
        self.track_paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.track_paths.is_empty()
    }

    /// Resolve the stored paths against the catalog, skipping tracks the
    /// library no longer knows. The dangling paths stay stored; the track
    /// may come back with its folder.
    pub fn resolve(&self, catalog: &TrackCatalog) -> Vec<Track> {
        self.track_paths
            .iter()
            .filter_map(|p| catalog.track_by_path(p).cloned())
            .collect()
    }
}

/// Starter playlists for a fresh profile.
pub fn sample_playlists() -> Vec<Playlist> {
    vec![
        Playlist::new("Favorites", "My favorite songs"),
        Playlist::new("Workout Mix", "High energy songs for workouts"),
        Playlist::new("Chill Vibes", "Relaxing music"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn track(title: &str) -> Track {
        Track {
            path: PathBuf::from(format!("/music/{title}.mp3")),
            title: title.to_string(),
            artist: None,
            album: None,
            duration: None,
            track_number: None,
            year: None,
            genre: None,
            has_embedded_art: false,
            date_added: Utc::now(),
            last_played_at: None,
            play_count: 0,
        }
    }

    #[test]
    fn add_track_dedupes_by_path() {
        let mut playlist = Playlist::new("Mix", "");
        let a = track("a");

        assert!(playlist.add_track(&a));
        assert!(!playlist.add_track(&a));
        assert_eq!(playlist.len(), 1);
    }

    #[test]
    fn remove_track_reports_whether_anything_changed() {
        let mut playlist = Playlist::new("Mix", "");
        let a = track("a");
        playlist.add_track(&a);

        assert!(playlist.remove_track(&a.path));
        assert!(!playlist.remove_track(&a.path));
        assert!(playlist.is_empty());
    }

    #[test]
    fn resolve_skips_tracks_missing_from_the_catalog() {
        let mut catalog = TrackCatalog::new();
        catalog.add_folder(Path::new("/music"), vec![track("a"), track("b")]);

        let mut playlist = Playlist::new("Mix", "");
        playlist.add_track(&track("a"));
        playlist.add_track(&track("ghost"));

        let resolved = playlist.resolve(&catalog);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].title, "a");
        // The dangling reference survives in storage.
        assert_eq!(playlist.len(), 2);
    }

    #[test]
    fn clear_empties_and_stamps() {
        let mut playlist = Playlist::new("Mix", "");
        playlist.add_track(&track("a"));
        let stamp = playlist.last_modified;
        playlist.clear();
        assert!(playlist.is_empty());
        assert!(playlist.last_modified >= stamp);
    }
}
