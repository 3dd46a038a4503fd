use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::info;

use super::model::Track;

/// The registry of every known track plus the currently filtered view.
///
/// `all` is keyed by path and ordered by insertion (scan/add order); the
/// filtered view is re-derived whenever folders change or the search text
/// changes. Every filtered track exists in `all`.
pub struct TrackCatalog {
    all: Vec<Track>,
    folders: Vec<PathBuf>,
    last_scanned: HashMap<PathBuf, DateTime<Utc>>,
    search_text: String,
    filtered: Vec<Track>,
}

impl TrackCatalog {
    pub fn new() -> Self {
        Self {
            all: Vec::new(),
            folders: Vec::new(),
            last_scanned: HashMap::new(),
            search_text: String::new(),
            filtered: Vec::new(),
        }
    }

    /// Merge `scanned` tracks found under `folder` into the catalog.
    ///
    /// Existing path keys are kept (their play statistics survive a
    /// re-scan); only genuinely new files are appended. Returns the number
    /// of tracks added.
    pub fn add_folder(&mut self, folder: &Path, scanned: Vec<Track>) -> usize {
        if !self.folders.iter().any(|f| f == folder) {
            self.folders.push(folder.to_path_buf());
        }

        let mut added = 0;
        for track in scanned {
            if !self.contains_path(&track.path) {
                self.all.push(track);
                added += 1;
            }
        }
        self.last_scanned.insert(folder.to_path_buf(), Utc::now());
        self.refilter();
        info!("added {added} tracks from {}", folder.display());
        added
    }

    /// Drop a folder and every track that lives under it.
    pub fn remove_folder(&mut self, folder: &Path) -> usize {
        self.folders.retain(|f| f != folder);
        self.last_scanned.remove(folder);
        let before = self.all.len();
        self.all.retain(|t| !t.path.starts_with(folder));
        let removed = before - self.all.len();
        self.refilter();
        info!("removed {removed} tracks under {}", folder.display());
        removed
    }

    /// Re-scan one known folder, merging any new files. Path keys that
    /// already exist are never duplicated.
    pub fn rescan(&mut self, folder: &Path, scanned: Vec<Track>) -> usize {
        if !self.folders.iter().any(|f| f == folder) {
            return 0;
        }
        let mut added = 0;
        for track in scanned {
            if !self.contains_path(&track.path) {
                self.all.push(track);
                added += 1;
            }
        }
        self.last_scanned.insert(folder.to_path_buf(), Utc::now());
        self.refilter();
        added
    }

    /// Re-register a persisted folder with its cached tracks, keeping the
    /// recorded scan time. Used by the persistence bridge at startup.
    pub fn restore_folder(
        &mut self,
        folder: &Path,
        last_scanned: Option<DateTime<Utc>>,
        tracks: Vec<Track>,
    ) {
        if !self.folders.iter().any(|f| f == folder) {
            self.folders.push(folder.to_path_buf());
        }
        if let Some(ts) = last_scanned {
            self.last_scanned.insert(folder.to_path_buf(), ts);
        }
        for track in tracks {
            if !self.contains_path(&track.path) {
                self.all.push(track);
            }
        }
        self.refilter();
    }

    /// Re-derive the filtered view as a case-insensitive substring match
    /// over title, artist and album.
    pub fn search(&mut self, text: &str) {
        self.search_text = text.to_string();
        self.refilter();
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn mark_played(&mut self, path: &Path) {
        if let Some(track) = self.all.iter_mut().find(|t| t.path == path) {
            track.mark_played();
            self.refilter();
        }
    }

    pub fn track_by_path(&self, path: &Path) -> Option<&Track> {
        self.all.iter().find(|t| t.path == path)
    }

    pub fn contains_path(&self, path: &Path) -> bool {
        self.all.iter().any(|t| t.path == path)
    }

    pub fn all_tracks(&self) -> &[Track] {
        &self.all
    }

    pub fn filtered(&self) -> &[Track] {
        &self.filtered
    }

    pub fn folders(&self) -> &[PathBuf] {
        &self.folders
    }

    pub fn last_scanned(&self) -> &HashMap<PathBuf, DateTime<Utc>> {
        &self.last_scanned
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    fn refilter(&mut self) {
        let needle = self.search_text.trim().to_lowercase();
        if needle.is_empty() {
            self.filtered = self.all.clone();
            return;
        }

        self.filtered = self
            .all
            .iter()
            .filter(|t| {
                t.title.to_lowercase().contains(&needle)
                    || t.artist
                        .as_deref()
                        .is_some_and(|a| a.to_lowercase().contains(&needle))
                    || t.album
                        .as_deref()
                        .is_some_and(|a| a.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
    }
}

impl Default for TrackCatalog {
    fn default() -> Self {
        Self::new()
    }
}
