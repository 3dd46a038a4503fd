use std::path::Path;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::metadata::MetadataProvider;

use super::model::Track;

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Walk `dir` and probe every audio file into a `Track`.
///
/// Files the provider cannot make sense of at all are logged and skipped;
/// the scan itself never fails.
pub fn scan(dir: &Path, settings: &LibrarySettings, provider: &dyn MetadataProvider) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file()
            && (settings.include_hidden || !is_hidden(path))
            && is_audio_file(path, settings)
        {
            let meta = match provider.probe(path) {
                Ok(meta) => meta,
                Err(err) => {
                    warn!("skipping unreadable file: {err}");
                    continue;
                }
            };

            tracks.push(Track {
                path: path.to_path_buf(),
                title: meta.title,
                artist: meta.artist,
                album: meta.album,
                duration: meta.duration,
                track_number: meta.track_number,
                year: meta.year,
                genre: meta.genre,
                has_embedded_art: meta.has_embedded_art,
                date_added: Utc::now(),
                last_played_at: None,
                play_count: 0,
            });
        }
    }

    tracks.sort_by(|a, b| {
        a.display_label()
            .to_lowercase()
            .cmp(&b.display_label().to_lowercase())
    });
    tracks
}

/// Check whether any audio file under `dir` changed since `last_scanned`.
///
/// Used at startup to decide between reloading the cached library and a
/// full re-scan. Errs on the side of re-scanning.
pub fn has_new_files_since(
    dir: &Path,
    settings: &LibrarySettings,
    last_scanned: Option<&DateTime<Utc>>,
) -> bool {
    let Some(last_scanned) = last_scanned else {
        return true;
    };

    for entry in WalkDir::new(dir)
        .follow_links(settings.follow_links)
        .into_iter()
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !path.is_file() || !is_audio_file(path, settings) {
            continue;
        }
        let modified = match entry
            .metadata()
            .map_err(std::io::Error::from)
            .and_then(|m| m.modified())
        {
            Ok(m) => m,
            Err(err) => {
                debug!("cannot read mtime of {}: {err}", path.display());
                return true;
            }
        };
        if DateTime::<Utc>::from(modified) > *last_scanned {
            return true;
        }
    }

    false
}
