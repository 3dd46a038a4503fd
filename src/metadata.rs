//! Tag probing backed by `lofty`.
//!
//! The scanner talks to a [`MetadataProvider`] rather than to `lofty`
//! directly so library and session tests can run without real audio files.

use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::config::{ParseOptions, ParsingMode};
use lofty::prelude::*;
use lofty::probe::Probe;
use log::debug;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("could not read tags from {path}: {reason}")]
    UnreadableTags { path: PathBuf, reason: String },
}

/// Normalized metadata extracted from one audio file.
#[derive(Debug, Clone)]
pub struct TagMeta {
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<Duration>,
    pub track_number: Option<u32>,
    pub year: Option<u32>,
    pub genre: Option<String>,
    pub has_embedded_art: bool,
}

pub trait MetadataProvider {
    /// Probe a file for tags and duration.
    ///
    /// Tag failures are not fatal on their own: if the tags cannot be read
    /// but the file is still decodable, the text fields fall back to
    /// `Unknown Title` / `Unknown Artist` / `Unknown Album` and only the
    /// duration is kept. An error means the file is unusable entirely and
    /// the caller should skip it.
    fn probe(&self, path: &Path) -> Result<TagMeta, MetadataError>;
}

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Production provider reading tags through `lofty`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyProvider;

impl LoftyProvider {
    fn read_tags(&self, path: &Path) -> Result<TagMeta, String> {
        let tagged = lofty::read_from_path(path).map_err(|e| e.to_string())?;
        let duration = Some(tagged.properties().duration());

        let mut meta = TagMeta {
            title: default_title(path),
            artist: None,
            album: None,
            duration,
            track_number: None,
            year: None,
            genre: None,
            has_embedded_art: false,
        };

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            if let Some(v) = tag.title() {
                let v = v.trim();
                if !v.is_empty() {
                    meta.title = v.to_string();
                }
            }
            if let Some(v) = tag.artist() {
                let v = v.trim();
                if !v.is_empty() {
                    meta.artist = Some(v.to_string());
                }
            }
            if let Some(v) = tag.album() {
                let v = v.trim();
                if !v.is_empty() {
                    meta.album = Some(v.to_string());
                }
            }
            if let Some(v) = tag.genre() {
                let v = v.trim();
                if !v.is_empty() {
                    meta.genre = Some(v.to_string());
                }
            }
            meta.track_number = tag.track();
            meta.year = tag.year();
            meta.has_embedded_art = !tag.pictures().is_empty();
        }

        Ok(meta)
    }

    /// Best-effort secondary probe used when tag reading fails: a relaxed
    /// parse that only asks for the audio properties, so at least the
    /// duration survives.
    fn read_duration_only(&self, path: &Path) -> Result<Option<Duration>, String> {
        let options = ParseOptions::new()
            .read_properties(true)
            .parsing_mode(ParsingMode::Relaxed);
        let tagged = Probe::open(path)
            .map_err(|e| e.to_string())?
            .options(options)
            .read()
            .map_err(|e| e.to_string())?;
        Ok(Some(tagged.properties().duration()))
    }
}

impl MetadataProvider for LoftyProvider {
    fn probe(&self, path: &Path) -> Result<TagMeta, MetadataError> {
        match self.read_tags(path) {
            Ok(meta) => Ok(meta),
            Err(primary) => {
                debug!("tag read failed for {}: {primary}", path.display());
                let duration =
                    self.read_duration_only(path)
                        .map_err(|reason| MetadataError::UnreadableTags {
                            path: path.to_path_buf(),
                            reason,
                        })?;
                Ok(TagMeta {
                    title: UNKNOWN_TITLE.to_string(),
                    artist: Some(UNKNOWN_ARTIST.to_string()),
                    album: Some(UNKNOWN_ALBUM.to_string()),
                    duration,
                    track_number: None,
                    year: None,
                    genre: None,
                    has_embedded_art: false,
                })
            }
        }
    }
}

fn default_title(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(UNKNOWN_TITLE)
        .to_string()
}
