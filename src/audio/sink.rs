//! Utilities for creating `rodio` sinks and decoding track files.
//!
//! The helpers here encapsulate opening/decoding a file and preparing a
//! paused `Sink`, optionally skipped to a start position.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use super::types::OutputError;

/// Open and decode `path`, failing with `UnplayableMedia` when the file is
/// missing or not decodable.
pub(super) fn decode_source(path: &Path) -> Result<Decoder<BufReader<File>>, OutputError> {
    let file = File::open(path).map_err(|e| OutputError::UnplayableMedia {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Decoder::new(BufReader::new(file)).map_err(|e| OutputError::UnplayableMedia {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Create a paused `Sink` playing `source` from the beginning.
pub(super) fn create_sink(stream: &OutputStream, source: Decoder<BufReader<File>>) -> Sink {
    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    sink
}

/// Create a paused `Sink` for `path` that starts playback at `start_at`.
///
/// `skip_duration` is the seeking primitive; even `Duration::ZERO` is fine.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    path: &Path,
    start_at: Duration,
) -> Result<Sink, OutputError> {
    let source = decode_source(path)?.skip_duration(start_at);
    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok(sink)
}
