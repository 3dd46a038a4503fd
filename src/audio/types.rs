//! Audio-output types and handles.
//!
//! This module defines the handle/event/error vocabulary shared between the
//! device thread and the playback session.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rodio::Decoder;
use thiserror::Error;

/// Opaque token for one loaded, playable track instance.
///
/// The session holds at most one live handle at a time; a handle that the
/// session has let go of is stale, and events carrying it are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputHandle(pub(crate) u64);

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("no usable audio output device: {0}")]
    DeviceUnavailable(String),
    #[error("cannot play {path}: {reason}")]
    UnplayableMedia { path: PathBuf, reason: String },
    #[error("output handle is no longer live")]
    Disposed,
}

/// Notifications from the device thread.
///
/// These arrive on an arbitrary thread and must be drained on the control
/// thread before touching session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEvent {
    /// The track behind this handle played to its natural end.
    Finished(OutputHandle),
}

pub(super) enum DeviceCmd {
    Load {
        id: u64,
        path: PathBuf,
        source: Decoder<BufReader<File>>,
    },
    Play(u64),
    Pause(u64),
    Seek {
        id: u64,
        position: Duration,
    },
    SetVolume {
        id: u64,
        volume: f32,
    },
    Dispose(u64),
    Quit {
        fade_out_ms: u64,
    },
}

/// Elapsed-time mirror the device thread keeps up to date so `position`
/// never has to round-trip through the command channel.
#[derive(Debug, Default)]
pub(super) struct PositionInfo {
    pub id: u64,
    pub live: bool,
    pub accumulated: Duration,
    pub started_at: Option<Instant>,
}

pub(super) type PositionHandle = Arc<Mutex<PositionInfo>>;
