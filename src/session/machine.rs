use std::path::PathBuf;
use std::time::Duration;

use log::warn;

use crate::audio::{AudioOutput, OutputError, OutputHandle};
use crate::library::Track;
use crate::queue::{QueueEngine, RepeatMode};

use super::history::RecentlyPlayed;

/// Transport state of the session.
///
/// `Loading` is a short transient while the device opens a file; outside of
/// a call it collapses into `Playing` or `Paused`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Transport {
    Idle,
    Loading,
    Playing,
    Paused,
}

impl Default for Transport {
    fn default() -> Self {
        Self::Idle
    }
}

/// The playback state machine.
///
/// Owns the queue engine, the one live output handle and the
/// recently-played history. All methods run on the control thread; device
/// completion events must be marshaled there and fed to
/// [`PlaybackSession::natural_completion`].
///
/// Holds: `current` is `Some` exactly when a live handle exists, and both
/// are absent exactly in `Idle`.
pub struct PlaybackSession<O: AudioOutput> {
    output: O,
    queue: QueueEngine,
    current: Option<Track>,
    transport: Transport,
    live_handle: Option<OutputHandle>,
    history: RecentlyPlayed,
    volume: f32,
    muted: bool,
    /// Set around internal next/previous navigation so a selection coming
    /// from there keeps the existing shuffled order instead of regenerating
    /// it.
    manual_navigation: bool,
    /// Guards the natural-completion path while a deliberate stop is being
    /// carried out.
    manually_stopping: bool,
    /// Visual seek target while a drag gesture is in progress.
    seek_drag: Option<Duration>,
    changed: bool,
    started: Option<PathBuf>,
    last_error: Option<String>,
}

impl<O: AudioOutput> PlaybackSession<O> {
    pub fn new(output: O, queue: QueueEngine, volume: f32) -> Self {
        Self {
            output,
            queue,
            current: None,
            transport: Transport::Idle,
            live_handle: None,
            history: RecentlyPlayed::new(),
            volume: volume.clamp(0.0, 1.0),
            muted: false,
            manual_navigation: false,
            manually_stopping: false,
            seek_drag: None,
            changed: true,
            started: None,
            last_error: None,
        }
    }

    // ---- navigation events -------------------------------------------------

    /// Direct selection (library, recently-played or playlist view): always
    /// interrupts the current playback and, with shuffle on, deals a fresh
    /// shuffled ordering pinned to the picked track.
    pub fn select_track(&mut self, track: &Track) {
        self.manual_navigation = false;
        let _ = self.load_track(track, true);
    }

    /// Jump to a position inside the existing active ordering (queue view):
    /// the shuffled order survives the jump.
    pub fn select_at(&mut self, index: usize) {
        if let Some(track) = self.queue.track_at(index).cloned() {
            self.manual_navigation = true;
            let _ = self.load_track(&track, true);
            self.manual_navigation = false;
        }
    }

    /// Toggle playing/paused. With nothing loaded, starts the first track
    /// of the active ordering (no-op on an empty queue).
    pub fn play_pause(&mut self) {
        match (self.current.as_ref(), self.live_handle) {
            (Some(_), Some(handle)) => {
                match self.transport {
                    Transport::Playing => {
                        self.output.pause(handle);
                        self.transport = Transport::Paused;
                    }
                    Transport::Paused => {
                        self.output.play(handle);
                        self.transport = Transport::Playing;
                    }
                    Transport::Idle | Transport::Loading => {}
                }
                self.changed = true;
            }
            _ => {
                if let Some(track) = self.queue.track_at(0).cloned() {
                    self.select_track(&track);
                }
            }
        }
    }

    /// Skip forward. The transport state before the call is preserved:
    /// pause-then-next leaves the next track loaded and ready, not playing.
    pub fn next(&mut self) {
        let start_playing = self.transport == Transport::Playing;
        self.manual_navigation = true;
        self.step_forward(start_playing);
        self.manual_navigation = false;
    }

    /// Skip backward, position-dependently: within the first two seconds of
    /// a track (and not at the head of the queue) go to the prior track;
    /// anywhere else restart the current one. Preserves the transport state
    /// exactly like `next`.
    pub fn previous(&mut self) {
        let start_playing = self.transport == Transport::Playing;
        self.manual_navigation = true;

        let position_ms = self.position().as_millis();
        let prior = match self.queue.active_index() {
            Some(i) if position_ms <= 2000 && i > 0 => self.queue.track_at(i - 1).cloned(),
            _ => None,
        };

        if let Some(track) = prior {
            let _ = self.load_track(&track, start_playing);
        } else if let Some(track) = self.current.clone() {
            // Restart: covers >= 3s in, the 2-3s band, and the queue head.
            let _ = self.load_track(&track, start_playing);
        }

        self.manual_navigation = false;
    }

    /// Handle a track finishing on its own. Ignored while a deliberate stop
    /// is in progress, for handles the session no longer owns, and for
    /// handles the device has already forgotten; otherwise advances like
    /// `next` but always starts playback.
    pub fn natural_completion(&mut self, handle: OutputHandle) {
        if self.manually_stopping {
            return;
        }
        let Some(live) = self.live_handle else {
            return;
        };
        if live != handle {
            return;
        }
        if self.output.position(handle).is_err() {
            return;
        }

        self.manual_navigation = true;
        if self.queue.repeat() == RepeatMode::One {
            if let Some(track) = self.current.clone() {
                let _ = self.load_track(&track, true);
                self.manual_navigation = false;
                return;
            }
        }
        self.step_forward(true);
        self.manual_navigation = false;
    }

    /// Full stop: release the handle, clear the current track, go `Idle`.
    /// Safe to call at any time, any number of times.
    pub fn stop(&mut self) {
        self.manually_stopping = true;
        // Forget the handle before the device stops it, so its completion
        // event (if one is in flight) is stale by identity.
        if let Some(handle) = self.live_handle.take() {
            self.output.dispose(handle);
        }
        self.current = None;
        self.transport = Transport::Idle;
        self.queue.set_active_index(None);
        self.seek_drag = None;
        self.manually_stopping = false;
        self.changed = true;
    }

    // ---- seeking and volume ------------------------------------------------

    pub fn position(&self) -> Duration {
        match self.live_handle {
            Some(handle) => self.output.position(handle).unwrap_or(Duration::ZERO),
            None => Duration::ZERO,
        }
    }

    /// Position to render: the drag target while a gesture is in progress,
    /// the device position otherwise.
    pub fn display_position(&self) -> Duration {
        self.seek_drag.unwrap_or_else(|| self.position())
    }

    pub fn seek_by(&mut self, delta_seconds: i64) {
        let Some(handle) = self.live_handle else {
            return;
        };
        let current = self.position();
        let target = if delta_seconds >= 0 {
            current.saturating_add(Duration::from_secs(delta_seconds as u64))
        } else {
            current.saturating_sub(Duration::from_secs(delta_seconds.unsigned_abs()))
        };
        let target = self.clamp_to_track(target);
        self.output.seek(handle, target);
        self.changed = true;
    }

    /// Start a drag gesture on the position bar: output is muted for the
    /// whole gesture and no device seek happens until release.
    pub fn begin_seek_drag(&mut self) {
        let Some(handle) = self.live_handle else {
            return;
        };
        if self.seek_drag.is_some() {
            return;
        }
        self.output.set_volume(handle, 0.0);
        self.seek_drag = Some(self.position());
        self.changed = true;
    }

    /// Move the drag target. Purely visual; no device call.
    pub fn drag_seek_to(&mut self, target: Duration) {
        if self.seek_drag.is_some() {
            self.seek_drag = Some(self.clamp_to_track(target));
            self.changed = true;
        }
    }

    /// Release the drag: exactly one device seek, then unmute.
    pub fn end_seek_drag(&mut self) {
        let Some(target) = self.seek_drag.take() else {
            return;
        };
        if let Some(handle) = self.live_handle {
            self.output.seek(handle, target);
            self.output.set_volume(handle, self.effective_volume());
        }
        self.changed = true;
    }

    pub fn is_seek_dragging(&self) -> bool {
        self.seek_drag.is_some()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.apply_volume();
    }

    pub fn adjust_volume(&mut self, delta: f32) {
        self.set_volume(self.volume + delta);
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
        self.apply_volume();
    }

    // ---- queue and scope ---------------------------------------------------

    /// Adopt the catalog's new filtered view.
    pub fn set_scope(&mut self, tracks: Vec<Track>) {
        let current = self.current.clone();
        self.queue.set_scope(tracks, current.as_ref());
        self.changed = true;
    }

    pub fn toggle_shuffle(&mut self) {
        let enable = !self.queue.shuffle_enabled();
        self.set_shuffle(enable);
    }

    pub fn set_shuffle(&mut self, enabled: bool) {
        let current = self.current.clone();
        self.queue.enable_shuffle(enabled, current.as_ref());
        self.changed = true;
    }

    pub fn cycle_repeat(&mut self) {
        self.queue.cycle_repeat();
        self.changed = true;
    }

    pub fn set_repeat(&mut self, repeat: RepeatMode) {
        self.queue.set_repeat(repeat);
        self.changed = true;
    }

    pub fn queue(&self) -> &QueueEngine {
        &self.queue
    }

    // ---- state access ------------------------------------------------------

    pub fn current(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    pub fn has_live_handle(&self) -> bool {
        self.live_handle.is_some()
    }

    pub fn history(&self) -> &RecentlyPlayed {
        &self.history
    }

    pub fn restore_history(&mut self, tracks: Vec<Track>) {
        self.history = RecentlyPlayed::from_tracks(tracks);
        self.changed = true;
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Consume the change flag. The control loop polls this to know when to
    /// re-render and re-sync external surfaces.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    /// Consume the path of the most recently started track, if a load
    /// succeeded since the last call. Drives play-count bookkeeping.
    pub fn take_started(&mut self) -> Option<PathBuf> {
        self.started.take()
    }

    /// Consume the last surfaced error message, if any.
    pub fn take_error(&mut self) -> Option<String> {
        self.last_error.take()
    }

    // ---- internals ---------------------------------------------------------

    fn step_forward(&mut self, start_playing: bool) {
        let next_index = self.queue.active_index().map_or(0, |i| i + 1);

        if next_index >= self.queue.len() {
            // End of the active ordering.
            if self.queue.repeat() == RepeatMode::All {
                if let Some(first) = self.queue.track_at(0).cloned() {
                    let _ = self.load_track(&first, start_playing);
                    return;
                }
            }
            self.stop();
            return;
        }

        match self.queue.track_at(next_index).cloned() {
            Some(track) => {
                let _ = self.load_track(&track, start_playing);
            }
            // Cannot advance into an unplayable entry.
            None => self.stop(),
        }
    }

    fn load_track(&mut self, track: &Track, start_playing: bool) -> Result<(), OutputError> {
        // Pre-validate so selecting a vanished file leaves whatever is
        // playing untouched.
        if track.path.as_os_str().is_empty() || !track.path.exists() {
            warn!("cannot load {}: file is gone", track.path.display());
            self.last_error = Some(format!("File not found: {}", track.path.display()));
            self.changed = true;
            return Err(OutputError::UnplayableMedia {
                path: track.path.clone(),
                reason: "file is gone".to_string(),
            });
        }

        // Forget the live handle before the device stops it. Once the
        // session no longer owns the handle, a completion event racing in
        // for it is stale by identity and gets dropped instead of causing a
        // double advance.
        if let Some(old) = self.live_handle.take() {
            self.output.dispose(old);
        }
        self.seek_drag = None;

        if self.queue.shuffle_enabled() && !self.manual_navigation {
            self.queue.reshuffle(Some(track));
        } else {
            let index = self.queue.resolve_index_of(track);
            self.queue.set_active_index(index);
        }

        self.transport = Transport::Loading;
        match self.output.load(&track.path) {
            Ok(handle) => {
                self.output.set_volume(handle, self.effective_volume());
                if start_playing {
                    self.output.play(handle);
                    self.transport = Transport::Playing;
                } else {
                    self.transport = Transport::Paused;
                }
                self.live_handle = Some(handle);
                self.current = Some(track.clone());
                self.history.push(track);
                self.started = Some(track.path.clone());
                self.changed = true;
                Ok(())
            }
            Err(err) => {
                warn!("failed to load {}: {err}", track.path.display());
                self.last_error = Some(err.to_string());
                // The old handle is already released; fall back to the
                // idempotent stop so the session cannot sit half-loaded.
                self.stop();
                Err(err)
            }
        }
    }

    fn clamp_to_track(&self, target: Duration) -> Duration {
        match self.current.as_ref().and_then(|t| t.duration) {
            Some(total) => target.min(total),
            None => target,
        }
    }

    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.volume }
    }

    fn apply_volume(&mut self) {
        // While a drag is in progress the output stays muted; the gesture's
        // release restores the then-current volume.
        if self.seek_drag.is_none() {
            if let Some(handle) = self.live_handle {
                self.output.set_volume(handle, self.effective_volume());
            }
        }
        self.changed = true;
    }
}
