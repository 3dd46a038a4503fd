use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::library::Track;

/// What happens when the active ordering runs out.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepeatMode {
    /// Stop at the end of the ordering.
    Off,
    /// Wrap around to the start of the ordering.
    All,
    /// Replay the current track when it ends.
    One,
}

impl Default for RepeatMode {
    fn default() -> Self {
        Self::Off
    }
}

/// Owns the two orderings over the filtered library and the position of the
/// current track within whichever one is active.
///
/// The sequential ordering (`scope`) is whatever the catalog's filtered view
/// currently is; `shuffled` is a permutation of it that is regenerated only
/// at the points spelled out on each method, never behind the caller's back.
pub struct QueueEngine {
    shuffle_enabled: bool,
    repeat: RepeatMode,
    scope: Vec<Track>,
    shuffled: Vec<Track>,
    active: Option<usize>,
}

impl QueueEngine {
    pub fn new() -> Self {
        Self {
            shuffle_enabled: false,
            repeat: RepeatMode::Off,
            scope: Vec::new(),
            shuffled: Vec::new(),
            active: None,
        }
    }

    /// Replace the sequential ordering with the catalog's new filtered view.
    ///
    /// A structural change (different membership) regenerates the shuffled
    /// ordering pinned to `current`; a mere reordering leaves it untouched.
    pub fn set_scope(&mut self, tracks: Vec<Track>, current: Option<&Track>) {
        let structural_change = !same_membership(&self.scope, &tracks);
        self.scope = tracks;

        if self.shuffle_enabled {
            if structural_change {
                self.reshuffle(current);
            }
        } else {
            self.active = match current {
                Some(t) => self.position_in_scope(t).or(if self.scope.is_empty() {
                    None
                } else {
                    Some(0)
                }),
                None => None,
            };
        }
    }

    /// Turn shuffle on (regenerating the shuffled ordering, pinned to the
    /// current track) or off (re-locating the current track sequentially).
    pub fn enable_shuffle(&mut self, enabled: bool, current: Option<&Track>) {
        self.shuffle_enabled = enabled;
        if enabled {
            self.reshuffle(current);
        } else {
            self.active = match current.and_then(|t| self.position_in_scope(t)) {
                Some(i) => Some(i),
                None if !self.scope.is_empty() => Some(0),
                None => None,
            };
        }
    }

    /// Fisher-Yates over a copy of the sequential ordering.
    ///
    /// When `pin` is present in the result it is swapped to index 0 so the
    /// current track keeps playing at the head of the new ordering.
    pub fn reshuffle(&mut self, pin: Option<&Track>) {
        self.shuffled = self.scope.clone();
        self.shuffled.shuffle(&mut rand::rng());

        let pinned = pin.and_then(|p| self.shuffled.iter().position(|t| t.path == p.path));
        match pinned {
            Some(i) => {
                self.shuffled.swap(0, i);
                self.active = Some(0);
            }
            None => {
                self.active = None;
            }
        }
    }

    /// The ordering navigation currently walks. Empty when the catalog is.
    pub fn current_ordering(&self) -> &[Track] {
        if self.shuffle_enabled {
            &self.shuffled
        } else {
            &self.scope
        }
    }

    /// Bounds-checked lookup into the active ordering.
    ///
    /// `None` means "cannot advance": out of range, a track with no path,
    /// or a file that no longer exists on disk.
    pub fn track_at(&self, index: usize) -> Option<&Track> {
        let track = self.current_ordering().get(index)?;
        if track.path.as_os_str().is_empty() || !track.path.exists() {
            return None;
        }
        Some(track)
    }

    /// Position of `track` within the active ordering.
    pub fn resolve_index_of(&self, track: &Track) -> Option<usize> {
        self.current_ordering()
            .iter()
            .position(|t| t.path == track.path)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn set_active_index(&mut self, index: Option<usize>) {
        self.active = index;
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.shuffle_enabled
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn set_repeat(&mut self, repeat: RepeatMode) {
        self.repeat = repeat;
    }

    /// Cycle `Off -> All -> One -> Off`.
    pub fn cycle_repeat(&mut self) {
        self.repeat = match self.repeat {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        };
    }

    pub fn len(&self) -> usize {
        self.current_ordering().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current_ordering().is_empty()
    }

    /// The shuffled ordering regardless of the shuffle toggle; used by
    /// persistence and tests.
    pub fn shuffled_ordering(&self) -> &[Track] {
        &self.shuffled
    }

    fn position_in_scope(&self, track: &Track) -> Option<usize> {
        self.scope.iter().position(|t| t.path == track.path)
    }
}

impl Default for QueueEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Same multiset of paths, ignoring order.
fn same_membership(a: &[Track], b: &[Track]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut ap: Vec<_> = a.iter().map(|t| t.path.as_path()).collect();
    let mut bp: Vec<_> = b.iter().map(|t| t.path.as_path()).collect();
    ap.sort_unstable();
    bp.sort_unstable();
    ap == bp
}
