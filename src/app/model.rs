//! Application view model: which pane is showing and what is selected.
//!
//! Playback state lives in the session; this struct only carries what the
//! terminal UI needs between redraws.

/// The four views of the app.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Pane {
    Library,
    Queue,
    Playlists,
    Recent,
}

pub struct App {
    pub pane: Pane,
    pub selected: usize,
    pub search_mode: bool,
    pub follow_playback: bool,
    pub status: Option<String>,
}

impl App {
    pub fn new(follow_playback: bool) -> Self {
        Self {
            pane: Pane::Library,
            selected: 0,
            search_mode: false,
            follow_playback,
            status: None,
        }
    }

    /// Switch panes, resetting the cursor to the top.
    pub fn show_pane(&mut self, pane: Pane) {
        if self.pane != pane {
            self.pane = pane;
            self.selected = 0;
        }
    }

    /// Move the cursor down, wrapping past the end of a `len`-item list.
    pub fn move_down(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % len;
    }

    /// Move the cursor up, wrapping past the start.
    pub fn move_up(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = if self.selected == 0 {
            len - 1
        } else {
            self.selected - 1
        };
    }

    pub fn jump_top(&mut self) {
        self.selected = 0;
    }

    pub fn jump_bottom(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    /// Keep the cursor inside the list after the list shrank.
    pub fn clamp_selection(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    pub fn enter_search(&mut self) {
        self.search_mode = true;
        self.follow_playback = false;
    }

    pub fn exit_search(&mut self) {
        self.search_mode = false;
    }

    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    pub fn set_status(&mut self, status: Option<String>) {
        self.status = status;
    }
}
