use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::{App, Pane};
use crate::audio::{AudioOutput, OutputEvent};
use crate::config::Settings;
use crate::library::TrackCatalog;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::playlist::Playlist;
use crate::runtime::mpris_sync::update_mpris;
use crate::session::PlaybackSession;
use crate::ui;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

impl EventLoopState {
    pub fn new() -> Self {
        Self { pending_gg: false }
    }
}

impl Default for EventLoopState {
    fn default() -> Self {
        Self::new()
    }
}

/// Main terminal event loop: drains device completions and control
/// commands onto this thread, handles input, and redraws. Returns `Ok(())`
/// when shutdown is requested.
#[allow(clippy::too_many_arguments)]
pub fn run<O: AudioOutput>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &Settings,
    app: &mut App,
    catalog: &mut TrackCatalog,
    session: &mut PlaybackSession<O>,
    playlists: &[Playlist],
    mpris: &MprisHandle,
    control_tx: &Sender<ControlCmd>,
    control_rx: &Receiver<ControlCmd>,
    output_events: &Receiver<OutputEvent>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        // Completion callbacks arrive on the device thread; they only touch
        // session state here, on the control thread.
        while let Ok(OutputEvent::Finished(handle)) = output_events.try_recv() {
            session.natural_completion(handle);
        }

        // Play-count bookkeeping for every track the session started.
        if let Some(path) = session.take_started() {
            catalog.mark_played(&path);
        }

        // One change notification drives every external surface.
        if session.take_changed() {
            update_mpris(mpris, session);
            if let Some(err) = session.take_error() {
                app.set_status(Some(err));
            }
        }

        // Cursor follows the now-playing track in the library view.
        if app.follow_playback && !app.search_mode && app.pane == Pane::Library {
            if let Some(track) = session.current() {
                if let Some(i) = catalog
                    .filtered()
                    .iter()
                    .position(|t| t.path == track.path)
                {
                    app.selected = i;
                }
            }
        }

        app.clamp_selection(pane_len(app, catalog, session, playlists));

        terminal.draw(|f| {
            ui::draw(
                f,
                app,
                catalog,
                session,
                playlists,
                &settings.ui,
                &settings.controls,
            )
        })?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, app, session) {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_key_event(
                        key, settings, app, catalog, session, playlists, control_tx, state,
                    ) {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => {
                    let size = terminal.size()?;
                    let area = Rect::new(0, 0, size.width, size.height);
                    handle_mouse_event(mouse, area, session);
                }
                _ => {}
            }
        }

        // The poll above doubles as the position refresh while playing: the
        // next draw reads a fresh device position, so no separate timer is
        // needed.
    }
}

fn pane_len<O: AudioOutput>(
    app: &App,
    catalog: &TrackCatalog,
    session: &PlaybackSession<O>,
    playlists: &[Playlist],
) -> usize {
    match app.pane {
        Pane::Library => catalog.filtered().len(),
        Pane::Queue => ui::queue_entries(session).len(),
        Pane::Playlists => playlists.len(),
        Pane::Recent => session.history().len(),
    }
}

/// Execute one marshaled control command. Returns true to quit.
fn handle_control_cmd<O: AudioOutput>(
    cmd: ControlCmd,
    app: &mut App,
    session: &mut PlaybackSession<O>,
) -> bool {
    if !app.search_mode {
        app.follow_playback_on();
    }
    match cmd {
        ControlCmd::Quit => return true,
        ControlCmd::Play => match session.transport() {
            crate::session::Transport::Playing => {}
            _ => session.play_pause(),
        },
        ControlCmd::Pause => {
            if session.transport() == crate::session::Transport::Playing {
                session.play_pause();
            }
        }
        ControlCmd::PlayPause => session.play_pause(),
        ControlCmd::Stop => session.stop(),
        ControlCmd::Next => session.next(),
        ControlCmd::Prev => session.previous(),
    }
    false
}

#[allow(clippy::too_many_arguments)]
fn handle_key_event<O: AudioOutput>(
    key: KeyEvent,
    settings: &Settings,
    app: &mut App,
    catalog: &mut TrackCatalog,
    session: &mut PlaybackSession<O>,
    playlists: &[Playlist],
    control_tx: &Sender<ControlCmd>,
    state: &mut EventLoopState,
) -> bool {
    if app.search_mode {
        state.pending_gg = false;
        match key.code {
            KeyCode::Esc => {
                catalog.search("");
                session.set_scope(catalog.filtered().to_vec());
                app.exit_search();
            }
            KeyCode::Backspace => {
                let mut q = catalog.search_text().to_string();
                q.pop();
                catalog.search(&q);
                session.set_scope(catalog.filtered().to_vec());
            }
            KeyCode::Enter => {
                app.exit_search();
                if let Some(track) = catalog.filtered().get(app.selected).cloned() {
                    app.follow_playback_on();
                    session.select_track(&track);
                }
            }
            KeyCode::Down => app.move_down(catalog.filtered().len()),
            KeyCode::Up => app.move_up(catalog.filtered().len()),
            KeyCode::Char(c) => {
                if !c.is_control() {
                    let mut q = catalog.search_text().to_string();
                    q.push(c);
                    catalog.search(&q);
                    session.set_scope(catalog.filtered().to_vec());
                }
            }
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') => {
            state.pending_gg = false;
            return true;
        }
        KeyCode::Char('1') => app.show_pane(Pane::Library),
        KeyCode::Char('2') => app.show_pane(Pane::Queue),
        KeyCode::Char('3') => app.show_pane(Pane::Playlists),
        KeyCode::Char('4') => app.show_pane(Pane::Recent),
        KeyCode::Char('/') => {
            state.pending_gg = false;
            app.show_pane(Pane::Library);
            app.enter_search();
        }
        KeyCode::Char('s') => {
            state.pending_gg = false;
            session.toggle_shuffle();
        }
        KeyCode::Char('R') => {
            state.pending_gg = false;
            let provider = crate::metadata::LoftyProvider;
            for folder in catalog.folders().to_vec() {
                let scanned = crate::library::scan(&folder, &settings.library, &provider);
                catalog.rescan(&folder, scanned);
            }
            session.set_scope(catalog.filtered().to_vec());
            app.set_status(Some(format!(
                "Library re-scanned: {} tracks",
                catalog.all_tracks().len()
            )));
        }
        KeyCode::Char('r') => {
            state.pending_gg = false;
            session.cycle_repeat();
        }
        KeyCode::Char('m') => {
            state.pending_gg = false;
            session.toggle_mute();
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            state.pending_gg = false;
            session.adjust_volume(0.05);
        }
        KeyCode::Char('-') => {
            state.pending_gg = false;
            session.adjust_volume(-0.05);
        }
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.follow_playback_off();
                app.jump_top();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            state.pending_gg = false;
            app.follow_playback_off();
            app.jump_bottom(pane_len(app, catalog, session, playlists));
        }
        KeyCode::Char('j') | KeyCode::Down => {
            state.pending_gg = false;
            app.follow_playback_off();
            app.move_down(pane_len(app, catalog, session, playlists));
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.pending_gg = false;
            app.follow_playback_off();
            app.move_up(pane_len(app, catalog, session, playlists));
        }
        KeyCode::Enter => {
            state.pending_gg = false;
            select_under_cursor(app, catalog, session, playlists);
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            state.pending_gg = false;
            let _ = control_tx.send(ControlCmd::PlayPause);
        }
        KeyCode::Char('l') => {
            state.pending_gg = false;
            let _ = control_tx.send(ControlCmd::Next);
        }
        KeyCode::Char('h') => {
            state.pending_gg = false;
            let _ = control_tx.send(ControlCmd::Prev);
        }
        KeyCode::Char('L') => {
            state.pending_gg = false;
            let secs = settings.controls.scrub_seconds.min(i64::MAX as u64) as i64;
            session.seek_by(secs);
        }
        KeyCode::Char('H') => {
            state.pending_gg = false;
            let secs = settings.controls.scrub_seconds.min(i64::MAX as u64) as i64;
            session.seek_by(-secs);
        }
        KeyCode::Char(_) => {
            // g pending should clear on any other printable char.
            state.pending_gg = false;
        }
        _ => {}
    }

    false
}

/// Enter on a list row, per pane.
fn select_under_cursor<O: AudioOutput>(
    app: &mut App,
    catalog: &TrackCatalog,
    session: &mut PlaybackSession<O>,
    playlists: &[Playlist],
) {
    match app.pane {
        Pane::Library => {
            // Direct selection: with shuffle on this deals a new ordering.
            if let Some(track) = catalog.filtered().get(app.selected).cloned() {
                app.follow_playback_on();
                session.select_track(&track);
            }
        }
        Pane::Queue => {
            // Jump inside the existing ordering; the shuffled order stays.
            if let Some(active) = session.queue().active_index() {
                session.select_at(active + app.selected);
            }
        }
        Pane::Playlists => {
            if let Some(playlist) = playlists.get(app.selected) {
                if let Some(track) = playlist.resolve(catalog).into_iter().next() {
                    session.select_track(&track);
                }
            }
        }
        Pane::Recent => {
            if let Some(track) = session.history().tracks().get(app.selected).cloned() {
                session.select_track(&track);
            }
        }
    }
}

/// Drag-to-seek on the position bar: press mutes and starts the gesture,
/// moves only update the visual target, release issues the one seek.
fn handle_mouse_event<O: AudioOutput>(
    mouse: MouseEvent,
    frame_area: Rect,
    session: &mut PlaybackSession<O>,
) {
    let areas = ui::areas(frame_area);
    let on_bar = |m: &MouseEvent| {
        m.row == areas.seek_bar.y
            && m.column >= areas.seek_bar.x
            && m.column < areas.seek_bar.x + areas.seek_bar.width
    };

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if on_bar(&mouse) {
                session.begin_seek_drag();
                if let Some(target) = seek_target(session, areas.seek_bar, mouse.column) {
                    session.drag_seek_to(target);
                }
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if session.is_seek_dragging() {
                if let Some(target) = seek_target(session, areas.seek_bar, mouse.column) {
                    session.drag_seek_to(target);
                }
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            if session.is_seek_dragging() {
                if let Some(target) = seek_target(session, areas.seek_bar, mouse.column) {
                    session.drag_seek_to(target);
                }
                session.end_seek_drag();
            }
        }
        _ => {}
    }
}

fn seek_target<O: AudioOutput>(
    session: &PlaybackSession<O>,
    bar: Rect,
    column: u16,
) -> Option<Duration> {
    let total = session.current()?.duration?;
    if bar.width == 0 {
        return None;
    }
    let x = column.saturating_sub(bar.x).min(bar.width);
    Some(total.mul_f64(f64::from(x) / f64::from(bar.width)))
}
