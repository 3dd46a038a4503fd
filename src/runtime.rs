//! Runtime wiring: construct everything, run the event loop, persist on
//! the way out.

use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use log::warn;
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::App;
use crate::audio::RodioOutput;
use crate::metadata::LoftyProvider;
use crate::mpris::ControlCmd;
use crate::queue::QueueEngine;
use crate::session::PlaybackSession;
use crate::store::{JsonStore, PlayerState, SessionPersistenceBridge};

mod event_loop;
mod mpris_sync;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();

    let provider = LoftyProvider;
    let bridge = SessionPersistenceBridge::new(JsonStore::open_default());
    let restored = bridge.restore(&settings.library, &provider);

    let mut catalog = restored.catalog;
    startup::add_cli_folder(&mut catalog, &settings, &provider);

    let (output, output_events) = RodioOutput::start()?;
    let mut session = PlaybackSession::new(output, QueueEngine::new(), settings.audio.volume);
    startup::apply_player_state(
        &mut session,
        restored.player,
        restored.recent,
        &catalog,
        &settings,
    );

    let playlists = restored.playlists;
    let mut app = App::new(settings.ui.follow_playback);

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx.clone());
    mpris_sync::update_mpris(&mpris, &session);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = {
        let mut state = event_loop::EventLoopState::new();
        event_loop::run(
            &mut terminal,
            &settings,
            &mut app,
            &mut catalog,
            &mut session,
            &playlists,
            &mpris,
            &control_tx,
            &control_rx,
            &output_events,
            &mut state,
        )
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    // Capture the knobs before the teardown stop clears them, then release
    // the device and write everything back.
    let player_state = PlayerState {
        shuffle: session.queue().shuffle_enabled(),
        repeat: session.queue().repeat(),
        volume: session.volume(),
    };
    session.stop();
    session
        .output()
        .quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));

    if let Err(e) = bridge.save_all(&catalog, &playlists, session.history(), player_state) {
        warn!("could not save state: {e}");
    }

    run_result
}
