use std::env;
use std::path::PathBuf;

use log::warn;

use crate::audio::AudioOutput;
use crate::config::{RepeatSetting, Settings};
use crate::library::{scan, Track, TrackCatalog};
use crate::metadata::MetadataProvider;
use crate::queue::RepeatMode;
use crate::session::PlaybackSession;
use crate::store::PlayerState;

/// Fold a folder given on the command line into the restored catalog.
pub fn add_cli_folder(
    catalog: &mut TrackCatalog,
    settings: &Settings,
    provider: &dyn MetadataProvider,
) {
    let Some(dir) = env::args().nth(1) else {
        return;
    };
    let path = PathBuf::from(&dir);
    if path.is_dir() {
        let scanned = scan(&path, &settings.library, provider);
        catalog.add_folder(&path, scanned);
    } else {
        warn!("not a directory, ignoring: {dir}");
    }
}

/// Seed the session's queue and knobs from persisted state, with config
/// defaults for a fresh profile.
pub fn apply_player_state<O: AudioOutput>(
    session: &mut PlaybackSession<O>,
    player: Option<PlayerState>,
    recent: Vec<Track>,
    catalog: &TrackCatalog,
    settings: &Settings,
) {
    let (shuffle, repeat, volume) = match player {
        Some(PlayerState {
            shuffle,
            repeat,
            volume,
        }) => (shuffle, repeat, volume),
        None => (
            settings.playback.shuffle,
            repeat_from_setting(settings.playback.repeat),
            settings.audio.volume,
        ),
    };

    session.set_scope(catalog.filtered().to_vec());
    session.set_repeat(repeat);
    session.set_volume(volume);
    // Regenerates the shuffled ordering when shuffle was left on.
    session.set_shuffle(shuffle);
    session.restore_history(recent);
}

fn repeat_from_setting(setting: RepeatSetting) -> RepeatMode {
    match setting {
        RepeatSetting::Off => RepeatMode::Off,
        RepeatSetting::All => RepeatMode::All,
        RepeatSetting::One => RepeatMode::One,
    }
}
