use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tempfile::TempDir;

use super::records::*;
use super::*;
use crate::config::LibrarySettings;
use crate::library::Track;
use crate::metadata::{MetadataError, MetadataProvider, TagMeta};
use crate::playlist::Playlist;
use crate::queue::RepeatMode;
use crate::session::RecentlyPlayed;

struct StubProbe;

impl MetadataProvider for StubProbe {
    fn probe(&self, path: &Path) -> Result<TagMeta, MetadataError> {
        Ok(TagMeta {
            title: path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("")
                .to_string(),
            artist: None,
            album: None,
            duration: None,
            track_number: None,
            year: None,
            genre: None,
            has_embedded_art: false,
        })
    }
}

fn track_at(path: PathBuf, title: &str) -> Track {
    Track {
        path,
        title: title.to_string(),
        artist: None,
        album: None,
        duration: None,
        track_number: None,
        year: None,
        genre: None,
        has_embedded_art: false,
        date_added: Utc::now(),
        last_played_at: Some(Utc::now()),
        play_count: 1,
    }
}

#[test]
fn load_returns_defaults_for_missing_and_corrupt_files() {
    let dir = TempDir::new().unwrap();
    let store = JsonStore::with_dir(dir.path());

    let cache: LibraryCache = store.load(KEY_LIBRARY);
    assert!(cache.tracks.is_empty());

    fs::write(dir.path().join("library.json"), b"{ not json !!").unwrap();
    let cache: LibraryCache = store.load(KEY_LIBRARY);
    assert!(cache.tracks.is_empty());
}

#[test]
fn save_then_load_round_trips_records() {
    let dir = TempDir::new().unwrap();
    let store = JsonStore::with_dir(dir.path().join("nested"));

    let state = AppState {
        player: Some(PlayerState {
            shuffle: true,
            repeat: RepeatMode::One,
            volume: 0.7,
        }),
    };
    store.save(KEY_SETTINGS, &state).unwrap();

    let loaded: AppState = store.load(KEY_SETTINGS);
    let player = loaded.player.unwrap();
    assert!(player.shuffle);
    assert_eq!(player.repeat, RepeatMode::One);
    assert!((player.volume - 0.7).abs() < f32::EPSILON);
}

#[test]
fn restore_loads_cache_and_prunes_vanished_files() {
    let data_dir = TempDir::new().unwrap();
    let music_dir = TempDir::new().unwrap();

    let kept = music_dir.path().join("kept.mp3");
    fs::write(&kept, b"x").unwrap();
    let ghost = music_dir.path().join("ghost.mp3");

    let store = JsonStore::with_dir(data_dir.path());
    store
        .save(
            KEY_LIBRARY,
            &LibraryCache {
                tracks: vec![track_at(kept.clone(), "kept"), track_at(ghost, "ghost")],
            },
        )
        .unwrap();
    store
        .save(
            KEY_LIBRARY_FOLDERS,
            &LibraryFolders {
                folders: vec![music_dir.path().to_path_buf()],
                last_scanned: [(
                    music_dir.path().to_path_buf(),
                    Utc::now() + chrono::Duration::hours(1),
                )]
                .into_iter()
                .collect(),
            },
        )
        .unwrap();

    let bridge = SessionPersistenceBridge::new(store);
    let restored = bridge.restore(&LibrarySettings::default(), &StubProbe);

    assert_eq!(restored.catalog.all_tracks().len(), 1);
    assert_eq!(restored.catalog.all_tracks()[0].title, "kept");
    // Play statistics came back from the cache, not from a fresh scan.
    assert_eq!(restored.catalog.all_tracks()[0].play_count, 1);
    assert_eq!(restored.catalog.folders().len(), 1);
}

#[test]
fn restore_rescans_folders_with_new_files() {
    let data_dir = TempDir::new().unwrap();
    let music_dir = TempDir::new().unwrap();
    fs::write(music_dir.path().join("fresh.mp3"), b"x").unwrap();

    let store = JsonStore::with_dir(data_dir.path());
    store
        .save(
            KEY_LIBRARY_FOLDERS,
            &LibraryFolders {
                folders: vec![music_dir.path().to_path_buf()],
                last_scanned: Default::default(),
            },
        )
        .unwrap();

    let bridge = SessionPersistenceBridge::new(store);
    let restored = bridge.restore(&LibrarySettings::default(), &StubProbe);

    assert_eq!(restored.catalog.all_tracks().len(), 1);
    assert_eq!(restored.catalog.all_tracks()[0].title, "fresh");
}

#[test]
fn restore_keeps_unavailable_folders_registered() {
    let data_dir = TempDir::new().unwrap();
    let store = JsonStore::with_dir(data_dir.path());
    store
        .save(
            KEY_LIBRARY_FOLDERS,
            &LibraryFolders {
                folders: vec![PathBuf::from("/unplugged/drive/music")],
                last_scanned: Default::default(),
            },
        )
        .unwrap();

    let bridge = SessionPersistenceBridge::new(store);
    let restored = bridge.restore(&LibrarySettings::default(), &StubProbe);

    assert!(restored.catalog.is_empty());
    assert_eq!(restored.catalog.folders().len(), 1);
}

#[test]
fn restore_seeds_sample_playlists_when_none_are_saved() {
    let data_dir = TempDir::new().unwrap();
    let bridge = SessionPersistenceBridge::new(JsonStore::with_dir(data_dir.path()));
    let restored = bridge.restore(&LibrarySettings::default(), &StubProbe);
    assert!(!restored.playlists.is_empty());
}

#[test]
fn restore_orders_recently_played_most_recent_first() {
    let data_dir = TempDir::new().unwrap();
    let music_dir = TempDir::new().unwrap();
    let a = music_dir.path().join("a.mp3");
    let b = music_dir.path().join("b.mp3");
    fs::write(&a, b"x").unwrap();
    fs::write(&b, b"x").unwrap();

    let store = JsonStore::with_dir(data_dir.path());
    store
        .save(
            KEY_LIBRARY,
            &LibraryCache {
                tracks: vec![track_at(a.clone(), "a"), track_at(b.clone(), "b")],
            },
        )
        .unwrap();
    store
        .save(
            KEY_LIBRARY_FOLDERS,
            &LibraryFolders {
                folders: vec![music_dir.path().to_path_buf()],
                last_scanned: [(
                    music_dir.path().to_path_buf(),
                    Utc::now() + chrono::Duration::hours(1),
                )]
                .into_iter()
                .collect(),
            },
        )
        .unwrap();
    store
        .save(
            KEY_RECENTLY_PLAYED,
            &RecentlyPlayedCache {
                items: vec![
                    RecentlyPlayedItem {
                        path: a.clone(),
                        last_played: Utc::now() - chrono::Duration::hours(2),
                    },
                    RecentlyPlayedItem {
                        path: b.clone(),
                        last_played: Utc::now() - chrono::Duration::hours(1),
                    },
                ],
            },
        )
        .unwrap();

    let bridge = SessionPersistenceBridge::new(store);
    let restored = bridge.restore(&LibrarySettings::default(), &StubProbe);

    let titles: Vec<&str> = restored.recent.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["b", "a"]);
}

#[test]
fn save_all_writes_every_record() {
    let data_dir = TempDir::new().unwrap();
    let music_dir = TempDir::new().unwrap();
    let a = music_dir.path().join("a.mp3");
    fs::write(&a, b"x").unwrap();

    let mut catalog = crate::library::TrackCatalog::new();
    catalog.add_folder(music_dir.path(), vec![track_at(a.clone(), "a")]);

    let mut history = RecentlyPlayed::new();
    history.push(&track_at(a, "a"));

    let mut playlist = Playlist::new("Mix", "");
    playlist.add_track(&catalog.all_tracks()[0].clone());

    let bridge = SessionPersistenceBridge::new(JsonStore::with_dir(data_dir.path()));
    bridge
        .save_all(
            &catalog,
            &[playlist],
            &history,
            PlayerState {
                shuffle: false,
                repeat: RepeatMode::All,
                volume: 1.0,
            },
        )
        .unwrap();

    for file in [
        "library.json",
        "libraryFolders.json",
        "recentlyPlayed.json",
        "playlists.json",
        "settings.json",
    ] {
        assert!(data_dir.path().join(file).exists(), "{file} missing");
    }

    // And the round trip comes back intact.
    let restored = bridge.restore(&LibrarySettings::default(), &StubProbe);
    assert_eq!(restored.catalog.all_tracks().len(), 1);
    assert_eq!(restored.playlists.len(), 1);
    assert_eq!(restored.recent.len(), 1);
    assert_eq!(restored.player.unwrap().repeat, RepeatMode::All);
}
