use super::*;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use chrono::Utc;

fn make_track() -> Track {
    Track {
        path: PathBuf::from("/tmp/music/test.mp3"),
        title: "Test Title".to_string(),
        artist: Some("Test Artist".to_string()),
        album: Some("Test Album".to_string()),
        duration: Some(Duration::from_micros(1_234_567)),
        track_number: None,
        year: None,
        genre: None,
        has_embedded_art: false,
        date_added: Utc::now(),
        last_played_at: None,
        play_count: 0,
    }
}

#[test]
fn set_track_sets_and_clears_shared_state() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let handle = MprisHandle {
        state: state.clone(),
    };

    let track = make_track();
    handle.set_track(Some(&track));

    {
        let s = state.lock().unwrap();
        assert_eq!(s.title.as_deref(), Some("Test Title"));
        assert_eq!(s.artist, vec!["Test Artist".to_string()]);
        assert_eq!(s.album.as_deref(), Some("Test Album"));
        assert_eq!(s.length_micros, Some(1_234_567));
    }

    handle.set_track(None);
    {
        let s = state.lock().unwrap();
        assert_eq!(s.title, None);
        assert!(s.artist.is_empty());
        assert_eq!(s.album, None);
        assert_eq!(s.length_micros, None);
    }
}

#[test]
fn playback_status_maps_transport_to_spec_strings() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };

    assert_eq!(iface.playback_status(), "Stopped");

    {
        let mut s = state.lock().unwrap();
        s.playback = Transport::Playing;
    }
    assert_eq!(iface.playback_status(), "Playing");

    {
        let mut s = state.lock().unwrap();
        s.playback = Transport::Paused;
    }
    assert_eq!(iface.playback_status(), "Paused");
}

#[test]
fn metadata_includes_expected_keys_when_present() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };

    {
        let mut s = state.lock().unwrap();
        s.title = Some("Title".to_string());
        s.artist = vec!["Artist".to_string()];
        s.album = Some("Album".to_string());
        s.length_micros = Some(42);
    }

    let map = iface.metadata();
    for k in ["xesam:title", "xesam:artist", "xesam:album", "mpris:length"] {
        assert!(map.contains_key(k), "missing key: {k}");
    }
}
