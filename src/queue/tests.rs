use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use tempfile::TempDir;

use super::*;
use crate::library::Track;

/// Tracks backed by real (empty) files so existence checks hold.
fn tracks_on_disk(dir: &TempDir, titles: &[&str]) -> Vec<Track> {
    titles
        .iter()
        .map(|title| {
            let path = dir.path().join(format!("{title}.mp3"));
            fs::write(&path, b"x").unwrap();
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
                last_played_at: None,
                play_count: 0,
            }
        })
        .collect()
}

fn paths(tracks: &[Track]) -> BTreeSet<PathBuf> {
    tracks.iter().map(|t| t.path.clone()).collect()
}

#[test]
fn enable_shuffle_pins_current_to_front() {
    let dir = TempDir::new().unwrap();
    let tracks = tracks_on_disk(&dir, &["a", "b", "c", "d", "e"]);
    let current = tracks[3].clone();

    let mut queue = QueueEngine::new();
    queue.set_scope(tracks.clone(), Some(&current));
    queue.enable_shuffle(true, Some(&current));

    assert_eq!(queue.shuffled_ordering()[0].path, current.path);
    assert_eq!(queue.active_index(), Some(0));
    // Permutation: same multiset of paths as the scope.
    assert_eq!(paths(queue.shuffled_ordering()), paths(&tracks));
}

#[test]
fn shuffled_ordering_is_a_permutation_of_the_scope() {
    let dir = TempDir::new().unwrap();
    let tracks = tracks_on_disk(&dir, &["a", "b", "c", "d", "e", "f", "g", "h"]);

    let mut queue = QueueEngine::new();
    queue.set_scope(tracks.clone(), None);
    queue.reshuffle(None);

    assert_eq!(queue.shuffled_ordering().len(), tracks.len());
    assert_eq!(paths(queue.shuffled_ordering()), paths(&tracks));
    // No pin provided: no defined position.
    assert_eq!(queue.active_index(), None);
}

#[test]
fn disabling_shuffle_relocates_current_in_sequential_order() {
    let dir = TempDir::new().unwrap();
    let tracks = tracks_on_disk(&dir, &["a", "b", "c"]);
    let current = tracks[2].clone();

    let mut queue = QueueEngine::new();
    queue.set_scope(tracks.clone(), None);
    queue.enable_shuffle(true, Some(&current));
    queue.enable_shuffle(false, Some(&current));

    assert!(!queue.shuffle_enabled());
    assert_eq!(queue.active_index(), Some(2));
}

#[test]
fn disabling_shuffle_with_unknown_current_falls_back_to_start() {
    let dir = TempDir::new().unwrap();
    let tracks = tracks_on_disk(&dir, &["a", "b"]);
    let stranger = tracks_on_disk(&dir, &["zz"]).remove(0);

    let mut queue = QueueEngine::new();
    queue.set_scope(tracks, None);
    queue.enable_shuffle(false, Some(&stranger));
    assert_eq!(queue.active_index(), Some(0));

    let mut empty_queue = QueueEngine::new();
    empty_queue.enable_shuffle(false, Some(&stranger));
    assert_eq!(empty_queue.active_index(), None);
}

#[test]
fn set_scope_reshuffles_only_on_structural_change() {
    let dir = TempDir::new().unwrap();
    let tracks = tracks_on_disk(&dir, &["a", "b", "c", "d"]);
    let current = tracks[1].clone();

    let mut queue = QueueEngine::new();
    queue.set_scope(tracks.clone(), Some(&current));
    queue.enable_shuffle(true, Some(&current));
    let order_before: Vec<PathBuf> = queue
        .shuffled_ordering()
        .iter()
        .map(|t| t.path.clone())
        .collect();

    // Same membership, different order: the shuffled ordering must survive.
    let mut reordered = tracks.clone();
    reordered.reverse();
    queue.set_scope(reordered, Some(&current));
    let order_after: Vec<PathBuf> = queue
        .shuffled_ordering()
        .iter()
        .map(|t| t.path.clone())
        .collect();
    assert_eq!(order_before, order_after);

    // Dropping a track is structural: reshuffle, current pinned to front.
    let smaller: Vec<Track> = tracks[..3].to_vec();
    queue.set_scope(smaller.clone(), Some(&current));
    assert_eq!(queue.shuffled_ordering().len(), 3);
    assert_eq!(queue.shuffled_ordering()[0].path, current.path);
    assert_eq!(queue.active_index(), Some(0));
    assert_eq!(paths(queue.shuffled_ordering()), paths(&smaller));
}

#[test]
fn track_at_is_bounds_checked_and_rejects_missing_files() {
    let dir = TempDir::new().unwrap();
    let tracks = tracks_on_disk(&dir, &["a", "b"]);

    // Break track b: remove the file behind it.
    fs::remove_file(&tracks[1].path).unwrap();

    let mut queue = QueueEngine::new();
    queue.set_scope(tracks, None);

    assert!(queue.track_at(0).is_some());
    assert!(queue.track_at(1).is_none()); // file gone
    assert!(queue.track_at(2).is_none()); // out of range
}

#[test]
fn track_at_rejects_empty_paths() {
    let dir = TempDir::new().unwrap();
    let mut tracks = tracks_on_disk(&dir, &["a"]);
    tracks[0].path = PathBuf::new();

    let mut queue = QueueEngine::new();
    queue.set_scope(tracks, None);
    assert!(queue.track_at(0).is_none());
}

#[test]
fn shuffle_of_one_or_zero_tracks_is_the_degenerate_case() {
    let mut queue = QueueEngine::new();
    queue.enable_shuffle(true, None);
    assert!(queue.current_ordering().is_empty());
    assert_eq!(queue.active_index(), None);

    let dir = TempDir::new().unwrap();
    let tracks = tracks_on_disk(&dir, &["only"]);
    let current = tracks[0].clone();
    queue.set_scope(tracks, Some(&current));
    queue.enable_shuffle(true, Some(&current));
    assert_eq!(queue.current_ordering().len(), 1);
    assert_eq!(queue.active_index(), Some(0));
}

#[test]
fn resolve_index_of_uses_the_active_ordering() {
    let dir = TempDir::new().unwrap();
    let tracks = tracks_on_disk(&dir, &["a", "b", "c"]);

    let mut queue = QueueEngine::new();
    queue.set_scope(tracks.clone(), None);
    assert_eq!(queue.resolve_index_of(&tracks[2]), Some(2));

    queue.enable_shuffle(true, Some(&tracks[2]));
    assert_eq!(queue.resolve_index_of(&tracks[2]), Some(0));
}

#[test]
fn cycle_repeat_walks_off_all_one() {
    let mut queue = QueueEngine::new();
    assert_eq!(queue.repeat(), RepeatMode::Off);
    queue.cycle_repeat();
    assert_eq!(queue.repeat(), RepeatMode::All);
    queue.cycle_repeat();
    assert_eq!(queue.repeat(), RepeatMode::One);
    queue.cycle_repeat();
    assert_eq!(queue.repeat(), RepeatMode::Off);
}
