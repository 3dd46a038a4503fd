//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`, plus
//! the layout math the event loop shares for mouse hit-testing on the seek
//! bar.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::app::{App, Pane};
use crate::audio::AudioOutput;
use crate::config::{ControlsSettings, UiSettings};
use crate::library::{Track, TrackCatalog};
use crate::playlist::Playlist;
use crate::queue::RepeatMode;
use crate::session::{PlaybackSession, Transport};

/// Screen regions the event loop needs for mouse handling.
pub struct UiAreas {
    pub seek_bar: Rect,
}

/// Compute the fixed layout for a frame of the given size.
pub fn areas(frame_area: Rect) -> UiAreas {
    let chunks = split_frame(frame_area);
    UiAreas {
        // The seek bar is the middle line inside the now-playing block.
        seek_bar: Rect {
            x: chunks[3].x + 1,
            y: chunks[3].y + 2,
            width: chunks[3].width.saturating_sub(2),
            height: 1,
        },
    }
}

fn split_frame(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Length(3), // status
            Constraint::Min(1),    // active pane list
            Constraint::Length(4), // now playing + seek bar
            Constraint::Length(3), // controls help
        ])
        .split(area)
}

/// The queue as the user sees it: the current track on top, then the rest
/// of the active ordering. Empty while the session is idle.
pub fn queue_entries<'a, O: AudioOutput>(session: &'a PlaybackSession<O>) -> Vec<&'a Track> {
    let Some(current) = session.current() else {
        return Vec::new();
    };
    let Some(active) = session.queue().active_index() else {
        return Vec::new();
    };
    let ordering = session.queue().current_ordering();
    let mut entries: Vec<&Track> = Vec::new();
    entries.push(current);
    entries.extend(ordering.iter().skip(active + 1));
    entries
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn pane_title(pane: Pane) -> &'static str {
    match pane {
        Pane::Library => " [1] library ",
        Pane::Queue => " [2] queue ",
        Pane::Playlists => " [3] playlists ",
        Pane::Recent => " [4] recently played ",
    }
}

fn controls_text(scrub_seconds: u64) -> String {
    format!(
        "[1-4] panes | [j/k] up/down | [enter] play | [space/p] play/pause | [h/l] prev/next | \
         [H/L] scrub -/+{scrub_seconds}s | [/] search | [s] shuffle | [r] repeat | [R] rescan | \
         [m] mute | [-/+] volume | [q] quit"
    )
}

fn seek_bar_text(elapsed: Duration, total: Option<Duration>, width: usize) -> String {
    let Some(total) = total.filter(|t| !t.is_zero()) else {
        return "─".repeat(width);
    };
    let ratio = (elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0);
    let filled = (ratio * width as f64).round() as usize;
    let mut bar = "█".repeat(filled.min(width));
    bar.push_str(&"─".repeat(width.saturating_sub(filled)));
    bar
}

/// Render the entire UI into the provided `frame`.
pub fn draw<O: AudioOutput>(
    frame: &mut Frame,
    app: &App,
    catalog: &TrackCatalog,
    session: &PlaybackSession<O>,
    playlists: &[Playlist],
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = split_frame(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" segue ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box
    let status = {
        let mut parts: Vec<String> = Vec::new();

        if app.follow_playback {
            parts.push("CURSOR: Follow".to_string());
        } else {
            parts.push("CURSOR: Free-roam".to_string());
        }

        let repeat_text = match session.queue().repeat() {
            RepeatMode::Off => "REPEAT: Off",
            RepeatMode::All => "REPEAT: All",
            RepeatMode::One => "REPEAT: One",
        };
        parts.push(repeat_text.to_string());

        if session.queue().shuffle_enabled() {
            parts.push("Shuffle: ON".to_string());
        } else {
            parts.push("Shuffle: OFF".to_string());
        }

        let q = catalog.search_text().trim();
        if app.search_mode || !q.is_empty() {
            parts.push(format!("SEARCH: {q}"));
        }

        if session.muted() {
            parts.push("Muted".to_string());
        } else {
            parts.push(format!("Vol: {:.0}%", session.volume() * 100.0));
        }

        if let Some(status) = &app.status {
            parts.push(status.clone());
        }

        parts.join(" • ")
    };
    let status_par = Paragraph::new(status)
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Active pane list
    let queue_view = queue_entries(session);
    let rows: Vec<String> = match app.pane {
        Pane::Library => catalog
            .filtered()
            .iter()
            .map(|t| track_row(t, session))
            .collect(),
        Pane::Queue => queue_view.iter().map(|t| track_row(t, session)).collect(),
        Pane::Playlists => playlists
            .iter()
            .map(|p| format!("{} ({} tracks) - {}", p.name, p.len(), p.description))
            .collect(),
        Pane::Recent => session
            .history()
            .tracks()
            .iter()
            .map(|t| track_row(t, session))
            .collect(),
    };

    // Center the selected item when possible by rendering a visible window.
    let total = rows.len();
    let list_height = chunks[2].height.saturating_sub(2) as usize;
    let sel = app.selected.min(total.saturating_sub(1));
    let (start, end, selected_in_window) = if total <= list_height || list_height == 0 {
        (0, total, sel)
    } else {
        let half = list_height / 2;
        let mut start = sel.saturating_sub(half);
        if start + list_height > total {
            start = total - list_height;
        }
        (start, start + list_height, sel - start)
    };

    let items: Vec<ListItem> = rows[start..end]
        .iter()
        .map(|r| ListItem::new(r.as_str()))
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(pane_title(app.pane)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ratatui::widgets::ListState::default();
    if total > 0 {
        state.select(Some(selected_in_window));
    }
    frame.render_stateful_widget(list, chunks[2], &mut state);

    // Now playing + seek bar
    {
        let (line, elapsed, total_dur) = match session.current() {
            Some(track) => {
                let transport = match session.transport() {
                    Transport::Playing => "Playing",
                    Transport::Paused => "Paused",
                    Transport::Loading => "Loading",
                    Transport::Idle => "Stopped",
                };
                (
                    format!("{transport}: {}", track.display_label()),
                    session.display_position(),
                    track.duration,
                )
            }
            None => ("No track selected".to_string(), Duration::ZERO, None),
        };

        let width = chunks[3].width.saturating_sub(2) as usize;
        let time = match total_dur {
            Some(t) => format!("{} / {}", format_mmss(elapsed), format_mmss(t)),
            None => format_mmss(elapsed),
        };
        let body = format!(
            "{line}  [{time}]\n{}",
            seek_bar_text(elapsed, total_dur, width)
        );

        let now_playing = Paragraph::new(body).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" now playing ")
                .padding(Padding {
                    left: 0,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        );
        frame.render_widget(now_playing, chunks[3]);
    }

    // Controls help
    let footer = Paragraph::new(controls_text(controls_settings.scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);
}

fn track_row<O: AudioOutput>(track: &Track, session: &PlaybackSession<O>) -> String {
    let marker = match session.current() {
        Some(current) if current.path == track.path => "♪ ",
        _ => "  ",
    };
    match track.duration {
        Some(d) => format!("{marker}{} [{}]", track.display_label(), format_mmss(d)),
        None => format!("{marker}{}", track.display_label()),
    }
}
