//! Playback session: the state machine deciding what plays and when.

mod history;
mod machine;

pub use history::{RecentlyPlayed, RECENTLY_PLAYED_CAP};
pub use machine::{PlaybackSession, Transport};
