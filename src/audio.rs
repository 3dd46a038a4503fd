//! Audio output: the device-facing side of playback.
//!
//! A dedicated thread owns the `rodio` output stream and executes commands
//! sent over a channel; natural end-of-track is detected there and reported
//! as an [`OutputEvent`] for the control thread to act on.

mod output;
mod sink;
mod thread;
mod types;

pub use output::{AudioOutput, RodioOutput};
pub use types::{OutputError, OutputEvent, OutputHandle};
