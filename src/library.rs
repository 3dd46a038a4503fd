//! Library model and folder scanning.
//!
//! `Track` is the value entity every other component references; the
//! catalog owns the authoritative set plus the filtered view driving the
//! queue.

mod catalog;
mod model;
mod scan;

pub use catalog::TrackCatalog;
pub use model::Track;
pub use scan::{has_new_files_since, scan};
