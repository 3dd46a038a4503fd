//! JSON persistence: the store, its records and the session bridge.

mod bridge;
mod json;
mod records;

pub use bridge::{RestoredState, SessionPersistenceBridge};
pub use json::{JsonStore, StoreError};
pub use records::{
    AppState, LibraryCache, LibraryFolders, PlayerState, PlaylistsCache, RecentlyPlayedCache,
    RecentlyPlayedItem,
};

#[cfg(test)]
mod tests;
