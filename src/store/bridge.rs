use chrono::Utc;
use log::{info, warn};

use crate::config::LibrarySettings;
use crate::library::{has_new_files_since, scan, Track, TrackCatalog};
use crate::metadata::MetadataProvider;
use crate::playlist::{sample_playlists, Playlist};
use crate::session::{RecentlyPlayed, RECENTLY_PLAYED_CAP};

use super::json::{JsonStore, StoreError};
use super::records::{
    AppState, LibraryCache, LibraryFolders, PlayerState, PlaylistsCache, RecentlyPlayedCache,
    RecentlyPlayedItem, KEY_LIBRARY, KEY_LIBRARY_FOLDERS, KEY_PLAYLISTS, KEY_RECENTLY_PLAYED,
    KEY_SETTINGS,
};

/// Everything the bridge rebuilt from disk at startup.
pub struct RestoredState {
    pub catalog: TrackCatalog,
    pub playlists: Vec<Playlist>,
    pub recent: Vec<Track>,
    pub player: Option<PlayerState>,
}

/// Translates session/queue/library state to and from the JSON store at
/// startup and shutdown.
pub struct SessionPersistenceBridge {
    store: JsonStore,
}

impl SessionPersistenceBridge {
    pub fn new(store: JsonStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &JsonStore {
        &self.store
    }

    /// Rebuild the catalog, playlists, history and player knobs from disk.
    ///
    /// Folders with files newer than their last scan are re-scanned; the
    /// rest load from the library cache, dropping entries whose files no
    /// longer exist.
    pub fn restore(
        &self,
        library_settings: &LibrarySettings,
        provider: &dyn MetadataProvider,
    ) -> RestoredState {
        let folders: LibraryFolders = self.store.load(KEY_LIBRARY_FOLDERS);
        let cache: LibraryCache = self.store.load(KEY_LIBRARY);

        let mut catalog = TrackCatalog::new();
        for folder in &folders.folders {
            let last = folders.last_scanned.get(folder).cloned();

            if !folder.exists() {
                // Keep the folder registered; it may be an unplugged drive.
                warn!("library folder {} is unavailable", folder.display());
                catalog.restore_folder(folder, last, Vec::new());
                continue;
            }

            if has_new_files_since(folder, library_settings, last.as_ref()) {
                info!("re-scanning {}", folder.display());
                let scanned = scan(folder, library_settings, provider);
                catalog.restore_folder(folder, Some(Utc::now()), scanned);
            } else {
                let cached: Vec<Track> = cache
                    .tracks
                    .iter()
                    .filter(|t| t.path.starts_with(folder) && t.path.exists())
                    .cloned()
                    .collect();
                catalog.restore_folder(folder, last, cached);
            }
        }

        let mut playlists = self.store.load::<PlaylistsCache>(KEY_PLAYLISTS).playlists;
        if playlists.is_empty() {
            playlists = sample_playlists();
        }

        let mut recent_items = self.store.load::<RecentlyPlayedCache>(KEY_RECENTLY_PLAYED).items;
        recent_items.sort_by(|a, b| b.last_played.cmp(&a.last_played));
        let recent: Vec<Track> = recent_items
            .iter()
            .filter_map(|item| catalog.track_by_path(&item.path).cloned())
            .take(RECENTLY_PLAYED_CAP)
            .collect();

        let player = self.store.load::<AppState>(KEY_SETTINGS).player;

        RestoredState {
            catalog,
            playlists,
            recent,
            player,
        }
    }

    /// Write every record back. Called at shutdown.
    pub fn save_all(
        &self,
        catalog: &TrackCatalog,
        playlists: &[Playlist],
        history: &RecentlyPlayed,
        player: PlayerState,
    ) -> Result<(), StoreError> {
        self.store.save(
            KEY_LIBRARY,
            &LibraryCache {
                tracks: catalog.all_tracks().to_vec(),
            },
        )?;
        self.store.save(
            KEY_LIBRARY_FOLDERS,
            &LibraryFolders {
                folders: catalog.folders().to_vec(),
                last_scanned: catalog.last_scanned().clone(),
            },
        )?;
        self.store.save(
            KEY_RECENTLY_PLAYED,
            &RecentlyPlayedCache {
                items: history
                    .tracks()
                    .iter()
                    .map(|t| RecentlyPlayedItem {
                        path: t.path.clone(),
                        last_played: t.last_played_at.unwrap_or_else(Utc::now),
                    })
                    .collect(),
            },
        )?;
        self.store.save(
            KEY_PLAYLISTS,
            &PlaylistsCache {
                playlists: playlists.to_vec(),
            },
        )?;
        self.store.save(
            KEY_SETTINGS,
            &AppState {
                player: Some(player),
            },
        )?;
        Ok(())
    }
}
