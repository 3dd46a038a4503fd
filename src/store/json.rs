use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot serialize {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One-JSON-file-per-key store in the user data directory.
///
/// Loads never fail: a missing or corrupt file yields the record's default
/// (with a warning for the corrupt case).
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    /// Store rooted at the platform data directory, e.g.
    /// `~/.local/share/segue` on Linux.
    pub fn open_default() -> Self {
        let dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("segue");
        Self { dir }
    }

    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub fn load<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let path = self.path_for(key);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(_) => return T::default(),
        };
        match serde_json::from_slice(&data) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "malformed {} ({err}); falling back to defaults",
                    path.display()
                );
                T::default()
            }
        }
    }

    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.path_for(key);
        let file = File::create(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value).map_err(|source| {
            StoreError::Serialize {
                key: key.to_string(),
                source,
            }
        })?;
        writer.flush().map_err(|source| StoreError::Io { path, source })?;
        Ok(())
    }
}
