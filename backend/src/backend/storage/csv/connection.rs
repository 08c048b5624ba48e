use anyhow::{Context, Result};
use log::info;
use shared::EventKind;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::event_repository::EventRepository;
use super::profile_repository::ProfileRepository;
use crate::backend::storage::traits::Connection;

const GLOBAL_CONFIG_FILE: &str = "global_config.yaml";

/// CsvConnection manages file paths and ensures directories exist for each profile.
/// Clones share one write lock, so every read-modify-write of a file under
/// `base_directory` is serialized.
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl CsvConnection {
    /// Create a new CSV connection with a base directory
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .with_context(|| format!("Failed to create data directory {}", base_path.display()))?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Hold this guard across a read-modify-write of any data file
    pub async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    /// Get the base directory path
    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Get the directory holding one profile's data
    pub fn profile_directory(&self, directory_name: &str) -> PathBuf {
        self.base_directory.join(directory_name)
    }

    /// Create a profile's directory if it doesn't exist yet
    pub fn ensure_profile_directory(&self, directory_name: &str) -> Result<PathBuf> {
        let directory = self.profile_directory(directory_name);
        if !directory.exists() {
            fs::create_dir_all(&directory)
                .with_context(|| format!("Failed to create profile directory {}", directory.display()))?;
            info!("Created profile directory: {}", directory.display());
        }
        Ok(directory)
    }

    /// Get the CSV file for one event kind, e.g. `<profile>/breast.csv`
    pub fn collection_file_path(&self, directory_name: &str, kind: EventKind) -> PathBuf {
        self.profile_directory(directory_name)
            .join(format!("{}.csv", kind.as_str()))
    }

    pub fn global_config_path(&self) -> PathBuf {
        self.base_directory.join(GLOBAL_CONFIG_FILE)
    }
}

/// A fresh sibling path to stage an atomic write of `path` in
pub fn unique_temp_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()))
}

impl Connection for CsvConnection {
    type EventRepository = EventRepository;
    type ProfileRepository = ProfileRepository;

    fn create_event_repository(&self) -> Self::EventRepository {
        EventRepository::new(self.clone())
    }

    fn create_profile_repository(&self) -> Self::ProfileRepository {
        ProfileRepository::new(self.clone())
    }
}
