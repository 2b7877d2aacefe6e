//! Durable snapshot of all-time totals
//!
//! One JSON document on disk, keyed by category (`rpc_scan`, `explorer`).
//! Reads and writes go through a mutex and writes replace the whole file via
//! a temp-file rename, so concurrent API requests never see a torn document.

use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tokio::{fs, sync::Mutex};

use crate::{entity::AllTimeTotals, error::StoreError};

pub type SnapshotDocument = BTreeMap<String, AllTimeTotals>;

pub struct SnapshotStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or corrupt files read as empty; any other I/O failure is returned
    async fn read_document(&self) -> Result<SnapshotDocument, StoreError> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(SnapshotDocument::new()),
            Err(err) => return Err(err.into()),
        };

        Ok(serde_json::from_slice(&raw).unwrap_or_else(|err| {
            tracing::warn!(path = %self.path.display(), "Snapshot corrupt, starting empty: {err}");
            SnapshotDocument::new()
        }))
    }

    async fn write_document(&self, document: &SnapshotDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let encoded = serde_json::to_vec_pretty(document)?;
        let staging = self.path.with_extension("json.tmp");

        fs::write(&staging, encoded).await?;
        fs::rename(&staging, &self.path).await?;

        Ok(())
    }

    /// Whole document; empty when the file is missing or unreadable
    pub async fn load(&self) -> SnapshotDocument {
        let _guard = self.lock.lock().await;
        self.read_document().await.unwrap_or_else(|err| {
            tracing::warn!(path = %self.path.display(), "Snapshot unreadable: {err}");
            SnapshotDocument::new()
        })
    }

    pub async fn category(&self, name: &str) -> Option<AllTimeTotals> {
        self.load().await.remove(name)
    }

    /// Replace one category and rewrite the file.
    ///
    /// Fails without writing when the current file cannot be read, so the
    /// other categories are never dropped.
    pub async fn store(&self, name: &str, totals: AllTimeTotals) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;

        let mut document = self.read_document().await?;
        document.insert(name.to_string(), totals);
        self.write_document(&document).await?;

        tracing::info!(category = name, path = %self.path.display(), "Snapshot saved");
        Ok(())
    }

    /// Forget everything; the next all-time refresh scans from deployment
    pub async fn reset(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        self.write_document(&SnapshotDocument::new()).await?;

        tracing::info!(path = %self.path.display(), "Snapshot reset");
        Ok(())
    }
}
