//! Shared entity store: one lock around all tables, staged writes, optional snapshot file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use libris_kernel::settings::DatabaseSettings;
use libris_kernel::{LibraryError, LibraryResult};
use tokio::sync::RwLock;

use crate::lock::SnapshotLock;
use crate::repository::Tables;

pub struct Store {
    tables: RwLock<Tables>,
    snapshot: Option<PathBuf>,
    _lock: Option<SnapshotLock>,
}

impl Store {
    /// A store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            tables: RwLock::new(Tables::new()),
            snapshot: None,
            _lock: None,
        }
    }

    /// Open the store described by `settings`, loading the snapshot file when one exists.
    ///
    /// A snapshot-backed store holds an exclusive lock on the file until it is
    /// dropped; opening the same snapshot again meanwhile fails.
    pub async fn open(settings: &DatabaseSettings) -> anyhow::Result<Self> {
        match &settings.snapshot_path {
            Some(path) => Self::from_snapshot(path).await,
            None => Ok(Self::in_memory()),
        }
    }

    async fn from_snapshot(path: &Path) -> anyhow::Result<Self> {
        let lock = SnapshotLock::acquire(path)?;
        let tables = match tokio::fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("failed to parse snapshot {}", path.display()))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    target: "libris-db",
                    path = %path.display(),
                    "no snapshot yet, starting empty"
                );
                Tables::new()
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read snapshot {}", path.display()))
            }
        };

        let (books, readers, administrators) = tables.counts();
        tracing::info!(
            target: "libris-db",
            path = %path.display(),
            books,
            readers,
            administrators,
            "snapshot loaded"
        );

        Ok(Self {
            tables: RwLock::new(tables),
            snapshot: Some(path.to_path_buf()),
            _lock: Some(lock),
        })
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_deref()
    }

    /// Run `f` against a consistent view of the tables.
    pub async fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> R {
        let guard = self.tables.read().await;
        f(&guard)
    }

    /// Run a check-then-act sequence atomically.
    ///
    /// The write lock is held for the whole call. `f` mutates a staged copy;
    /// the copy replaces the live tables only if `f` succeeds and the snapshot
    /// (when configured) is written, so a failed operation leaves no trace.
    pub async fn write<R>(
        &self,
        f: impl FnOnce(&mut Tables) -> LibraryResult<R>,
    ) -> LibraryResult<R> {
        let mut guard = self.tables.write().await;
        let mut staged = guard.clone();
        let outcome = f(&mut staged)?;

        if let Some(path) = &self.snapshot {
            persist(path, &staged)
                .await
                .map_err(|err| LibraryError::Storage(format!("{err:#}")))?;
        }

        *guard = staged;
        Ok(outcome)
    }

    /// Write the current tables to the snapshot file, if one is configured.
    pub async fn flush(&self) -> anyhow::Result<()> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };
        let guard = self.tables.read().await;
        persist(path, &guard).await
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::in_memory()
    }
}

async fn persist(path: &Path, tables: &Tables) -> anyhow::Result<()> {
    let bytes = serde_json::to_vec_pretty(tables).context("failed to encode snapshot")?;

    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    // Write-then-rename: the snapshot path only ever holds a complete document.
    let staging = path.with_extension("json.tmp");
    tokio::fs::write(&staging, &bytes)
        .await
        .with_context(|| format!("failed to write {}", staging.display()))?;
    tokio::fs::rename(&staging, path)
        .await
        .with_context(|| format!("failed to replace {}", path.display()))?;

    tracing::debug!(
        target: "libris-db",
        path = %path.display(),
        bytes = bytes.len(),
        "snapshot written"
    );
    Ok(())
}
