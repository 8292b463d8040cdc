//! Exclusive lock on a snapshot file, held for the lifetime of a [`Store`](crate::Store).
//!
//! The lock lives in a `<snapshot>.lock` sidecar so the snapshot itself can be
//! replaced by rename while the lock stays put.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use fs2::FileExt;

#[derive(Debug)]
pub struct SnapshotLock {
    file: File,
    path: PathBuf,
}

impl SnapshotLock {
    /// Take the lock for `snapshot`, failing at once if another handle holds it.
    pub fn acquire(snapshot: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = snapshot.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let path = lock_path(snapshot);
        // No truncate here: the current holder's pid must survive a failed attempt.
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("failed to open lock file {}", path.display()))?;

        if file.try_lock_exclusive().is_err() {
            let mut holder = String::new();
            let _ = file.read_to_string(&mut holder);
            let holder = holder.trim();
            if holder.is_empty() {
                anyhow::bail!("snapshot {} is in use by another process", snapshot.display());
            }
            anyhow::bail!(
                "snapshot {} is in use by another process (pid {holder})",
                snapshot.display()
            );
        }

        file.set_len(0)
            .and_then(|_| file.seek(SeekFrom::Start(0)))
            .and_then(|_| write!(file, "{}", std::process::id()))
            .and_then(|_| file.flush())
            .with_context(|| format!("failed to record pid in {}", path.display()))?;

        tracing::debug!(target: "libris-db", path = %path.display(), "snapshot lock acquired");
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SnapshotLock {
    fn drop(&mut self) {
        let _ = self.file.set_len(0);
        let _ = FileExt::unlock(&self.file);
        tracing::debug!(target: "libris-db", path = %self.path.display(), "snapshot lock released");
    }
}

fn lock_path(snapshot: &Path) -> PathBuf {
    let mut name = snapshot.as_os_str().to_os_string();
    name.push(".lock");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_holder_is_refused_until_release() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("library.json");

        let first = SnapshotLock::acquire(&snapshot).unwrap();
        assert_eq!(first.path(), dir.path().join("library.json.lock"));

        let err = SnapshotLock::acquire(&snapshot).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("in use"), "{message}");
        assert!(message.contains(&std::process::id().to_string()), "{message}");

        drop(first);
        assert!(SnapshotLock::acquire(&snapshot).is_ok());
    }

    #[test]
    fn distinct_snapshots_lock_independently() {
        let dir = tempfile::tempdir().unwrap();
        let _one = SnapshotLock::acquire(&dir.path().join("one.json")).unwrap();
        assert!(SnapshotLock::acquire(&dir.path().join("two.json")).is_ok());
    }
}
