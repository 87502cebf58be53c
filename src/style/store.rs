use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::Mutex;

use super::guide::StyleGuide;
use crate::error::{GhostpostError, LockedStoreError, StoreError};
use crate::utils::fs::write_atomic;

/// Versioned, lockable style guide backed by a JSON file.
///
/// Readers take lock-free snapshots. Writers are serialised through an async
/// mutex and persist with a temp-file rename before the new snapshot is
/// published, so a failed write leaves both disk and memory untouched.
pub struct StyleStore {
    path: PathBuf,
    current: ArcSwap<StyleGuide>,
    writer: Mutex<()>,
}

impl StyleStore {
    /// Load the guide at `path`, or start from the built-in (locked) default
    /// when the file does not exist yet. Nothing is written until the first
    /// successful update.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let guide = if path.exists() {
            read_guide(&path)?
        } else {
            tracing::debug!(path = %path.display(), "style guide not found, using default");
            StyleGuide::default()
        };
        Ok(Self {
            path,
            current: ArcSwap::from_pointee(guide),
            writer: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current guide. Lock-free.
    pub fn snapshot(&self) -> Arc<StyleGuide> {
        self.current.load_full()
    }

    /// Fail fast when a write would be refused.
    pub fn ensure_writable(&self, force: bool) -> Result<(), LockedStoreError> {
        let guide = self.current.load();
        if guide.locked && !force {
            return Err(LockedStoreError {
                version: guide.version,
            });
        }
        Ok(())
    }

    /// Apply `mutate` to a copy of the guide and persist it.
    ///
    /// `force` overrides the lock for this write only; the `locked` flag
    /// itself is carried over unchanged.
    pub async fn update<F>(&self, force: bool, mutate: F) -> Result<Arc<StyleGuide>, GhostpostError>
    where
        F: FnOnce(&mut StyleGuide),
    {
        let _guard = self.writer.lock().await;
        self.ensure_writable(force)?;

        let mut next = StyleGuide::clone(&self.current.load());
        let locked = next.locked;
        mutate(&mut next);
        next.locked = locked;

        self.persist(next)
    }

    /// Lock or unlock the guide. Unlocking needs `force`.
    pub async fn set_locked(
        &self,
        locked: bool,
        force: bool,
    ) -> Result<Arc<StyleGuide>, GhostpostError> {
        let _guard = self.writer.lock().await;
        let current = self.current.load_full();
        if current.locked == locked {
            return Ok(current);
        }
        if !locked && !force {
            return Err(LockedStoreError {
                version: current.version,
            }
            .into());
        }

        let mut next = StyleGuide::clone(&current);
        next.locked = locked;
        self.persist(next)
    }

    fn persist(&self, guide: StyleGuide) -> Result<Arc<StyleGuide>, GhostpostError> {
        let json = serde_json::to_string_pretty(&guide).map_err(|e| StoreError::Write {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;
        write_atomic(&self.path, &json).map_err(|e| StoreError::Write {
            path: self.path.display().to_string(),
            message: format!("{e:#}"),
        })?;

        let guide = Arc::new(guide);
        self.current.store(Arc::clone(&guide));
        tracing::info!(
            path = %self.path.display(),
            version = guide.version,
            locked = guide.locked,
            "style guide saved"
        );
        Ok(guide)
    }
}

fn read_guide(path: &Path) -> Result<StyleGuide, StoreError> {
    let raw = std::fs::read_to_string(path).map_err(|e| StoreError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unlocked_guide_file(dir: &Path) -> PathBuf {
        let path = dir.join("style_guide.json");
        let guide = StyleGuide {
            locked: false,
            ..StyleGuide::default()
        };
        std::fs::write(&path, serde_json::to_string(&guide).unwrap()).unwrap();
        path
    }

    #[test]
    fn missing_file_opens_locked_default_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("style_guide.json");

        let store = StyleStore::open(&path).unwrap();

        assert!(store.snapshot().locked);
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("style_guide.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = StyleStore::open(&path).err().unwrap();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn locked_update_is_refused_and_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("style_guide.json");
        std::fs::write(&path, serde_json::to_string(&StyleGuide::default()).unwrap()).unwrap();
        let before = std::fs::read(&path).unwrap();

        let store = StyleStore::open(&path).unwrap();
        let err = store
            .update(false, |g| g.version += 1)
            .await
            .unwrap_err();

        assert!(matches!(err, GhostpostError::Locked(LockedStoreError { version: 1 })));
        assert_eq!(std::fs::read(&path).unwrap(), before);
        assert_eq!(store.snapshot().version, 1);
    }

    #[tokio::test]
    async fn forced_update_keeps_lock_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("style_guide.json");
        let store = StyleStore::open(&path).unwrap();

        let saved = store
            .update(true, |g| {
                g.version += 1;
                g.locked = false;
            })
            .await
            .unwrap();

        assert_eq!(saved.version, 2);
        assert!(saved.locked);
        let on_disk: StyleGuide =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk, *saved);
    }

    #[tokio::test]
    async fn unlocked_update_persists_and_swaps_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = StyleStore::open(unlocked_guide_file(dir.path())).unwrap();
        let before = store.snapshot();

        store
            .update(false, |g| g.tone_rules.push("direct".into()))
            .await
            .unwrap();

        assert!(!before.tone_rules.contains(&"direct".to_string()));
        assert!(store.snapshot().tone_rules.contains(&"direct".to_string()));
    }

    #[tokio::test]
    async fn unlock_requires_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("style_guide.json");
        let store = StyleStore::open(&path).unwrap();

        assert!(store.set_locked(false, false).await.is_err());
        assert!(!path.exists());

        let unlocked = store.set_locked(false, true).await.unwrap();
        assert!(!unlocked.locked);

        let relocked = store.set_locked(true, false).await.unwrap();
        assert!(relocked.locked);
        assert_eq!(relocked.version, 1);
    }
}
