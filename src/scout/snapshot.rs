//! Private working copy of a browser profile
//!
//! The source profile is never opened directly. On first use it is copied into
//! a scratch directory (skipping cache folders) and the browser runs against
//! the copy. Materialisation is lazy and happens at most once per successful
//! copy, however many callers race on first access:
//!
//! ```text
//! Uninitialized --(first caller, under lock)--> Copying --> Ready
//!       ^                                          |
//!       +---------------- copy failed -------------+
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Materialisation state of a [`ProfileSnapshot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotState {
    Uninitialized,
    Copying,
    Ready,
}

/// Recursive copy with directory-name exclusions
pub trait ProfileCloner: Send + Sync {
    /// Copy `source` into `dest`, skipping any directory whose name is in
    /// `excluded`. Returns the number of files copied.
    fn clone_profile(&self, source: &Path, dest: &Path, excluded: &[String]) -> io::Result<u64>;
}

/// Filesystem implementation backed by walkdir
pub struct FsProfileCloner;

impl ProfileCloner for FsProfileCloner {
    fn clone_profile(&self, source: &Path, dest: &Path, excluded: &[String]) -> io::Result<u64> {
        let mut copied = 0u64;

        let walker = WalkDir::new(source).into_iter().filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !excluded
                    .iter()
                    .any(|name| entry.file_name().to_string_lossy() == name.as_str())
        });

        for entry in walker {
            let entry = entry.map_err(io::Error::other)?;
            let relative = entry
                .path()
                .strip_prefix(source)
                .map_err(io::Error::other)?;
            let target = dest.join(relative);

            let file_type = entry.file_type();
            if file_type.is_dir() {
                fs::create_dir_all(&target)?;
            } else if file_type.is_file() {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(entry.path(), &target)?;
                copied += 1;
            } else {
                // Chrome keeps lock files as symlinks; they must not follow the copy
                debug!(path = %entry.path().display(), "Skipping non-regular file");
            }
        }

        Ok(copied)
    }
}

/// Lazily materialised copy of a browser profile
pub struct ProfileSnapshot {
    source: Option<PathBuf>,
    working_dir: PathBuf,
    excluded: Vec<String>,
    cloner: Arc<dyn ProfileCloner>,
    state: parking_lot::Mutex<SnapshotState>,
    init_lock: tokio::sync::Mutex<()>,
}

impl ProfileSnapshot {
    /// Create a snapshot with a fresh scratch directory under the system temp dir
    pub fn new(
        source: Option<PathBuf>,
        excluded: Vec<String>,
        cloner: Arc<dyn ProfileCloner>,
    ) -> io::Result<Self> {
        let working_dir = std::env::temp_dir().join(format!(
            "researcher_agent_profile_{}",
            uuid::Uuid::new_v4().simple()
        ));
        Self::with_working_dir(source, working_dir, excluded, cloner)
    }

    /// Create a snapshot that copies into `working_dir`
    pub fn with_working_dir(
        source: Option<PathBuf>,
        working_dir: PathBuf,
        excluded: Vec<String>,
        cloner: Arc<dyn ProfileCloner>,
    ) -> io::Result<Self> {
        fs::create_dir_all(&working_dir)?;
        Ok(Self {
            source,
            working_dir,
            excluded,
            cloner,
            state: parking_lot::Mutex::new(SnapshotState::Uninitialized),
            init_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn state(&self) -> SnapshotState {
        *self.state.lock()
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    fn set_state(&self, state: SnapshotState) {
        *self.state.lock() = state;
    }

    /// Materialise the copy if no caller has done so yet.
    ///
    /// A missing source profile still ends in `Ready` (the session runs
    /// without cookies). A failed copy returns to `Uninitialized` so a later
    /// caller can try again.
    pub async fn ensure_ready(&self) -> SnapshotState {
        if self.state() == SnapshotState::Ready {
            return SnapshotState::Ready;
        }

        let _guard = self.init_lock.lock().await;
        if self.state() == SnapshotState::Ready {
            return SnapshotState::Ready;
        }

        let source = match &self.source {
            Some(path) if path.exists() => path.clone(),
            _ => {
                warn!(
                    source = ?self.source,
                    "Source profile not found. Deep search may lack cookies."
                );
                self.set_state(SnapshotState::Ready);
                return SnapshotState::Ready;
            }
        };

        self.set_state(SnapshotState::Copying);
        info!(source = %source.display(), "Creating profile snapshot");

        let cloner = Arc::clone(&self.cloner);
        let dest = self.working_dir.clone();
        let excluded = self.excluded.clone();
        let outcome =
            tokio::task::spawn_blocking(move || cloner.clone_profile(&source, &dest, &excluded))
                .await;

        let next = match outcome {
            Ok(Ok(files)) => {
                info!(files, "Snapshot created successfully");
                SnapshotState::Ready
            }
            Ok(Err(e)) => {
                error!(error = %e, "Failed to snapshot profile");
                SnapshotState::Uninitialized
            }
            Err(e) => {
                error!(error = %e, "Snapshot task aborted");
                SnapshotState::Uninitialized
            }
        };
        self.set_state(next);
        next
    }

    /// Delete the working copy. Errors are logged, not returned.
    pub fn remove(&self) {
        info!(path = %self.working_dir.display(), "Cleaning up snapshot");
        if let Err(e) = fs::remove_dir_all(&self.working_dir) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(error = %e, "Failed to remove snapshot directory");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    struct CountingCloner {
        calls: AtomicUsize,
        fail: bool,
    }

    impl ProfileCloner for CountingCloner {
        fn clone_profile(&self, _: &Path, _: &Path, _: &[String]) -> io::Result<u64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(50));
            if self.fail {
                Err(io::Error::other("disk full"))
            } else {
                Ok(1)
            }
        }
    }

    fn excluded() -> Vec<String> {
        vec!["Cache".to_string(), "GPUCache".to_string()]
    }

    #[test]
    fn test_fs_cloner_skips_excluded_dirs() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("Default/Cache")).unwrap();
        fs::create_dir_all(src.path().join("Default/GPUCache")).unwrap();
        fs::write(src.path().join("Default/Cookies"), b"c").unwrap();
        fs::write(src.path().join("Default/Cache/blob"), b"x").unwrap();
        fs::write(src.path().join("Default/GPUCache/blob"), b"x").unwrap();
        fs::write(src.path().join("Local State"), b"{}").unwrap();

        let copied = FsProfileCloner
            .clone_profile(src.path(), dst.path(), &excluded())
            .unwrap();

        assert_eq!(copied, 2);
        assert!(dst.path().join("Default/Cookies").exists());
        assert!(dst.path().join("Local State").exists());
        assert!(!dst.path().join("Default/Cache").exists());
        assert!(!dst.path().join("Default/GPUCache").exists());
    }

    #[test]
    fn test_fs_cloner_keeps_files_named_like_excluded_dirs() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::write(src.path().join("Cache"), b"file, not dir").unwrap();

        let copied = FsProfileCloner
            .clone_profile(src.path(), dst.path(), &excluded())
            .unwrap();
        assert_eq!(copied, 1);
        assert!(dst.path().join("Cache").is_file());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_access_copies_once() {
        let src = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let cloner = Arc::new(CountingCloner {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let snapshot = Arc::new(
            ProfileSnapshot::with_working_dir(
                Some(src.path().to_path_buf()),
                work.path().join("copy"),
                excluded(),
                cloner.clone(),
            )
            .unwrap(),
        );

        let mut handles = Vec::new();
        for _ in 0..16 {
            let snapshot = snapshot.clone();
            handles.push(tokio::spawn(async move { snapshot.ensure_ready().await }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), SnapshotState::Ready);
        }

        assert_eq!(cloner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(snapshot.state(), SnapshotState::Ready);
    }

    #[tokio::test]
    async fn test_missing_source_marks_ready_without_copy() {
        let work = TempDir::new().unwrap();
        let cloner = Arc::new(CountingCloner {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let snapshot = ProfileSnapshot::with_working_dir(
            Some(PathBuf::from("/definitely/not/a/profile")),
            work.path().join("copy"),
            excluded(),
            cloner.clone(),
        )
        .unwrap();

        assert_eq!(snapshot.state(), SnapshotState::Uninitialized);
        assert_eq!(snapshot.ensure_ready().await, SnapshotState::Ready);
        assert_eq!(cloner.calls.load(Ordering::SeqCst), 0);

        let unset = ProfileSnapshot::with_working_dir(
            None,
            work.path().join("copy2"),
            excluded(),
            cloner.clone(),
        )
        .unwrap();
        assert_eq!(unset.ensure_ready().await, SnapshotState::Ready);
        assert_eq!(cloner.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_copy_can_be_retried() {
        let src = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let cloner = Arc::new(CountingCloner {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let snapshot = ProfileSnapshot::with_working_dir(
            Some(src.path().to_path_buf()),
            work.path().join("copy"),
            excluded(),
            cloner.clone(),
        )
        .unwrap();

        assert_eq!(snapshot.ensure_ready().await, SnapshotState::Uninitialized);
        assert_eq!(snapshot.ensure_ready().await, SnapshotState::Uninitialized);
        assert_eq!(cloner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_remove_deletes_working_copy() {
        let work = TempDir::new().unwrap();
        let dir = work.path().join("copy");
        let snapshot = ProfileSnapshot::with_working_dir(
            None,
            dir.clone(),
            excluded(),
            Arc::new(FsProfileCloner),
        )
        .unwrap();
        fs::write(dir.join("Cookies"), b"c").unwrap();
        assert!(dir.exists());

        snapshot.remove();
        assert!(!dir.exists());
        // second removal is a no-op
        snapshot.remove();
    }
}
