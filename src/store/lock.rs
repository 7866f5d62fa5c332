use crate::Result;
use fs4::fs_std::FileExt;
use ohno::IntoAppError;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

const LOG_TARGET: &str = "     store";

const LOCK_FILE: &str = "hubcrawl.lock";

/// Exclusive hold on a data directory for the length of a crawl.
///
/// Released on drop. A second crawl of the same directory waits in [`DataDirLock::acquire`]
/// until the first one lets go.
#[derive(Debug)]
pub struct DataDirLock {
    file: File,
    path: PathBuf,
}

impl DataDirLock {
    /// Create `data_dir` if needed and lock its `hubcrawl.lock` file.
    pub async fn acquire(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir).into_app_err_with(|| format!("unable to create directory '{}'", data_dir.display()))?;

        let path = data_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .into_app_err_with(|| format!("unable to open lock file '{}'", path.display()))?;

        let free = file
            .try_lock_exclusive()
            .into_app_err_with(|| format!("unable to lock '{}'", path.display()))?;
        if free {
            log::debug!(target: LOG_TARGET, "Locked '{}'", path.display());
            return Ok(Self { file, path });
        }

        log::info!(target: LOG_TARGET, "Another crawl holds '{}', waiting for it to finish", path.display());
        tokio::task::spawn_blocking(move || {
            file.lock_exclusive()
                .into_app_err_with(|| format!("unable to lock '{}'", path.display()))?;
            log::debug!(target: LOG_TARGET, "Locked '{}' after waiting", path.display());
            Ok::<_, ohno::AppError>(Self { file, path })
        })
        .await
        .into_app_err("lock task panicked")?
    }
}

impl Drop for DataDirLock {
    fn drop(&mut self) {
        match self.file.unlock() {
            Ok(()) => log::trace!(target: LOG_TARGET, "Released '{}'", self.path.display()),
            Err(e) => log::warn!(target: LOG_TARGET, "Could not release '{}': {e}", self.path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri does not support file locking")]
    async fn test_lock_creates_directory_and_is_reacquirable() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");

        let lock = DataDirLock::acquire(&data_dir).await.unwrap();
        assert!(data_dir.join(LOCK_FILE).exists());
        drop(lock);

        let _lock = DataDirLock::acquire(&data_dir).await.unwrap();
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri does not support file locking")]
    async fn test_second_crawl_waits_for_release() {
        let dir = tempfile::tempdir().unwrap();
        let first = DataDirLock::acquire(dir.path()).await.unwrap();

        let data_dir = dir.path().to_path_buf();
        let waiter = tokio::spawn(async move { DataDirLock::acquire(&data_dir).await.map(drop) });

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!waiter.is_finished());

        drop(first);
        tokio::time::timeout(Duration::from_secs(5), waiter).await.unwrap().unwrap().unwrap();
    }
}
