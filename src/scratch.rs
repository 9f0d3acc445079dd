//! Per-invocation scratch directory
//!
//! Every run gets its own uniquely named directory below the configured
//! scratch root, so concurrent runs on one project never share files.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// Name prefix of per-run scratch directories
const RUN_DIR_PREFIX: &str = "run-";

/// Attempts at creating the run directory while another run prunes the root
const CREATE_ATTEMPTS: u32 = 3;

/// Directory owned by one running command
///
/// Created when the command starts and removed when it ends. The command
/// lifecycle calls [`ScratchArea::remove`] on every exit path; if the owning
/// future is dropped first, the directory is removed on drop instead.
#[derive(Debug)]
pub struct ScratchArea {
    dir: TempDir,
    root: PathBuf,
}

impl ScratchArea {
    /// Create a fresh run directory below `root`, creating `root` if needed
    pub async fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let mut attempt = 1;

        loop {
            tokio::fs::create_dir_all(&root).await?;
            match tempfile::Builder::new()
                .prefix(RUN_DIR_PREFIX)
                .tempdir_in(&root)
            {
                Ok(dir) => {
                    debug!(path = ?dir.path(), "created scratch directory");
                    return Ok(Self { dir, root });
                }
                // The root was pruned by a run finishing in between
                Err(e) if e.kind() == std::io::ErrorKind::NotFound && attempt < CREATE_ATTEMPTS => {
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Scratch directory path
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of an entry inside the scratch directory
    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Remove the directory and everything in it
    ///
    /// A directory that is already gone counts as removed. The scratch root is
    /// pruned too once no other run is using it.
    pub async fn remove(self) -> Result<()> {
        let Self { dir, root } = self;
        let path = dir.path().to_path_buf();

        let removed = tokio::task::spawn_blocking(move || dir.close())
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;
        match removed {
            Ok(()) => debug!(?path, "removed scratch directory"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        // Fails while other runs still own directories below the root
        if tokio::fs::remove_dir(&root).await.is_ok() {
            debug!(?root, "removed empty scratch root");
        }
        Ok(())
    }
}
