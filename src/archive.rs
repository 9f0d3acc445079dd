//! Archive download and unpacking
//!
//! Fetches the finished export archive into the scratch area, unpacks it
//! next to the download and reduces its entries to the translation files
//! under the configured remote folder, in archive order.

use crate::client::{ArchiveStream, RemoteClient};
use crate::error::{CancelReason, Error, Result};
use crate::scratch::ScratchArea;
use crate::types::ArchiveEntry;
use futures::StreamExt;
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::task::spawn_blocking;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// File name of the downloaded archive inside the scratch area
pub const ARCHIVE_FILE_NAME: &str = "download-translations.zip";
/// Directory the archive is unpacked into, inside the scratch area
pub const EXTRACT_DIR_NAME: &str = "zip-extracted";

/// Resolves the remote export into local candidate files
pub struct ArchiveResolver<'a> {
    client: &'a RemoteClient,
    remote_folder: &'a str,
    cancel: CancellationToken,
}

impl<'a> ArchiveResolver<'a> {
    /// Create a resolver keeping only files below `remote_folder`
    pub fn new(client: &'a RemoteClient, remote_folder: &'a str, cancel: CancellationToken) -> Self {
        Self {
            client,
            remote_folder,
            cancel,
        }
    }

    /// Download, unpack and filter the export archive
    ///
    /// Returns absolute paths of the extracted candidate files. An empty archive,
    /// or an empty download body, yields an empty list.
    pub async fn resolve(&self, scratch: &ScratchArea) -> Result<Vec<PathBuf>> {
        let archive_path = scratch.join(ARCHIVE_FILE_NAME);
        let stream = self.client.download_archive().await?;
        let size = save_stream(stream, &archive_path).await?;
        debug!(?archive_path, size, "archive downloaded");

        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled(CancelReason::Interrupted));
        }

        if size == 0 {
            info!("export archive is empty, nothing to extract");
            return Ok(Vec::new());
        }

        let extract_dir = scratch.join(EXTRACT_DIR_NAME);
        let entries = extract_archive(&archive_path, &extract_dir, self.cancel.clone()).await?;
        let files = filter_entries(&entries, self.remote_folder);

        info!(
            entries = entries.len(),
            candidates = files.len(),
            remote_folder = self.remote_folder,
            "resolved translation archive"
        );

        Ok(files
            .iter()
            .map(|entry| entry_path(&extract_dir, entry))
            .collect())
    }
}

/// Write a byte stream to `path`, returning the number of bytes written
pub async fn save_stream(mut stream: ArchiveStream, path: &Path) -> Result<u64> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}

/// Unpack a ZIP archive on the blocking pool
pub async fn extract_archive(
    archive_path: &Path,
    dest_path: &Path,
    cancel: CancellationToken,
) -> Result<Vec<ArchiveEntry>> {
    let archive_owned = archive_path.to_path_buf();
    let dest_owned = dest_path.to_path_buf();

    spawn_blocking(move || extract_zip(&archive_owned, &dest_owned, &cancel))
        .await
        .map_err(|e| Error::Extraction(format!("extraction task panicked: {}", e)))?
}

/// Unpack a ZIP archive into `dest_path`, returning its entries in archive order
///
/// Entries whose names would escape `dest_path` are skipped. The token is checked
/// between entries.
pub fn extract_zip(
    archive_path: &Path,
    dest_path: &Path,
    cancel: &CancellationToken,
) -> Result<Vec<ArchiveEntry>> {
    std::fs::create_dir_all(dest_path)?;

    let file = std::fs::File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| {
        Error::Extraction(format!(
            "failed to read ZIP archive {}: {}",
            archive_path.display(),
            e
        ))
    })?;

    let mut entries = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled(CancelReason::Interrupted));
        }

        let mut file = archive
            .by_index(i)
            .map_err(|e| Error::Extraction(format!("failed to read ZIP entry {}: {}", i, e)))?;

        let relative = match file.enclosed_name() {
            Some(path) => path.to_path_buf(),
            None => {
                warn!(name = file.name(), "skipping entry with unsafe path");
                continue;
            }
        };
        let name = normalize_entry_name(&relative);
        if name.is_empty() {
            continue;
        }
        let target = dest_path.join(&relative);

        if file.is_dir() {
            std::fs::create_dir_all(&target)?;
            entries.push(ArchiveEntry::directory(name));
            continue;
        }

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut outfile = std::fs::File::create(&target)?;
        std::io::copy(&mut file, &mut outfile).map_err(|e| {
            Error::Extraction(format!("failed to extract {}: {}", name, e))
        })?;
        entries.push(ArchiveEntry::file(name));
    }

    debug!(?archive_path, count = entries.len(), "ZIP extraction complete");
    Ok(entries)
}

/// Keep file entries below `remote_folder`, preserving order
///
/// The folder matches whole path segments: `messages` keeps `messages/de.po`
/// but not `messages-old/de.po`. An empty folder keeps every file.
pub fn filter_entries(entries: &[ArchiveEntry], remote_folder: &str) -> Vec<ArchiveEntry> {
    let folder = remote_folder.trim_matches('/');
    let prefix = format!("{}/", folder);

    entries
        .iter()
        .filter(|entry| entry.is_file())
        .filter(|entry| folder.is_empty() || entry.path.starts_with(&prefix))
        .cloned()
        .collect()
}

/// Absolute path of an extracted entry
pub fn entry_path(extract_dir: &Path, entry: &ArchiveEntry) -> PathBuf {
    entry
        .path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(extract_dir.to_path_buf(), |path, segment| path.join(segment))
}

fn normalize_entry_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
