//! Shared helpers for unit tests.

use crate::config::SyncOptions;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Build an in-memory ZIP archive
///
/// Entries with `None` content are written as directories, in the given order.
pub(crate) fn build_zip(entries: &[(&str, Option<&[u8]>)]) -> Vec<u8> {
    let mut writer = ::zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options =
        ::zip::write::FileOptions::default().compression_method(::zip::CompressionMethod::Stored);
    for (name, content) in entries {
        match content {
            Some(bytes) => {
                writer.start_file(*name, options).unwrap();
                writer.write_all(bytes).unwrap();
            }
            None => {
                writer.add_directory(*name, options).unwrap();
            }
        }
    }
    writer.finish().unwrap().into_inner()
}

/// Options pointing at a mock server, rooted at `root`, with short timings
pub(crate) fn test_options(base_url: &str, root: &Path) -> SyncOptions {
    let mut options = SyncOptions::for_project_root(root);
    options.api_base_url = base_url.to_string();
    options.project = "test-project".into();
    options.api_key = "test-key".into();
    options.poll_interval = Duration::from_millis(5);
    options.timeout = Duration::from_secs(10);
    options
}
