//! Fixture builders: options, archives, local files

use crowdin_sync::SyncOptions;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

pub const PROJECT: &str = "test-project";
pub const API_KEY: &str = "test-key";

pub const DE_PO: &[u8] = b"msgid \"Hello\"\nmsgstr \"Hallo\"\n";
pub const ES_PO: &[u8] = b"msgid \"Hello\"\nmsgstr \"Hola\"\n";

/// Options for a project rooted at `root`, talking to `base_url`, with short timings
pub fn test_options(base_url: &str, root: &Path) -> SyncOptions {
    let mut options = SyncOptions::for_project_root(root);
    options.api_base_url = base_url.to_string();
    options.project = PROJECT.to_string();
    options.api_key = API_KEY.to_string();
    options.poll_interval = Duration::from_millis(5);
    options.timeout = Duration::from_secs(10);
    options
}

/// Build an in-memory ZIP archive; `None` content means a directory entry
pub fn build_zip(entries: &[(&str, Option<&[u8]>)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
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

/// The archive Crowdin produces for a project with German and Spanish translations
pub fn messages_archive() -> Vec<u8> {
    build_zip(&[
        ("messages/", None),
        ("messages/de.po", Some(DE_PO)),
        ("messages/es_ES.po", Some(ES_PO)),
    ])
}

/// Write the local source catalog described by `options`
pub fn write_source_catalog(options: &SyncOptions, content: &[u8]) {
    std::fs::create_dir_all(&options.translations_dir).unwrap();
    std::fs::write(options.source_catalog_path(), content).unwrap();
}
