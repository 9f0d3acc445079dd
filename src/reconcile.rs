//! Locale selection and placement of pulled translation files

use crate::error::Result;
use crate::types::LocaleFile;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Locale identifier of a candidate file: its file name without extension
pub fn locale_of(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
}

/// Map candidates to destination files, keeping only requested locales
///
/// An empty `locales` list selects every candidate. Candidates whose locale was
/// not requested are dropped. Order follows `candidates`.
pub fn select_locale_files(
    candidates: &[PathBuf],
    locales: &[String],
    translations_dir: &Path,
) -> Vec<LocaleFile> {
    candidates
        .iter()
        .filter_map(|source| {
            let locale = locale_of(source)?;
            if !locales.is_empty() && !locales.iter().any(|l| *l == locale) {
                debug!(%locale, "locale not requested, skipping");
                return None;
            }

            let file_name = match source.extension() {
                Some(ext) => format!("{}.{}", locale, ext.to_string_lossy()),
                None => locale.clone(),
            };

            Some(LocaleFile {
                locale,
                source: source.clone(),
                destination: translations_dir.join(file_name),
            })
        })
        .collect()
}

/// Copy the selected candidates into `translations_dir`
///
/// Existing destination files are overwritten. Files copied before a failure
/// stay in place. Returns the destination paths in candidate order.
pub async fn reconcile(
    candidates: &[PathBuf],
    locales: &[String],
    translations_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let selected = select_locale_files(candidates, locales, translations_dir);
    if !selected.is_empty() {
        tokio::fs::create_dir_all(translations_dir).await?;
    }

    let mut destinations = Vec::with_capacity(selected.len());
    for file in selected {
        let bytes = tokio::fs::copy(&file.source, &file.destination).await?;
        debug!(locale = %file.locale, destination = ?file.destination, bytes, "copied translation file");
        destinations.push(file.destination);
    }

    info!(
        candidates = candidates.len(),
        copied = destinations.len(),
        ?translations_dir,
        "translation files placed"
    );
    Ok(destinations)
}
