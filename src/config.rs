//! Configuration types for crowdin-sync
//!
//! Options are resolved exactly once, before any command runs, by
//! [`resolve_options`]: command-line overrides win over `config/crowdin.toml`,
//! which wins over the built-in defaults. The resulting [`SyncOptions`] is
//! read-only for the rest of the invocation.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.crowdin.com/api";
/// Default folder name inside the export archive
pub const DEFAULT_REMOTE_FOLDER_NAME: &str = "messages";
/// Default remote file name for the source catalog
pub const DEFAULT_REMOTE_FILE_NAME: &str = "messages.pot";
/// Default local source catalog file name
pub const DEFAULT_TRANSLATIONS_FILE: &str = "messages.pot";
/// Default translations directory, relative to the project root
pub const DEFAULT_TRANSLATIONS_DIR: &str = "translations";
/// Project-local config file, relative to the project root
pub const CONFIG_FILE: &str = "config/crowdin.toml";
/// Overall deadline for one command
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5 * 60);
/// Delay between two export-status polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// The two commands the core knows how to run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    /// Upload the source catalog
    Push,
    /// Export, download and place translation files
    Pull,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Push => write!(f, "push"),
            Operation::Pull => write!(f, "pull"),
        }
    }
}

/// Fully resolved options for one push or pull
#[derive(Clone, Debug, PartialEq)]
pub struct SyncOptions {
    /// Base URL of the API (default: "https://api.crowdin.com/api")
    pub api_base_url: String,
    /// Project identifier
    pub project: String,
    /// API key, sent as the `key` query parameter
    pub api_key: String,
    /// Locales to pull; empty means all
    pub locales: Vec<String>,
    /// Folder inside the export archive holding the translation files (default: "messages")
    pub remote_folder_name: String,
    /// Remote name of the uploaded source catalog (default: "messages.pot")
    pub remote_file_name: String,
    /// Local translations directory
    pub translations_dir: PathBuf,
    /// Source catalog file name inside `translations_dir` (default: "messages.pot")
    pub translations_file: String,
    /// Parent of the per-run scratch directories
    pub tmp_dir: PathBuf,
    /// Overall deadline (default: 5 minutes)
    pub timeout: Duration,
    /// Delay between export-status polls (default: 500 ms)
    pub poll_interval: Duration,
}

impl SyncOptions {
    /// Options for a project rooted at `project_root`, with every default applied
    ///
    /// `project` and `api_key` are left empty; they have no defaults.
    pub fn for_project_root(project_root: &Path) -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            project: String::new(),
            api_key: String::new(),
            locales: Vec::new(),
            remote_folder_name: DEFAULT_REMOTE_FOLDER_NAME.to_string(),
            remote_file_name: DEFAULT_REMOTE_FILE_NAME.to_string(),
            translations_dir: project_root.join(DEFAULT_TRANSLATIONS_DIR),
            translations_file: DEFAULT_TRANSLATIONS_FILE.to_string(),
            tmp_dir: scratch_dir_for(project_root),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Path of the local source catalog
    pub fn source_catalog_path(&self) -> PathBuf {
        self.translations_dir.join(&self.translations_file)
    }

    /// Check that every option `operation` needs is present
    pub fn validate(&self, operation: Operation) -> Result<()> {
        require_non_empty("api_base_url", &self.api_base_url)?;
        require_non_empty("project", &self.project)?;
        require_non_empty("api_key", &self.api_key)?;
        require_non_empty_path("translations_dir", &self.translations_dir)?;
        require_non_empty_path("tmp_dir", &self.tmp_dir)?;

        url::Url::parse(&self.api_base_url).map_err(|e| {
            Error::config(
                "api_base_url",
                format!("invalid API base URL '{}': {}", self.api_base_url, e),
            )
        })?;

        match operation {
            Operation::Pull => {
                require_non_empty("remote_folder_name", &self.remote_folder_name)?;
            }
            Operation::Push => {
                require_non_empty("remote_file_name", &self.remote_file_name)?;
                require_non_empty("translations_file", &self.translations_file)?;
            }
        }

        if self.timeout.is_zero() {
            return Err(Error::config("timeout", "timeout must be greater than zero"));
        }

        Ok(())
    }
}

fn require_non_empty(key: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::config(key, format!("option '{}' is required", key)));
    }
    Ok(())
}

fn require_non_empty_path(key: &str, value: &Path) -> Result<()> {
    if value.as_os_str().is_empty() {
        return Err(Error::config(key, format!("option '{}' is required", key)));
    }
    Ok(())
}

/// Scratch root for a project: `<root>/tmp/.crowdin`
///
/// Each run creates its own directory below it.
pub fn scratch_dir_for(project_root: &Path) -> PathBuf {
    project_root.join("tmp").join(".crowdin")
}

/// Values read from `config/crowdin.toml`
///
/// Every field is optional; present values replace the built-in defaults.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    /// Project identifier
    #[serde(default)]
    pub project: Option<String>,
    /// API key
    #[serde(default)]
    pub api_key: Option<String>,
    /// API base URL
    #[serde(default)]
    pub api_base_url: Option<String>,
    /// Locales to pull
    #[serde(default)]
    pub locale: Option<Vec<String>>,
    /// Folder inside the export archive
    #[serde(default)]
    pub crowdin_folder_name: Option<String>,
    /// Remote name of the source catalog
    #[serde(default)]
    pub crowdin_file_name: Option<String>,
    /// Translations directory
    #[serde(default)]
    pub translations_dir: Option<PathBuf>,
    /// Source catalog file name
    #[serde(default)]
    pub translations_file: Option<String>,
}

impl FileConfig {
    /// Load `config/crowdin.toml` below `project_root`
    ///
    /// A missing file yields the empty config; an unreadable or malformed file is an error.
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = project_root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(?path, "no project config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(Error::Io(e)),
        };

        let config = Self::parse(&content).map_err(|e| Error::Config {
            message: format!("failed to parse {}: {}", path.display(), e),
            key: None,
        })?;
        debug!(?path, "loaded project config file");
        Ok(config)
    }

    /// Parse config file content
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Values given on the command line (or by an embedder)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OptionOverrides {
    /// Project identifier
    pub project: Option<String>,
    /// API key
    pub api_key: Option<String>,
    /// API base URL
    pub api_base_url: Option<String>,
    /// Locales to pull
    pub locales: Option<Vec<String>>,
    /// Folder inside the export archive
    pub remote_folder_name: Option<String>,
    /// Remote name of the source catalog
    pub remote_file_name: Option<String>,
    /// Translations directory
    pub translations_dir: Option<PathBuf>,
    /// Source catalog file name
    pub translations_file: Option<String>,
}

/// Merge overrides, file config and defaults into the final options
///
/// Relative translation directories are resolved against `project_root`.
/// Locale lists are split on commas and trimmed, so `de, es_ES` and
/// `["de", "es_ES"]` resolve to the same set.
pub fn resolve_options(
    project_root: &Path,
    overrides: OptionOverrides,
    file: FileConfig,
) -> SyncOptions {
    let mut options = SyncOptions::for_project_root(project_root);

    if let Some(project) = overrides.project.or(file.project) {
        options.project = project;
    }
    if let Some(api_key) = overrides.api_key.or(file.api_key) {
        options.api_key = api_key;
    }
    if let Some(url) = overrides.api_base_url.or(file.api_base_url) {
        options.api_base_url = url;
    }
    if let Some(locales) = overrides.locales.or(file.locale) {
        options.locales = normalize_locales(locales);
    }
    if let Some(folder) = overrides.remote_folder_name.or(file.crowdin_folder_name) {
        options.remote_folder_name = folder;
    }
    if let Some(name) = overrides.remote_file_name.or(file.crowdin_file_name) {
        options.remote_file_name = name;
    }
    if let Some(dir) = overrides.translations_dir.or(file.translations_dir) {
        options.translations_dir = if dir.is_absolute() {
            dir
        } else {
            project_root.join(dir)
        };
    }
    if let Some(name) = overrides.translations_file.or(file.translations_file) {
        options.translations_file = name;
    }

    options
}

fn normalize_locales(locales: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::new();
    for locale in locales
        .iter()
        .flat_map(|l| l.split(','))
        .map(str::trim)
        .filter(|l| !l.is_empty())
    {
        if !normalized.iter().any(|existing| existing == locale) {
            normalized.push(locale.to_string());
        }
    }
    normalized
}
