//! Configuration loading.
//!
//! Files are loaded in order, later values winning:
//! 1. `<config dir>/cancionero/config.toml` (user)
//! 2. `./cancionero.toml` (local), or the `--config` path instead of it
//! 3. Environment variables (`CANCIONERO_DATABASE`, `CANCIONERO_LOG`)
//!
//! ```toml
//! log_level = "debug"
//!
//! [database]
//! path = "~/cancionero/songs.sqlite"
//!
//! [import]
//! default_artist = "AVIVA Worship"
//! default_key = "C"
//! no_lyrics_marker = "(Sin letra disponible"
//!
//! [[diagrams]]
//! name = "Asus2/E"
//! frets = [0, 0, 2, 2, 0, 0]
//! fingers = [0, 0, 1, 2, 0, 0]
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::Deserialize;

use crate::chords::{ChordDiagram, DiagramTable};
use crate::db::default_db_path;
use crate::error::ConfigError;
use crate::importer::ImportSettings;

const LOCAL_CONFIG: &str = "cancionero.toml";
const USER_CONFIG: &str = "cancionero/config.toml";
const DATABASE_ENV: &str = "CANCIONERO_DATABASE";
const LOG_ENV: &str = "CANCIONERO_LOG";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub log_level: String,
    pub import: ImportSettings,
    /// Extra chord diagrams layered over the built-in table.
    pub diagrams: Vec<ChordDiagram>,
    pub sources: ConfigSources,
}

/// Where the configuration came from. Logged at debug level on startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSources {
    pub files: Vec<PathBuf>,
    pub env_overrides: Vec<String>,
}

/// One config file as written; every field optional so files can be layered.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    log_level: Option<String>,
    database: DatabaseSection,
    import: ImportSection,
    diagrams: Vec<ChordDiagram>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DatabaseSection {
    path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ImportSection {
    default_artist: Option<String>,
    default_key: Option<String>,
    no_lyrics_marker: Option<String>,
    section_labels: Option<Vec<String>>,
}

impl ConfigFile {
    fn merge(mut self, other: ConfigFile) -> ConfigFile {
        self.log_level = other.log_level.or(self.log_level);
        self.database.path = other.database.path.or(self.database.path);
        self.import.default_artist = other.import.default_artist.or(self.import.default_artist);
        self.import.default_key = other.import.default_key.or(self.import.default_key);
        self.import.no_lyrics_marker = other
            .import
            .no_lyrics_marker
            .or(self.import.no_lyrics_marker);
        self.import.section_labels = other.import.section_labels.or(self.import.section_labels);
        self.diagrams.extend(other.diagrams);
        self
    }
}

impl Config {
    /// Load from the standard locations and the process environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(&discover_config_files(config_path), |name| env::var(name).ok())
    }

    /// Load from explicit files, reading overrides through `env`.
    pub fn load_from<F>(files: &[PathBuf], env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut sources = ConfigSources::default();
        let mut merged = ConfigFile::default();
        for path in files {
            merged = merged.merge(load_file(path)?);
            sources.files.push(path.clone());
        }

        if let Some(path) = env(DATABASE_ENV).filter(|v| !v.trim().is_empty()) {
            merged.database.path = Some(path);
            sources.env_overrides.push(DATABASE_ENV.to_string());
        }
        if let Some(level) = env(LOG_ENV).filter(|v| !v.trim().is_empty()) {
            merged.log_level = Some(level);
            sources.env_overrides.push(LOG_ENV.to_string());
        }

        let database_path = match merged.database.path {
            Some(path) => expand_home(&path),
            None => default_db_path().map_err(|_| ConfigError::Missing("database.path"))?,
        };

        let defaults = ImportSettings::default();
        let import = ImportSettings {
            default_artist: merged.import.default_artist.unwrap_or(defaults.default_artist),
            default_key: merged.import.default_key.unwrap_or(defaults.default_key),
            no_lyrics_marker: merged
                .import
                .no_lyrics_marker
                .unwrap_or(defaults.no_lyrics_marker),
            section_labels: merged.import.section_labels.unwrap_or(defaults.section_labels),
        };

        Ok(Config {
            database_path,
            log_level: merged
                .log_level
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            import,
            diagrams: merged.diagrams,
            sources,
        })
    }

    /// Built-in diagrams with the configured ones layered on top.
    pub fn diagram_table(&self) -> DiagramTable {
        let mut table = DiagramTable::standard();
        table.extend(self.diagrams.iter().cloned());
        table
    }
}

/// Config files that exist, in load order. An explicit path replaces the
/// local file and is returned even if missing so the read error surfaces.
pub fn discover_config_files(config_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    if let Some(dirs) = BaseDirs::new() {
        let user = dirs.config_dir().join(USER_CONFIG);
        if user.exists() {
            files.push(user);
        }
    }

    match config_path {
        Some(path) => files.push(path.to_path_buf()),
        None => {
            let local = PathBuf::from(LOCAL_CONFIG);
            if local.exists() {
                files.push(local);
            }
        }
    }

    files
}

fn load_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Expand a leading `~/` to the home directory.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(dirs) = BaseDirs::new() {
            return dirs.home_dir().join(rest);
        }
    }
    PathBuf::from(path)
}
