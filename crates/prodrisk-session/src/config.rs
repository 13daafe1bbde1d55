//! Session configuration.
//!
//! Stored in `~/.prodrisk/config.toml`. Partial files are accepted; missing
//! values fall back to the defaults below.

use std::path::{Path, PathBuf};

use prodrisk_core::{ProdriskError, ProdriskResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub license: LicenseConfig,
    pub logging: LoggingConfig,
    pub solver: SolverConfig,
}

/// Engine license lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseConfig {
    /// Directory holding the license file. When set, the license environment
    /// variables are exported before the engine is created.
    pub path: Option<PathBuf>,

    /// License file name inside `path`.
    pub file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Only warnings and errors reach the console; also passed to the engine.
    pub silent: bool,

    /// Write log output to this file instead of stderr.
    pub log_file: Option<PathBuf>,

    /// Disable log output entirely.
    pub suppress_log: bool,

    /// Log every attribute read at debug level.
    pub log_gets: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            silent: true,
            log_file: None,
            suppress_log: false,
            log_gets: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Directory of the engine binaries.
    pub prodrisk_path: PathBuf,

    pub mpi_path: PathBuf,

    pub use_coin_osi: bool,

    /// Keep the engine's working directory after the session ends.
    pub keep_working_directory: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            prodrisk_path: PathBuf::from("C:/PRODRISK/ltm_core_bin/"),
            mpi_path: PathBuf::from("C:/Program Files/Microsoft MPI/Bin"),
            use_coin_osi: true,
            keep_working_directory: false,
        }
    }
}

impl SessionConfig {
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".prodrisk"))
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Load from the default location, or defaults if there is no file.
    pub fn load() -> ProdriskResult<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> ProdriskResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| ProdriskError::Config(format!("{}: {e}", path.display())))
    }

    pub fn save_to(&self, path: &Path) -> ProdriskResult<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ProdriskError::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn license_file(&self) -> &str {
        self.license.file.as_deref().unwrap_or("LTM_License.dat")
    }
}
