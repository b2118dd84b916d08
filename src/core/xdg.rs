//! XDG Base Directory support.
//!
//! Resolves where kbase keeps its config file, vector index and logs,
//! and copies a legacy `./kbase.toml` into the config directory.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const APP: &str = "kbase";

/// Resolved directories for kbase
#[derive(Debug, Clone)]
pub struct XdgDirs {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub state_dir: PathBuf,
}

/// `KBASE_*` override, then `$XDG_*/kbase`, then `~/<fallback>/kbase`
fn resolve(override_var: &str, xdg_var: &str, fallback: &[&str]) -> PathBuf {
    if let Ok(dir) = env::var(override_var) {
        return PathBuf::from(dir);
    }
    if let Ok(xdg) = env::var(xdg_var) {
        if !xdg.is_empty() {
            return PathBuf::from(xdg).join(APP);
        }
    }

    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    for part in fallback {
        path.push(part);
    }
    path.join(APP)
}

impl XdgDirs {
    /// Resolve every directory from the environment.
    ///
    /// Priority (highest first): `KBASE_CONFIG_DIR` / `KBASE_DATA_DIR` /
    /// `KBASE_STATE_DIR`, then the matching `XDG_*_HOME`, then the XDG
    /// defaults under the home directory.
    pub fn new() -> Self {
        Self {
            config_dir: resolve("KBASE_CONFIG_DIR", "XDG_CONFIG_HOME", &[".config"]),
            data_dir: resolve("KBASE_DATA_DIR", "XDG_DATA_HOME", &[".local", "share"]),
            state_dir: resolve("KBASE_STATE_DIR", "XDG_STATE_HOME", &[".local", "state"]),
        }
    }

    /// Config file path; `KBASE_CONFIG` names an explicit file
    pub fn config_file(&self) -> PathBuf {
        match env::var("KBASE_CONFIG") {
            Ok(file) => PathBuf::from(file),
            Err(_) => self.config_dir.join("config.toml"),
        }
    }

    /// Default root of the vector index tables
    pub fn index_dir(&self) -> PathBuf {
        self.data_dir.join("index")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.state_dir.join("logs")
    }

    /// Create the config, index and log directories
    pub fn ensure_dirs_exist(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.config_dir)?;
        fs::create_dir_all(self.index_dir())?;
        fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }

    pub fn log_paths(&self) {
        tracing::debug!("Config file: {:?}", self.config_file());
        tracing::debug!("Index dir: {:?}", self.index_dir());
        tracing::debug!("Logs dir: {:?}", self.logs_dir());
    }
}

impl Default for XdgDirs {
    fn default() -> Self {
        Self::new()
    }
}

/// Legacy config location, relative to the working directory
pub const LEGACY_CONFIG: &str = "kbase.toml";

/// Copy `./kbase.toml` to the XDG config file when the latter is absent.
///
/// The legacy file is left in place.
pub fn migrate_legacy_paths(xdg: &XdgDirs) -> std::io::Result<()> {
    let legacy = Path::new(LEGACY_CONFIG);
    let target = xdg.config_file();

    if legacy.exists() && !target.exists() {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(legacy, &target)?;
        tracing::info!("Copied legacy config {:?} to {:?}", legacy, target);
    }

    Ok(())
}
