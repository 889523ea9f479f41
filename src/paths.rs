//! Config and data file locations.
//!
//! Priority for both directories:
//! 1. CLI `--config-dir`
//! 2. `LIGHTRIG_CONFIG_DIR` environment variable
//! 3. Current folder, if it already holds `lightrig.json` or `lightrig.log`
//! 4. Platform directory from dirs-next (`~/.config/lightrig`, `~/.local/share/lightrig`, ...)

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "LIGHTRIG_CONFIG_DIR";
pub const SETTINGS_FILE: &str = "lightrig.json";
pub const LOG_FILE: &str = "lightrig.log";

const APP_DIR: &str = "lightrig";

/// Overrides for default application paths
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    /// Custom config directory (from CLI or ENV)
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// Priority: CLI args → ENV var → None (use defaults)
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from));
        Self { config_dir }
    }

    pub fn config_dir(&self) -> PathBuf {
        resolve_dir(self, std::env::current_dir().ok().as_deref(), dirs_next::config_dir())
    }

    pub fn data_dir(&self) -> PathBuf {
        resolve_dir(self, std::env::current_dir().ok().as_deref(), dirs_next::data_dir())
    }
}

/// Path to a configuration file (settings).
pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    config.config_dir().join(name)
}

/// Path to a data file (logs, saved scenes).
pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    config.data_dir().join(name)
}

/// Create the config and data directories if missing.
pub fn ensure_dirs(config: &PathConfig) -> Result<()> {
    let config_dir = config.config_dir();
    let data_dir = config.data_dir();

    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create config directory: {}", config_dir.display()))?;

    if data_dir != config_dir {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    }
    Ok(())
}

fn has_local_config_files(dir: &Path) -> bool {
    [SETTINGS_FILE, LOG_FILE].iter().any(|f| dir.join(f).exists())
}

fn resolve_dir(config: &PathConfig, cwd: Option<&Path>, platform: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }
    if let Some(cwd) = cwd.filter(|d| has_local_config_files(d)) {
        return cwd.to_path_buf();
    }
    match platform {
        Some(dir) => dir.join(APP_DIR),
        None => PathBuf::from("."),
    }
}
