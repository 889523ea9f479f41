//! Persistent settings (`lightrig.json`).
//!
//! Missing fields fall back to defaults, so older files keep loading.

use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::core::event_bus::MAX_QUEUE_SIZE;
use crate::core::proxy::DEFAULT_BOUND;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Range used for numeric controls when the store declares no bound.
    pub default_bound: f64,
    /// Skip (and warn about) lights whose type has no registered schema,
    /// instead of showing them without controls.
    pub strict_schema: bool,
    /// Rebuild the session when lights are created or undone in the host.
    pub refresh_on_population_change: bool,
    /// Events kept for `poll()` before the oldest are evicted.
    pub event_queue_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_bound: DEFAULT_BOUND,
            strict_schema: false,
            refresh_on_population_change: true,
            event_queue_limit: MAX_QUEUE_SIZE,
        }
    }
}

impl Settings {
    /// Load from `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        let settings = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, json).with_context(|| format!("Failed to write settings: {}", path.display()))
    }
}
