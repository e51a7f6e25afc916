//! Session configuration loaded from TOML.

use anyhow::Result;
use mdcontainer_core::ItemRegistry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Where [`SessionConfig::load`] looks by default.
pub const DEFAULT_SESSION_CONFIG_PATH: &str = "config/session.toml";

/// Per-connection container session settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Inbound clicks accepted per tick; the rest are dropped.
    pub max_clicks_per_tick: usize,
    /// Record inbound messages to this JSONL file.
    pub click_log: Option<PathBuf>,
    /// Max stack size per registry key (`mdm:ender_pearl = 16`).
    pub stack_size_overrides: BTreeMap<String, u32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            max_clicks_per_tick: 64,
            click_log: None,
            stack_size_overrides: BTreeMap::new(),
        }
    }
}

impl SessionConfig {
    /// Load from [`DEFAULT_SESSION_CONFIG_PATH`].
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_SESSION_CONFIG_PATH))
    }

    /// Load from `path`, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<SessionConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    SessionConfig::default()
                }
            },
            Err(err) => {
                if path != Path::new(DEFAULT_SESSION_CONFIG_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    warn!(
                        "Session config not found at {}. Using defaults",
                        path.display()
                    );
                }
                SessionConfig::default()
            }
        }
    }

    /// Save to `path` as pretty TOML, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }

    /// Apply stack size overrides. Bad entries are skipped with a warning.
    pub fn apply_overrides(&self, registry: &mut ItemRegistry) {
        for (key, size) in &self.stack_size_overrides {
            if let Err(err) = registry.set_max_stack_size(key, *size) {
                warn!("Ignoring stack size override {key} = {size}: {err}");
            }
        }
    }

    /// Default registry with this config's overrides applied.
    pub fn build_registry(&self) -> ItemRegistry {
        let mut registry = ItemRegistry::with_defaults();
        self.apply_overrides(&mut registry);
        registry
    }
}
