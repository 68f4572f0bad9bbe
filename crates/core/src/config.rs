//! Application configuration.
//!
//! A default TOML file is written under the user config directory on first
//! run; values can be overridden per-key by `WALKQUOTE_*` environment
//! variables.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::session::CHAT_WINDOW;

/// Directory under the user config root holding the settings file.
pub const DEFAULT_CONFIG_DIR: &str = "walkquote";

const CONFIG_FILE: &str = "config.toml";

const DEFAULT_CONFIG: &str = r##"# WalkQuote settings. Every key is optional; defaults are shown.

# Display name of the simulated walking partner.
partner_name = "Sarah D."

# Simulated search latency and its deadline, in milliseconds.
match_delay_ms = 2000
match_timeout_ms = 10000

# How many chat entries stay visible while a walk is in progress.
chat_window = 5

# Text-art panel shown on the wanderer side after matching, resolved
# relative to the working directory. Missing file aborts that view.
art_path = "walkquote.txt"

# Optional hex color overrides for the UI palette.
# accent_color = "#1abc9c"
# background_color = "#0e6251"
"##;

/// Runtime settings for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Name reported for the hardcoded counterpart.
    pub partner_name: String,
    /// Simulated walker-search latency in milliseconds.
    pub match_delay_ms: u64,
    /// Deadline for the walker search in milliseconds.
    pub match_timeout_ms: u64,
    /// Number of chat entries rendered during an active walk.
    pub chat_window: usize,
    /// Relative path of the walk text-art asset.
    pub art_path: PathBuf,
    /// Optional hex override for the accent color.
    pub accent_color: Option<String>,
    /// Optional hex override for the background color.
    pub background_color: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            partner_name: "Sarah D.".to_string(),
            match_delay_ms: 2000,
            match_timeout_ms: 10_000,
            chat_window: CHAT_WINDOW,
            art_path: PathBuf::from("walkquote.txt"),
            accent_color: None,
            background_color: None,
        }
    }
}

impl AppConfig {
    /// Load settings from the default location plus environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load settings from an explicit file path plus environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut builder = Config::builder().add_source(
            Config::try_from(&AppConfig::default()).context("failed to seed default settings")?,
        );
        if path.exists() {
            builder = builder.add_source(File::from(path.to_path_buf()));
        }
        let settings = builder
            .add_source(Environment::with_prefix("WALKQUOTE"))
            .build()
            .with_context(|| format!("failed to assemble settings from {}", path.display()))?;
        settings
            .try_deserialize()
            .context("failed to deserialize settings")
    }
}

/// Location of the settings file under the user config directory.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_CONFIG_DIR)
        .join(CONFIG_FILE)
}

/// Write the default settings file on first run, leaving an existing one
/// untouched.
pub fn ensure_default_config() -> Result<PathBuf> {
    ensure_default_config_at(config_path())
}

/// As [`ensure_default_config`], for an explicit path.
pub fn ensure_default_config_at(path: impl Into<PathBuf>) -> Result<PathBuf> {
    let path = path.into();
    if path.exists() {
        return Ok(path);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn first_run_writes_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("walkquote").join("config.toml");

        let written = ensure_default_config_at(&path)?;
        assert!(written.exists());

        let config = AppConfig::load_from(&written)?;
        assert_eq!(config.partner_name, "Sarah D.");
        assert_eq!(config.match_delay_ms, 2000);
        assert_eq!(config.match_timeout_ms, 10_000);
        assert_eq!(config.chat_window, 5);
        assert_eq!(config.art_path, PathBuf::from("walkquote.txt"));
        assert!(config.accent_color.is_none());
        Ok(())
    }

    #[test]
    fn existing_file_is_left_untouched() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "partner_name = \"Robin\"\nmatch_delay_ms = 50\n")?;

        ensure_default_config_at(&path)?;
        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.partner_name, "Robin");
        assert_eq!(config.match_delay_ms, 50);
        // untouched keys fall back to defaults
        assert_eq!(config.chat_window, 5);
        Ok(())
    }

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        assert_eq!(config.partner_name, "Sarah D.");
        Ok(())
    }
}
