//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$REMOTEGATE_CONFIG` (environment variable)
//! 2. `~/.config/remotegate/config.toml` (Linux/macOS)
//!    `%APPDATA%\remotegate\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::remote::policy::AllowList;
use crate::remote::transform::RewriteStrategy;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Remote-content policy.
    pub policy: PolicyConfig,
    /// Automatic-path rewrite settings.
    pub rewrite: RewriteConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// Remote-content policy settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// `ShowImages` bitmask: 1 = remote, 2 = embedded.
    pub show_images: u8,
    /// Senders whose unencrypted messages always load remote content.
    pub allow_list: Vec<String>,
}

/// Automatic-path rewrite settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// "markup" (text substitution) or "dom" (attribute rename).
    pub strategy: RewriteStrategy,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            log_level: "warn".to_string(),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            show_images: 0,
            allow_list: AllowList::default().addresses().to_vec(),
        }
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    match config_file_path() {
        Some(path) if path.exists() => load_config_from(&path),
        _ => Config::default(),
    }
}

/// Load configuration from an explicit path, falling back to defaults.
pub fn load_config_from(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<Config>(&contents) {
            Ok(cfg) => {
                tracing::info!(path = %path.display(), "Loaded config");
                cfg
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to parse config, using defaults"
                );
                Config::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to read config file, using defaults"
            );
            Config::default()
        }
    }
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    // 1. Environment variable override
    if let Ok(env_path) = std::env::var("REMOTEGATE_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    // 2. Standard config directory
    dirs::config_dir().map(|d| d.join("remotegate").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("remotegate")
}

/// Return the log file path.
pub fn log_file_path(config: &Config) -> PathBuf {
    cache_dir(config).join("remotegate.log")
}
