//! Bootstrap configuration loading
//!
//! Configuration file resolution follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`VCP_CONFIG`)
//! 3. User config file (`<config dir>/vcp/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! A missing config file is never fatal: the loader warns and falls back to
//! compiled defaults. Only an explicitly named file that cannot be read or
//! parsed is an error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "VCP_CONFIG";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Folder holding `categories.json`, `items.json` and `closure.json`
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub selector: SelectorConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            logging: LoggingConfig::default(),
            catalog: CatalogConfig::default(),
            selector: SelectorConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Catalog snapshot build options
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Surface unapproved categories (moderator view)
    #[serde(default)]
    pub include_unapproved: bool,

    /// Inject the "Latest" and "Trending" virtual root categories
    #[serde(default = "default_true")]
    pub enable_synthetic: bool,

    /// Number of newest voice models in "Latest"
    #[serde(default = "default_synthetic_limit")]
    pub synthetic_latest_limit: usize,

    /// Number of most used voice models in "Trending"
    #[serde(default = "default_synthetic_limit")]
    pub synthetic_trending_limit: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            include_unapproved: false,
            enable_synthetic: true,
            synthetic_latest_limit: default_synthetic_limit(),
            synthetic_trending_limit: default_synthetic_limit(),
        }
    }
}

/// Ordering applied to siblings within one level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiblingOrder {
    /// Preserve the order the category list was received in
    #[default]
    ServerOrder,
    /// Case-insensitive by display label
    NameAscending,
}

/// Cascading selector options
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    #[serde(default)]
    pub sibling_order: SiblingOrder,

    /// Initial scope value ("all" or a language tag)
    #[serde(default = "default_scope")]
    pub default_scope: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            sibling_order: SiblingOrder::default(),
            default_scope: default_scope(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("vcp"))
        .unwrap_or_else(|| PathBuf::from("./vcp_data"))
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_synthetic_limit() -> usize {
    25
}

fn default_scope() -> String {
    "all".to_string()
}

impl TomlConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load configuration from an explicit file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound(format!("Config file {}", path.display())));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Resolve and load configuration, degrading to defaults when no file exists
    pub fn load(cli_arg: Option<&Path>) -> Result<Self> {
        match resolve_config_path(cli_arg) {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::from_file(&path)
            }
            None => {
                warn!("No configuration file found, using compiled defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Locate the config file following the priority order above
///
/// Explicit sources (CLI, environment) are returned even when the file does
/// not exist so that the caller reports the mistake instead of silently
/// using defaults.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: User config file
    dirs::config_dir()
        .map(|d| d.join("vcp").join("config.toml"))
        .filter(|p| p.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
        assert!(!config.catalog.include_unapproved);
        assert!(config.catalog.enable_synthetic);
        assert_eq!(config.catalog.synthetic_latest_limit, 25);
        assert_eq!(config.selector.sibling_order, SiblingOrder::ServerOrder);
        assert_eq!(config.selector.default_scope, "all");
    }

    #[test]
    fn test_full_toml() {
        let config = TomlConfig::from_toml_str(
            r#"
            data_dir = "/srv/vcp"

            [logging]
            level = "debug"

            [catalog]
            include_unapproved = true
            enable_synthetic = false
            synthetic_trending_limit = 10

            [selector]
            sibling_order = "name_ascending"
            default_scope = "en"
            "#,
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/vcp"));
        assert_eq!(config.logging.level, "debug");
        assert!(config.catalog.include_unapproved);
        assert!(!config.catalog.enable_synthetic);
        assert_eq!(config.catalog.synthetic_trending_limit, 10);
        assert_eq!(config.catalog.synthetic_latest_limit, 25);
        assert_eq!(config.selector.sibling_order, SiblingOrder::NameAscending);
        assert_eq!(config.selector.default_scope, "en");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[selector]\nsibling_order = 3").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
