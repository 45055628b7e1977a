//! Configuration management for templeweb
//!
//! This module handles loading, validation, and management of
//! templeweb configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

/// Upstream accounts API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the accounts API, e.g. `http://localhost:8000/api/v1`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000/api/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Journal and debit-note form settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntriesConfig {
    /// Number of empty rows a new entry form starts with
    #[serde(default = "default_min_rows")]
    pub min_rows: usize,
    /// Fund preselected on new entry forms
    #[serde(default)]
    pub default_fund_id: Option<i64>,
}

impl Default for EntriesConfig {
    fn default() -> Self {
        Self {
            min_rows: default_min_rows(),
            default_fund_id: None,
        }
    }
}

fn default_min_rows() -> usize {
    2
}

/// Chart-of-accounts tree display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Expand every node when the tree page is first opened
    #[serde(default = "default_false")]
    pub expand_on_load: bool,
    /// Show ledger codes next to names
    #[serde(default = "default_true")]
    pub show_codes: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            expand_on_load: false,
            show_codes: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Currency and number formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Currency symbol shown next to amounts
    #[serde(default = "default_currency_symbol")]
    pub symbol: String,
    /// Number of decimal places
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
    /// Thousands separator
    #[serde(default = "default_thousands_sep")]
    pub thousands_separator: String,
    /// Currency symbol position ("before" or "after")
    #[serde(default = "default_symbol_position")]
    pub symbol_position: SymbolPosition,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            symbol: default_currency_symbol(),
            decimal_places: 2,
            thousands_separator: ",".to_string(),
            symbol_position: SymbolPosition::Before,
        }
    }
}

fn default_currency_symbol() -> String {
    "RM".to_string()
}

fn default_decimal_places() -> u32 {
    2
}

fn default_thousands_sep() -> String {
    ",".to_string()
}

fn default_symbol_position() -> SymbolPosition {
    SymbolPosition::Before
}

/// Currency symbol position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    Before,
    After,
}

impl Default for SymbolPosition {
    fn default() -> Self {
        SymbolPosition::Before
    }
}

impl std::str::FromStr for SymbolPosition {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "before" => Ok(SymbolPosition::Before),
            "after" => Ok(SymbolPosition::After),
            _ => Err(format!("Invalid symbol position: {}", s)),
        }
    }
}

impl std::fmt::Display for SymbolPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolPosition::Before => write!(f, "before"),
            SymbolPosition::After => write!(f, "after"),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream API settings
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Entry form settings
    #[serde(default)]
    pub entries: EntriesConfig,
    /// Tree display settings
    #[serde(default)]
    pub tree: TreeConfig,
    /// Currency settings
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|_| ConfigError::IoError)?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|_| ConfigError::InvalidYaml)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        let base_url = self.upstream.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "upstream.base_url".to_string(),
                reason: "Base URL must start with http:// or https://".to_string(),
            });
        }

        if self.upstream.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "upstream.timeout_secs".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        // A double entry needs a debit line and a credit line
        if self.entries.min_rows < 2 {
            return Err(ConfigError::InvalidValue {
                field: "entries.min_rows".to_string(),
                reason: "An entry form needs at least 2 rows".to_string(),
            });
        }

        if self.currency.decimal_places > 10 {
            return Err(ConfigError::InvalidValue {
                field: "currency.decimal_places".to_string(),
                reason: "Decimal places must be between 0 and 10".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.entries.min_rows, 2);
        assert_eq!(config.upstream.timeout_secs, 30);
        assert!(!config.tree.expand_on_load);
        assert!(config.tree.show_codes);
        assert_eq!(config.currency.decimal_places, 2);
    }

    #[test]
    fn test_default_template_is_valid() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8081");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_yaml() {
        let result = Config::from_yaml("server: [unclosed");
        assert!(matches!(result, Err(ConfigError::InvalidYaml)));
    }

    #[test]
    fn test_rejects_zero_port() {
        let result = Config::from_yaml("server:\n  port: 0\n");
        match result {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "server.port"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let result = Config::from_yaml("upstream:\n  base_url: ftp://accounts\n");
        match result {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "upstream.base_url"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_single_row_entries() {
        let result = Config::from_yaml("entries:\n  min_rows: 1\n");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = Config::load(PathBuf::from("/definitely/not/here/config.yaml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_symbol_position_from_str() {
        assert_eq!("before".parse::<SymbolPosition>().unwrap(), SymbolPosition::Before);
        assert_eq!("AFTER".parse::<SymbolPosition>().unwrap(), SymbolPosition::After);
        assert!("middle".parse::<SymbolPosition>().is_err());
    }
}
