//! Service configuration.
//!
//! Settings are layered: `reviews.toml` → `REVIEWS_*` environment variables →
//! CLI flags. Every field has a default, so a missing file is not an error.
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 3142
//! db_path = ".reviews/reviews.db"
//! cors_permissive = false
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "reviews.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Permissive CORS for local front-end development.
    #[serde(default)]
    pub cors_permissive: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3142
}

fn default_db_path() -> PathBuf {
    PathBuf::from(".reviews/reviews.db")
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            db_path: default_db_path(),
            cors_permissive: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Invalid log format '{}'. Valid values: pretty, json", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse reviews.toml")
    }

    /// Returns default configuration if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply `REVIEWS_*` overrides from the process environment.
    pub fn with_env(self) -> Result<Self> {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_env_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("REVIEWS_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("REVIEWS_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid REVIEWS_PORT '{}'", port))?;
        }
        if let Some(db_path) = lookup("REVIEWS_DB_PATH") {
            self.server.db_path = PathBuf::from(db_path);
        }
        if let Some(level) = lookup("REVIEWS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("REVIEWS_LOG_FORMAT") {
            self.logging.format = format.parse().context("Invalid REVIEWS_LOG_FORMAT")?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3142);
        assert_eq!(config.server.db_path, PathBuf::from(".reviews/reviews.db"));
        assert!(!config.server.cors_permissive);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_parse_partial_file() -> Result<()> {
        let config = ServiceConfig::parse(
            r#"
            [server]
            port = 8080

            [logging]
            format = "json"
            "#,
        )?;
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
        Ok(())
    }

    #[test]
    fn test_parse_empty_is_default() -> Result<()> {
        assert_eq!(ServiceConfig::parse("")?, ServiceConfig::default());
        Ok(())
    }

    #[test]
    fn test_parse_rejects_bad_types() {
        assert!(ServiceConfig::parse("[server]\nport = \"eighty\"").is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = ServiceConfig::load_or_default(&dir.path().join("reviews.toml"))?;
        assert_eq!(config, ServiceConfig::default());
        Ok(())
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("reviews.toml");
        std::fs::write(&path, "[server]\ndb_path = \"/tmp/r.db\"\ncors_permissive = true\n")?;
        let config = ServiceConfig::load_or_default(&path)?;
        assert_eq!(config.server.db_path, PathBuf::from("/tmp/r.db"));
        assert!(config.server.cors_permissive);
        Ok(())
    }

    #[test]
    fn test_env_overrides_file_values() -> Result<()> {
        let config = ServiceConfig::default().with_env_from(lookup_from(&[
            ("REVIEWS_HOST", "0.0.0.0"),
            ("REVIEWS_PORT", "9000"),
            ("REVIEWS_DB_PATH", "/data/reviews.db"),
            ("REVIEWS_LOG_LEVEL", "debug"),
            ("REVIEWS_LOG_FORMAT", "JSON"),
        ]))?;
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.db_path, PathBuf::from("/data/reviews.db"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        Ok(())
    }

    #[test]
    fn test_env_invalid_port_is_error() {
        let result = ServiceConfig::default().with_env_from(lookup_from(&[("REVIEWS_PORT", "http")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("Json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
