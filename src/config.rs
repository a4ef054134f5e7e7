//! Configuration file support for ferro-bed.
//!
//! # Example Configuration
//!
//! ```toml
//! [database]
//! path = "ferro-bed.sqlite3"
//!
//! [http]
//! timeout_seconds = 30
//! max_retries = 2
//!
//! [endpoints]
//! tark = "https://tark.ensembl.org/api"
//! ```
//!
//! # Config File Locations
//!
//! Configuration is searched in this order (first found wins):
//! 1. `.ferro-bed.toml` in current directory
//! 2. `~/.config/ferro-bed/config.toml`
//!
//! CLI flags take precedence over config file settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::assembly::Assembly;
use crate::error::BedError;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BedConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub endpoints: EndpointConfig,
}

/// Local cache database
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file path (default: "ferro-bed.sqlite3")
    pub path: PathBuf,
}

/// Outbound HTTP behaviour
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
    /// Connect timeout in seconds (default: 10)
    pub connect_timeout_seconds: u64,
    /// Retries after the first attempt (default: 2)
    pub max_retries: u32,
    /// First retry delay in milliseconds (default: 250)
    pub initial_backoff_ms: u64,
    /// Longest retry delay in milliseconds (default: 4000)
    pub max_backoff_ms: u64,
    /// Backoff growth factor (default: 2.0)
    pub backoff_multiplier: f64,
    /// User-Agent header
    pub user_agent: String,
}

/// Upstream service base URLs
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Ensembl REST base for GRCh38 variant annotation
    pub vep_grch38: String,
    /// Ensembl REST base for GRCh37 variant annotation
    pub vep_grch37: String,
    /// Tark API base
    pub tark: String,
    /// PanelApp API base
    pub panelapp: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("ferro-bed.sqlite3"),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            connect_timeout_seconds: 10,
            max_retries: 2,
            initial_backoff_ms: 250,
            max_backoff_ms: 4000,
            backoff_multiplier: 2.0,
            user_agent: format!("ferro-bed/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            vep_grch38: "https://rest.ensembl.org".to_string(),
            vep_grch37: "https://grch37.rest.ensembl.org".to_string(),
            tark: "https://tark.ensembl.org/api".to_string(),
            panelapp: "https://panelapp.genomicsengland.co.uk/api/v1".to_string(),
        }
    }
}

impl EndpointConfig {
    /// Variant annotation base URL for an assembly
    pub fn vep_base(&self, assembly: Assembly) -> &str {
        match assembly {
            Assembly::GRCh37 => &self.vep_grch37,
            Assembly::GRCh38 => &self.vep_grch38,
        }
    }
}

impl BedConfig {
    /// Load configuration from the default locations, falling back to
    /// defaults when no file is found.
    pub fn load() -> Result<Self, BedError> {
        match Self::find() {
            Some(path) => {
                tracing::info!("Loading configuration from {}", path.display());
                Self::from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// First existing config file in the search path
    pub fn find() -> Option<PathBuf> {
        let cwd_config = PathBuf::from(".ferro-bed.toml");
        if cwd_config.exists() {
            return Some(cwd_config);
        }

        let home_config = std::env::var_os("HOME")
            .map(PathBuf::from)?
            .join(".config")
            .join("ferro-bed")
            .join("config.toml");
        home_config.exists().then_some(home_config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self, BedError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML content
    pub fn parse(content: &str) -> Result<Self, BedError> {
        let config: BedConfig = toml::from_str(content).map_err(|e| BedError::InvalidConfig {
            msg: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file(&self, path: &Path) -> Result<(), BedError> {
        let content = toml::to_string_pretty(self).map_err(|e| BedError::InvalidConfig {
            msg: e.to_string(),
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), BedError> {
        let invalid = |msg: &str| BedError::InvalidConfig {
            msg: msg.to_string(),
        };

        if self.http.timeout_seconds == 0 {
            return Err(invalid("http.timeout_seconds must be greater than 0"));
        }
        if self.http.connect_timeout_seconds == 0 {
            return Err(invalid("http.connect_timeout_seconds must be greater than 0"));
        }
        if !(1.0..=10.0).contains(&self.http.backoff_multiplier) {
            return Err(invalid("http.backoff_multiplier must be between 1.0 and 10.0"));
        }
        if self.http.initial_backoff_ms > self.http.max_backoff_ms {
            return Err(invalid(
                "http.initial_backoff_ms must not exceed http.max_backoff_ms",
            ));
        }

        for (name, url) in [
            ("vep_grch38", &self.endpoints.vep_grch38),
            ("vep_grch37", &self.endpoints.vep_grch37),
            ("tark", &self.endpoints.tark),
            ("panelapp", &self.endpoints.panelapp),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(BedError::InvalidConfig {
                    msg: format!("endpoints.{} is not an http(s) URL: {}", name, url),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BedConfig::default();
        assert_eq!(config.http.timeout_seconds, 30);
        assert_eq!(config.database.path, PathBuf::from("ferro-bed.sqlite3"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_vep_base_per_assembly() {
        let endpoints = EndpointConfig::default();
        assert_eq!(
            endpoints.vep_base(Assembly::GRCh37),
            "https://grch37.rest.ensembl.org"
        );
        assert_eq!(endpoints.vep_base(Assembly::GRCh38), "https://rest.ensembl.org");
    }

    #[test]
    fn test_parse_partial_config() {
        let config = BedConfig::parse(
            r#"
[http]
timeout_seconds = 5
max_retries = 0

[endpoints]
tark = "http://localhost:8000/api"
"#,
        )
        .unwrap();

        assert_eq!(config.http.timeout_seconds, 5);
        assert_eq!(config.http.max_retries, 0);
        assert_eq!(config.http.initial_backoff_ms, 250);
        assert_eq!(config.endpoints.tark, "http://localhost:8000/api");
        assert_eq!(config.endpoints.panelapp, EndpointConfig::default().panelapp);
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let err = BedConfig::parse("[http]\ntimeout_seconds = 0\n").unwrap_err();
        assert!(err.to_string().contains("timeout_seconds"));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let err = BedConfig::parse("[endpoints]\ntark = \"ftp://x\"\n").unwrap_err();
        assert!(err.to_string().contains("endpoints.tark"));
    }

    #[test]
    fn test_round_trip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = BedConfig::default();
        config.http.max_retries = 4;
        config.to_file(&path).unwrap();

        assert_eq!(BedConfig::from_file(&path).unwrap(), config);
    }
}
