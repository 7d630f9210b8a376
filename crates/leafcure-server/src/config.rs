//! Server configuration loaded from `leafcure.toml`.
//!
//! Every field has a default, so a missing file or section is fine. Secrets
//! never come from the file: the embedding API key is read from the
//! environment variable named by `oracle.api_key_env`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use leafcure_core::oracle::DEFAULT_LEXICAL_MIN_SCORE;
use leafcure_core::resolver::{DEFAULT_ORACLE_TIMEOUT, DEFAULT_TOP_K};
use leafcure_core::{LoadOptions, ResolverConfig};
use leafcure_embed::{DEFAULT_MODEL, DEFAULT_QUERY_PREFIX, DEFAULT_REQUEST_TIMEOUT_SECS};

pub const DEFAULT_CONFIG_FILE: &str = "leafcure.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Environment variable {0} is not set; it must hold the embedding API key")]
    MissingApiKey(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub resolver: ResolverSettings,
    #[serde(default)]
    pub oracle: OracleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub skip_invalid_rows: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverSettings {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_oracle_timeout_ms")]
    pub oracle_timeout_ms: u64,
    #[serde(default)]
    pub min_similarity: Option<f32>,
}

/// Similarity oracle backing the semantic strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleBackend {
    #[default]
    Lexical,
    Embedding,
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default)]
    pub backend: OracleBackend,
    #[serde(default = "default_query_prefix")]
    pub query_prefix: String,
    #[serde(default = "default_lexical_min_score")]
    pub lexical_min_score: f32,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 5000 }
fn default_catalog_path() -> PathBuf { PathBuf::from("products.csv") }
fn default_top_k() -> usize { DEFAULT_TOP_K }
fn default_oracle_timeout_ms() -> u64 { DEFAULT_ORACLE_TIMEOUT.as_millis() as u64 }
fn default_query_prefix() -> String { DEFAULT_QUERY_PREFIX.to_string() }
fn default_lexical_min_score() -> f32 { DEFAULT_LEXICAL_MIN_SCORE }
fn default_model() -> String { DEFAULT_MODEL.to_string() }
fn default_request_timeout_secs() -> u64 { DEFAULT_REQUEST_TIMEOUT_SECS }
fn default_api_key_env() -> String { "GOOGLE_API_KEY".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
            skip_invalid_rows: false,
        }
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            oracle_timeout_ms: default_oracle_timeout_ms(),
            min_similarity: None,
        }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            backend: OracleBackend::default(),
            query_prefix: default_query_prefix(),
            lexical_min_score: default_lexical_min_score(),
            model: default_model(),
            endpoint: None,
            request_timeout_secs: default_request_timeout_secs(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl Config {
    /// Load config from `path`. The file must exist.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Load config from `path`, falling back to defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    fn parse(content: &str, path: &Path) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            skip_invalid_rows: self.catalog.skip_invalid_rows,
        }
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            top_k: self.resolver.top_k,
            oracle_timeout: Duration::from_millis(self.resolver.oracle_timeout_ms),
            min_similarity: self.resolver.min_similarity,
        }
    }
}

impl OracleConfig {
    /// Read the embedding API key from the configured environment variable.
    ///
    /// An unset or blank variable is an error; there is no fallback value.
    pub fn api_key(&self) -> ConfigResult<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ConfigError::MissingApiKey(self.api_key_env.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:5000");
        assert_eq!(config.catalog.path, PathBuf::from("products.csv"));
        assert!(!config.catalog.skip_invalid_rows);
        assert_eq!(config.oracle.backend, OracleBackend::Lexical);
        assert_eq!(config.oracle.query_prefix, "Plant disease: ");
        assert_eq!(config.resolver_config(), ResolverConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse(
            r#"
[server]
port = 8080

[resolver]
oracle_timeout_ms = 250
min_similarity = 0.4

[oracle]
backend = "embedding"
model = "models/text-embedding-004"
"#,
            Path::new("test.toml"),
        )
        .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.oracle.backend, OracleBackend::Embedding);
        assert_eq!(config.oracle.model, "models/text-embedding-004");
        assert_eq!(config.oracle.api_key_env, "GOOGLE_API_KEY");

        let resolver = config.resolver_config();
        assert_eq!(resolver.top_k, 3);
        assert_eq!(resolver.oracle_timeout, Duration::from_millis(250));
        assert_eq!(resolver.min_similarity, Some(0.4));
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = Config::parse("[oracle]\nbackend = \"gpt\"", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        assert!(Config::load_or_default(&path).is_ok());
        assert!(matches!(Config::load(&path), Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_api_key_from_env() {
        let oracle = OracleConfig {
            api_key_env: "LEAFCURE_TEST_KEY_PRESENT".to_string(),
            ..OracleConfig::default()
        };
        std::env::set_var("LEAFCURE_TEST_KEY_PRESENT", "secret");
        assert_eq!(oracle.api_key().unwrap(), "secret");

        let missing = OracleConfig {
            api_key_env: "LEAFCURE_TEST_KEY_ABSENT".to_string(),
            ..OracleConfig::default()
        };
        assert!(matches!(missing.api_key(), Err(ConfigError::MissingApiKey(name)) if name == "LEAFCURE_TEST_KEY_ABSENT"));
    }
}
