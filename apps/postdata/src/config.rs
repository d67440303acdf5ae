//! # Configuration Module
//!
//! Service and triple store settings.
//!
//! ## Precedence (highest first)
//!
//! 1. Command-line flags and their environment variables (`PD_*`, `SERVICE_*`)
//! 2. The TOML file given with `--config`
//! 3. Built-in defaults
//!
//! ## File Format
//!
//! ```toml
//! [store]
//! triplestore = "stardog"
//! protocol = "http"
//! host = "localhost"
//! port = 5820
//! database = "PD_KG"
//! user = "admin"
//! password = "admin"
//!
//! [service]
//! port = 5000
//! rate_limit = 50
//! poetry_lab_url = "http://poetry.linhd.uned.es:3000"
//! poetry_lab_lang = "en"
//! ```

use postdata_core::PostdataError;
use postdata_core::primitives::{POETRY_LAB_BASE_URL, POETRY_LAB_LANG};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

// =============================================================================
// DEFAULTS
// =============================================================================

const DEFAULT_TRIPLESTORE: &str = "stardog";
const DEFAULT_PROTOCOL: &str = "http";
const DEFAULT_HOST: &str = "localhost";
/// Stardog's default port.
const DEFAULT_STORE_PORT: u16 = 5820;
const DEFAULT_DATABASE: &str = "PD_KG";
const DEFAULT_USER: &str = "admin";
const DEFAULT_PASSWORD: &str = "admin";

const DEFAULT_SERVICE_PORT: u16 = 5000;
/// Requests per second accepted by the HTTP server.
const DEFAULT_RATE_LIMIT: u32 = 50;

/// Triple stores with an adapter.
const SUPPORTED_TRIPLESTORES: &[&str] = &["stardog"];

// =============================================================================
// CONFIG LAYERS
// =============================================================================

/// One partial layer of configuration: a file, or the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub store: StoreLayer,
    pub service: ServiceLayer,
}

#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreLayer {
    pub triplestore: Option<String>,
    pub protocol: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for StoreLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreLayer")
            .field("triplestore", &self.triplestore)
            .field("protocol", &self.protocol)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceLayer {
    pub version: Option<String>,
    pub port: Option<u16>,
    pub rate_limit: Option<u32>,
    pub poetry_lab_url: Option<String>,
    pub poetry_lab_lang: Option<String>,
}

impl ConfigLayer {
    /// Read a layer from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, PostdataError> {
        let body = std::fs::read_to_string(path).map_err(|e| {
            PostdataError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&body)
    }

    pub fn from_toml(body: &str) -> Result<Self, PostdataError> {
        toml::from_str(body)
            .map_err(|e| PostdataError::ConfigError(format!("Invalid config file: {}", e)))
    }

    /// Fields set in `over` replace fields of `self`.
    #[must_use]
    pub fn merge(self, over: Self) -> Self {
        Self {
            store: StoreLayer {
                triplestore: over.store.triplestore.or(self.store.triplestore),
                protocol: over.store.protocol.or(self.store.protocol),
                host: over.store.host.or(self.store.host),
                port: over.store.port.or(self.store.port),
                database: over.store.database.or(self.store.database),
                user: over.store.user.or(self.store.user),
                password: over.store.password.or(self.store.password),
            },
            service: ServiceLayer {
                version: over.service.version.or(self.service.version),
                port: over.service.port.or(self.service.port),
                rate_limit: over.service.rate_limit.or(self.service.rate_limit),
                poetry_lab_url: over.service.poetry_lab_url.or(self.service.poetry_lab_url),
                poetry_lab_lang: over.service.poetry_lab_lang.or(self.service.poetry_lab_lang),
            },
        }
    }
}

// =============================================================================
// RESOLVED CONFIG
// =============================================================================

/// Connection settings of the triple store.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub triplestore: String,
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl StoreConfig {
    /// SPARQL query endpoint of the configured database.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "{}://{}:{}/{}/query",
            self.protocol, self.host, self.port, self.database
        )
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("triplestore", &self.triplestore)
            .field("endpoint", &self.endpoint())
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Settings of the HTTP service itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub version: String,
    pub port: u16,
    /// Requests per second across all clients; `0` disables limiting.
    pub rate_limit: u32,
    pub poetry_lab_url: String,
    pub poetry_lab_lang: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            port: DEFAULT_SERVICE_PORT,
            rate_limit: DEFAULT_RATE_LIMIT,
            poetry_lab_url: POETRY_LAB_BASE_URL.to_string(),
            poetry_lab_lang: POETRY_LAB_LANG.to_string(),
        }
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store: StoreConfig,
    pub service: ServiceConfig,
}

impl Config {
    /// Resolve the command-line layer on top of an optional config file.
    pub fn load(file: Option<&Path>, cli: ConfigLayer) -> Result<Self, PostdataError> {
        let base = match file {
            Some(path) => {
                tracing::info!("Loading configuration from {}", path.display());
                ConfigLayer::from_file(path)?
            }
            None => ConfigLayer::default(),
        };
        Self::resolve(base.merge(cli))
    }

    /// Apply defaults to a merged layer and validate it.
    pub fn resolve(layer: ConfigLayer) -> Result<Self, PostdataError> {
        let store = layer.store;
        let triplestore = store
            .triplestore
            .unwrap_or_else(|| DEFAULT_TRIPLESTORE.to_string())
            .to_lowercase();
        if !SUPPORTED_TRIPLESTORES.contains(&triplestore.as_str()) {
            return Err(PostdataError::ConfigError(format!(
                "Unsupported triple store '{}' (supported: {})",
                triplestore,
                SUPPORTED_TRIPLESTORES.join(", ")
            )));
        }

        let protocol = store
            .protocol
            .unwrap_or_else(|| DEFAULT_PROTOCOL.to_string());
        if !matches!(protocol.as_str(), "http" | "https") {
            return Err(PostdataError::ConfigError(format!(
                "Unsupported protocol '{}'",
                protocol
            )));
        }

        let defaults = ServiceConfig::default();
        let service = layer.service;

        Ok(Self {
            store: StoreConfig {
                triplestore,
                protocol,
                host: store.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: store.port.unwrap_or(DEFAULT_STORE_PORT),
                database: store
                    .database
                    .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
                user: store.user.unwrap_or_else(|| DEFAULT_USER.to_string()),
                password: store
                    .password
                    .unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
            },
            service: ServiceConfig {
                version: service.version.unwrap_or(defaults.version),
                port: service.port.unwrap_or(defaults.port),
                rate_limit: service.rate_limit.unwrap_or(defaults.rate_limit),
                poetry_lab_url: service.poetry_lab_url.unwrap_or(defaults.poetry_lab_url),
                poetry_lab_lang: service.poetry_lab_lang.unwrap_or(defaults.poetry_lab_lang),
            },
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stardog() {
        let config = Config::resolve(ConfigLayer::default()).expect("config");
        assert_eq!(config.store.endpoint(), "http://localhost:5820/PD_KG/query");
        assert_eq!(config.service.port, 5000);
        assert_eq!(config.service.rate_limit, 50);
        assert_eq!(config.service.poetry_lab_lang, "en");
    }

    #[test]
    fn command_line_overrides_file() {
        let file = ConfigLayer::from_toml(
            r#"
            [store]
            host = "stardog.internal"
            port = 5821

            [service]
            port = 8000
            rate_limit = 0
            "#,
        )
        .expect("parse");
        let mut cli = ConfigLayer::default();
        cli.store.port = Some(443);
        cli.store.protocol = Some("https".to_string());

        let config = Config::resolve(file.merge(cli)).expect("config");
        assert_eq!(
            config.store.endpoint(),
            "https://stardog.internal:443/PD_KG/query"
        );
        assert_eq!(config.service.port, 8000);
        assert_eq!(config.service.rate_limit, 0);
    }

    #[test]
    fn rejects_unknown_triple_store() {
        let mut layer = ConfigLayer::default();
        layer.store.triplestore = Some("virtuoso".to_string());
        assert!(matches!(
            Config::resolve(layer),
            Err(PostdataError::ConfigError(_))
        ));
    }

    #[test]
    fn rejects_unknown_keys() {
        let result = ConfigLayer::from_toml("[store]\nhostname = \"x\"\n");
        assert!(matches!(result, Err(PostdataError::ConfigError(_))));
    }

    #[test]
    fn service_url_is_not_a_setting() {
        let result = ConfigLayer::from_toml("[service]\nurl = \"http://localhost\"\n");
        assert!(matches!(result, Err(PostdataError::ConfigError(_))));
    }

    #[test]
    fn debug_hides_password() {
        let mut layer = ConfigLayer::default();
        layer.store.password = Some("s3cret".to_string());
        assert!(!format!("{:?}", layer).contains("s3cret"));

        let config = Config::resolve(layer).expect("config");
        let debug = format!("{:?}", config.store);
        assert!(!debug.contains("s3cret"), "{debug}");
        assert!(debug.contains("***"));
    }
}
