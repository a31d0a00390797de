//! Configuration for inventory-core
//!
//! Loaded from TOML (or JSON) with every section optional:
//!
//! ```toml
//! [store]
//! collection = "inventory"
//! backend = "sqlite"
//! path = "/var/lib/inventory/inventory.db"
//!
//! [server]
//! addr = "127.0.0.1:8080"
//!
//! [identity]
//! uid = "local"
//! display_name = "Stock Room"
//! email = "stock@example.com"
//!
//! [logging]
//! level = "info"
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::identity::Identity;
use crate::inventory::DEFAULT_COLLECTION;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "INVENTORY_CONFIG";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Document store settings
    pub store: StoreConfig,
    /// HTTP shell settings
    pub server: ServerConfig,
    /// Account used by the local identity provider
    pub identity: IdentityConfig,
    /// Log filter settings
    pub logging: LoggingConfig,
}

/// Which document store backs the inventory collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub collection: String,
    pub backend: StoreBackend,
    /// Database file for the sqlite backend; defaults under the user data dir
    pub path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            backend: StoreBackend::Memory,
            path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Stable uid; a random one is generated when absent
    pub uid: Option<String>,
    pub display_name: String,
    pub email: Option<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            uid: None,
            display_name: "Local User".to_string(),
            email: None,
        }
    }
}

impl IdentityConfig {
    pub fn to_identity(&self) -> Identity {
        let mut identity = Identity::new(self.display_name.clone());
        if let Some(uid) = &self.uid {
            identity = identity.with_uid(uid.clone());
        }
        if let Some(email) = &self.email {
            identity = identity.with_email(email.clone());
        }
        identity
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl InventoryConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load a file; `.json` files are parsed as JSON, anything else as TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content)?,
            _ => Self::from_toml(&content)?,
        };
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from `$INVENTORY_CONFIG`, else the standard config path if it
    /// exists, else defaults.
    pub fn load_standard() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::load(Path::new(&path));
        }
        match Self::default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// `<config_dir>/inventory/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("inventory").join("config.toml"))
    }

    /// Database path for the sqlite backend.
    pub fn sqlite_path(&self) -> Option<PathBuf> {
        self.store
            .path
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("inventory").join("inventory.db")))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let collection = &self.store.collection;
        if collection.trim().is_empty() || collection.contains('/') {
            return Err(ConfigError::Invalid(format!(
                "store.collection {:?} is not a valid collection name",
                collection
            )));
        }

        if self.server.addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "server.addr {:?} is not a socket address",
                self.server.addr
            )));
        }

        if self.identity.display_name.trim().is_empty() {
            return Err(ConfigError::MissingField("identity.display_name".to_string()));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::MissingField("logging.level".to_string()));
        }

        Ok(())
    }
}

/// Configuration loading or validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid value: {0}")]
    Invalid(String),

    #[error("Missing field: {0}")]
    MissingField(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InventoryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.store.collection, "inventory");
        assert_eq!(config.store.backend, StoreBackend::Memory);
    }

    #[test]
    fn test_partial_toml() {
        let config = InventoryConfig::from_toml(
            r#"
            [store]
            backend = "sqlite"
            path = "/tmp/inv.db"

            [identity]
            uid = "clerk"
            display_name = "Clerk"
            "#,
        )
        .unwrap();
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(config.store.collection, "inventory");
        assert_eq!(config.sqlite_path(), Some(PathBuf::from("/tmp/inv.db")));
        assert_eq!(config.server.addr, "127.0.0.1:8080");

        let identity = config.identity.to_identity();
        assert_eq!(identity.uid, "clerk");
        assert_eq!(identity.email, None);
    }

    #[test]
    fn test_json_serialization() {
        let mut config = InventoryConfig::default();
        config.logging.level = "debug".into();
        let json = config.to_json().unwrap();
        let parsed = InventoryConfig::from_json(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_invalid_values() {
        let mut config = InventoryConfig::default();
        config.store.collection = "a/b".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = InventoryConfig::default();
        config.server.addr = "not an address".into();
        assert!(config.validate().is_err());

        let mut config = InventoryConfig::default();
        config.identity.display_name = " ".into();
        assert!(matches!(config.validate(), Err(ConfigError::MissingField(_))));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let err = InventoryConfig::from_toml("[store]\nbackend = \"postgres\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\naddr = \"0.0.0.0:9000\"\n").unwrap();
        let config = InventoryConfig::load(&path).unwrap();
        assert_eq!(config.server.addr, "0.0.0.0:9000");

        let missing = InventoryConfig::load(&dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
