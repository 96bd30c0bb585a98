use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::proxy::ProxyConfig;
use super::realms::RealmServers;
use super::server::ServerConfig;
use crate::service::ServiceKind;

pub const CONFIG_ENV_VAR: &str = "KDCPROXY_CONFIG";
const LOCAL_CONFIG: &str = "kdcproxy.toml";
const SYSTEM_CONFIG: &str = "/etc/kdcproxy/config.toml";

/// Main configuration structure for the KDC proxy
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub proxy: ProxyConfig,

    /// Static realm table, keyed by exact (case-sensitive) realm name
    #[serde(default)]
    pub realms: HashMap<String, RealmServers>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. `$KDCPROXY_CONFIG`
    /// 3. kdcproxy.toml in current directory
    /// 4. /etc/kdcproxy/config.toml
    /// 5. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let env_path = std::env::var(CONFIG_ENV_VAR).ok();
        let mut config = if let Some(path) = path.or(env_path.as_deref()) {
            Self::from_file(path)?
        } else if Path::new(LOCAL_CONFIG).exists() {
            Self::from_file(LOCAL_CONFIG)?
        } else if Path::new(SYSTEM_CONFIG).exists() {
            Self::from_file(SYSTEM_CONFIG)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("HTTP port cannot be 0".to_string()));
        }

        if self.server.max_request_size == 0 {
            return Err(ConfigError::Validation(
                "max_request_size cannot be 0".to_string(),
            ));
        }

        if self.proxy.attempt_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "attempt_timeout_ms cannot be 0".to_string(),
            ));
        }

        if self.proxy.default_realm.as_deref() == Some("") {
            return Err(ConfigError::Validation(
                "default_realm cannot be empty".to_string(),
            ));
        }

        for (realm, servers) in &self.realms {
            for kind in [ServiceKind::Kdc, ServiceKind::Kpasswd] {
                servers.parse(kind).map_err(|e| {
                    ConfigError::Validation(format!("Realm '{}' ({}): {}", realm, kind, e))
                })?;
            }
        }

        Ok(())
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}
