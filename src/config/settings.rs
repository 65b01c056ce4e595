use super::duration::parse_duration;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MONGO_PORT: u16 = 27017;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("required setting '{0}' is missing")]
    Missing(&'static str),

    #[error("setting '{key}' is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Port values appear both as JSON numbers and as numeric strings in deployed files.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PortValue {
    Number(u16),
    Text(String),
}

/// The settings file exactly as written on disk.
///
/// Keys are flat, including the dotted `MongoDB.*` names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSettings {
    #[serde(rename = "ApiUrl")]
    pub api_url: Option<String>,
    #[serde(rename = "Backend")]
    pub backend: Option<String>,
    #[serde(rename = "MaxDelay")]
    pub max_delay: Option<String>,
    #[serde(rename = "RequestTimeout")]
    pub request_timeout: Option<String>,
    #[serde(rename = "LogLevel")]
    pub log_level: Option<String>,
    #[serde(rename = "MongoDB.ServerAddress")]
    pub mongo_server_address: Option<String>,
    #[serde(rename = "MongoDB.ServerPort")]
    pub mongo_server_port: Option<PortValue>,
    #[serde(rename = "MongoDB.DatabaseName")]
    pub mongo_database_name: Option<String>,
    #[serde(rename = "MongoDB.UserName")]
    pub mongo_user_name: Option<String>,
    #[serde(rename = "MongoDB.UserPassword")]
    pub mongo_user_password: Option<String>,
}

impl RawSettings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    fn log_level(&self) -> Result<tracing::Level, ConfigError> {
        match non_empty(&self.log_level) {
            None => Ok(tracing::Level::INFO),
            Some(level) => {
                tracing::Level::from_str(level).map_err(|e| ConfigError::Invalid {
                    key: "LogLevel",
                    reason: e.to_string(),
                })
            }
        }
    }

    fn api_url(&self) -> Result<String, ConfigError> {
        let url = non_empty(&self.api_url).ok_or(ConfigError::Missing("ApiUrl"))?;
        Ok(url.trim_end_matches('/').to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Memory,
    Mongo,
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" => Ok(BackendKind::Memory),
            "mongo" | "mongodb" => Ok(BackendKind::Mongo),
            other => Err(ConfigError::Invalid {
                key: "Backend",
                reason: format!("unknown backend '{}'", other),
            }),
        }
    }
}

/// Connection parameters for the durable backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MongoSettings {
    pub server_address: String,
    pub server_port: u16,
    pub database_name: String,
    pub user_name: Option<String>,
    pub user_password: Option<String>,
}

impl MongoSettings {
    fn from_raw(raw: &RawSettings) -> Result<Self, ConfigError> {
        let server_address = non_empty(&raw.mongo_server_address)
            .ok_or(ConfigError::Missing("MongoDB.ServerAddress"))?
            .to_string();
        let server_port = match &raw.mongo_server_port {
            None => DEFAULT_MONGO_PORT,
            Some(PortValue::Number(port)) => *port,
            Some(PortValue::Text(text)) => {
                text.trim().parse().map_err(|_| ConfigError::Invalid {
                    key: "MongoDB.ServerPort",
                    reason: format!("'{}' is not a port number", text),
                })?
            }
        };
        let database_name = non_empty(&raw.mongo_database_name)
            .ok_or(ConfigError::Missing("MongoDB.DatabaseName"))?
            .to_string();

        Ok(Self {
            server_address,
            server_port,
            database_name,
            user_name: non_empty(&raw.mongo_user_name).map(str::to_string),
            user_password: raw.mongo_user_password.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendSettings {
    Memory,
    Mongo(MongoSettings),
}

/// Everything the HTTP server needs at startup.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub api_url: String,
    /// `host:port` the listener binds to, derived from `api_url`.
    pub bind_addr: String,
    pub backend: BackendSettings,
    pub log_level: tracing::Level,
}

impl ServerSettings {
    /// Validates the server view of the settings. `backend_override` wins over the file.
    pub fn from_raw(
        raw: &RawSettings,
        backend_override: Option<BackendKind>,
    ) -> Result<Self, ConfigError> {
        let api_url = raw.api_url()?;
        let bind_addr = bind_addr_from_url(&api_url)?;

        let kind = match backend_override {
            Some(kind) => kind,
            None => match non_empty(&raw.backend) {
                Some(name) => name.parse()?,
                None => BackendKind::Memory,
            },
        };
        let backend = match kind {
            BackendKind::Memory => BackendSettings::Memory,
            BackendKind::Mongo => BackendSettings::Mongo(MongoSettings::from_raw(raw)?),
        };

        Ok(Self {
            api_url,
            bind_addr,
            backend,
            log_level: raw.log_level()?,
        })
    }
}

/// Everything the workload client needs at startup.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub api_url: String,
    /// Upper bound (exclusive) of the random pause between two commands.
    pub max_delay: Duration,
    pub request_timeout: Duration,
    pub log_level: tracing::Level,
}

impl ClientSettings {
    pub fn from_raw(raw: &RawSettings) -> Result<Self, ConfigError> {
        let api_url = raw.api_url()?;
        reqwest::Url::parse(&api_url).map_err(|e| ConfigError::Invalid {
            key: "ApiUrl",
            reason: e.to_string(),
        })?;

        let max_delay = non_empty(&raw.max_delay).ok_or(ConfigError::Missing("MaxDelay"))?;
        let max_delay = parse_duration(max_delay).map_err(|reason| ConfigError::Invalid {
            key: "MaxDelay",
            reason,
        })?;

        let request_timeout = match non_empty(&raw.request_timeout) {
            None => DEFAULT_REQUEST_TIMEOUT,
            Some(text) => parse_duration(text).map_err(|reason| ConfigError::Invalid {
                key: "RequestTimeout",
                reason,
            })?,
        };
        if request_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                key: "RequestTimeout",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            api_url,
            max_delay,
            request_timeout,
            log_level: raw.log_level()?,
        })
    }
}

/// Turns `http://host:port/...` into `host:port`.
///
/// Wildcard hosts (`*`, `+`) bind every interface.
pub fn bind_addr_from_url(api_url: &str) -> Result<String, ConfigError> {
    let normalized = api_url
        .replacen("://*", "://0.0.0.0", 1)
        .replacen("://+", "://0.0.0.0", 1);
    let url = reqwest::Url::parse(&normalized).map_err(|e| ConfigError::Invalid {
        key: "ApiUrl",
        reason: e.to_string(),
    })?;

    let host = url.host_str().ok_or_else(|| ConfigError::Invalid {
        key: "ApiUrl",
        reason: "no host".to_string(),
    })?;
    let port = url.port_or_known_default().ok_or_else(|| ConfigError::Invalid {
        key: "ApiUrl",
        reason: "no port".to_string(),
    })?;

    Ok(format!("{}:{}", host, port))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
