//! Shared configuration for the Leaflink CLI.
//!
//! TOML config file, `LEAFLINK_*` environment overrides, the auth-token
//! credential chain (env + keyring + plaintext), the persisted
//! client-instance id, and translation to
//! `leaflink_core::CoordinatorConfig`.

use std::path::PathBuf;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use leaflink_api::BrokerConfig;
use leaflink_core::CoordinatorConfig;

const KEYRING_SERVICE: &str = "leaflink";
const KEYRING_TOKEN_KEY: &str = "auth-token";
const TOKEN_ENV: &str = "LEAFLINK_TOKEN";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Backend base URL (trailing slash recommended).
    #[serde(default = "default_server")]
    pub server: String,

    /// Topic namespace the device firmware publishes under.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Auth token (plaintext — prefer keyring or `LEAFLINK_TOKEN`).
    pub token: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub broker: BrokerSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: default_server(),
            namespace: default_namespace(),
            token: None,
            defaults: Defaults::default(),
            broker: BrokerSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Watch-command refresh interval, seconds.
    #[serde(default = "default_refresh")]
    pub refresh_secs: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            refresh_secs: default_refresh(),
        }
    }
}

/// Broker connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrokerSettings {
    /// Broker URL (`mqtt://host:port` or `mqtts://host:port`).
    #[serde(default = "default_broker_url")]
    pub url: String,

    #[serde(default)]
    pub username: String,

    /// Broker password (plaintext — broker credentials are shared, not
    /// per-user).
    #[serde(default)]
    pub password: String,
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            url: default_broker_url(),
            username: String::new(),
            password: String::new(),
        }
    }
}

fn default_server() -> String {
    "https://api.leaflink.dev/".into()
}
fn default_namespace() -> String {
    "flowey".into()
}
fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_refresh() -> u64 {
    30
}
fn default_broker_url() -> String {
    "mqtt://broker.leaflink.dev:1883".into()
}

// ── Config file paths ───────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

fn config_dir() -> PathBuf {
    ProjectDirs::from("dev", "leaflink", "leaflink")
        .map_or_else(dirs_fallback, |dirs| dirs.config_dir().to_path_buf())
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("leaflink");
    p
}

// ── Config loading / saving ─────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load a Config from an explicit file path (tests and `--config`).
pub fn load_config_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("LEAFLINK_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning defaults when the file is missing or broken.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Auth token chain ────────────────────────────────────────────────

/// Resolve the bearer token: env var, then keyring, then plaintext
/// config. `None` means not signed in — that is a state, not an error.
pub fn resolve_token(config: &Config) -> Option<SecretString> {
    if let Ok(val) = std::env::var(TOKEN_ENV) {
        if !val.is_empty() {
            return Some(SecretString::from(val));
        }
    }

    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, KEYRING_TOKEN_KEY) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    config.token.clone().map(SecretString::from)
}

/// Persist a token after login: keyring when available, plaintext config
/// otherwise.
pub fn store_token(token: &str) -> Result<(), ConfigError> {
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, KEYRING_TOKEN_KEY) {
        if entry.set_password(token).is_ok() {
            return Ok(());
        }
    }

    let mut cfg = load_config_or_default();
    cfg.token = Some(token.to_string());
    save_config(&cfg)
}

/// Remove the stored token from every chain member (logout).
pub fn clear_token() -> Result<(), ConfigError> {
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, KEYRING_TOKEN_KEY) {
        let _ = entry.delete_credential();
    }

    let mut cfg = load_config_or_default();
    if cfg.token.take().is_some() {
        save_config(&cfg)?;
    }
    Ok(())
}

// ── Instance identity ───────────────────────────────────────────────

/// Load the persisted client-instance id, minting one on first use.
///
/// Feeds the broker client id; stable across runs so sessions from the
/// same installation are recognizable in broker logs.
pub fn load_instance_id() -> Result<String, ConfigError> {
    load_instance_id_from(&config_dir().join("instance-id"))
}

/// Instance id from an explicit path (tests).
pub fn load_instance_id_from(path: &std::path::Path) -> Result<String, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(id) if !id.trim().is_empty() => Ok(id.trim().to_string()),
        _ => {
            let id = uuid::Uuid::new_v4().to_string();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &id)?;
            Ok(id)
        }
    }
}

// ── Translation to the coordinator ──────────────────────────────────

/// Build a `CoordinatorConfig` from the loaded config plus the token
/// chain and instance identity.
pub fn to_coordinator_config(config: &Config) -> Result<CoordinatorConfig, ConfigError> {
    let server_url: url::Url = config.server.parse().map_err(|_| ConfigError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {}", config.server),
    })?;

    let broker_url: url::Url =
        config
            .broker
            .url
            .parse()
            .map_err(|_| ConfigError::Validation {
                field: "broker.url".into(),
                reason: format!("invalid URL: {}", config.broker.url),
            })?;

    let broker = BrokerConfig {
        url: broker_url,
        username: config.broker.username.clone(),
        password: config.broker.password.clone(),
        ..BrokerConfig::default()
    };

    Ok(CoordinatorConfig {
        server_url,
        broker,
        namespace: config.namespace.clone(),
        auth_token: resolve_token(config),
        instance_id: load_instance_id()?,
    })
}

// ── Tests ───────────────────────────────────────────────────────────
