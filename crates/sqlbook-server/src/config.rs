//! Server configuration.

use anyhow::Result;
use serde::Deserialize;
use sqlbook_core::{PostgresSettings, TranscriptStoreConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    #[serde(default = "default_conversations_dir")]
    pub conversations_dir: PathBuf,
    #[serde(default = "default_database")]
    pub default_database: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,
    #[serde(default)]
    pub postgres: PostgresConfig,
}

/// Connection settings for the query executor.
#[derive(Debug, Clone, Deserialize)]
pub struct PostgresConfig {
    #[serde(default = "default_pg_host")]
    pub host: String,
    #[serde(default = "default_pg_port")]
    pub port: u16,
    #[serde(default = "default_pg_user")]
    pub user: String,
    #[serde(default = "default_pg_password")]
    pub password: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("./web/dist")
}

fn default_conversations_dir() -> PathBuf {
    PathBuf::from("./conversations")
}

fn default_database() -> String {
    sqlbook_types::DEFAULT_DATABASE.to_string()
}

fn default_page_size() -> usize {
    20
}

fn default_query_timeout() -> u64 {
    30
}

fn default_pg_host() -> String {
    "localhost".to_string()
}

fn default_pg_port() -> u16 {
    5432
}

fn default_pg_user() -> String {
    "admin".to_string()
}

fn default_pg_password() -> String {
    "password".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: default_pg_host(),
            port: default_pg_port(),
            user: default_pg_user(),
            password: default_pg_password(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            conversations_dir: default_conversations_dir(),
            default_database: default_database(),
            page_size: default_page_size(),
            query_timeout_secs: default_query_timeout(),
            postgres: PostgresConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config from `config/default.toml`, then the user config directory,
    /// falling back to defaults.
    pub fn load() -> Result<Self> {
        let candidates = [
            Some(PathBuf::from("config/default.toml")),
            dirs::config_dir().map(|dir| dir.join("sqlbook").join("config.toml")),
        ];
        for path in candidates.into_iter().flatten() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Config::default())
    }

    /// Apply `POSTGRES_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply `POSTGRES_*` overrides from an arbitrary lookup.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("POSTGRES_HOST") {
            self.postgres.host = host;
        }
        if let Some(port) = lookup("POSTGRES_PORT").and_then(|p| p.parse().ok()) {
            self.postgres.port = port;
        }
        if let Some(user) = lookup("POSTGRES_USER") {
            self.postgres.user = user;
        }
        if let Some(password) = lookup("POSTGRES_PASSWORD") {
            self.postgres.password = password;
        }
        if let Some(database) = lookup("POSTGRES_DB") {
            self.default_database = database;
        }
    }

    pub fn store_config(&self) -> TranscriptStoreConfig {
        TranscriptStoreConfig {
            default_database: self.default_database.clone(),
            page_size: self.page_size,
        }
    }

    pub fn postgres_settings(&self) -> PostgresSettings {
        PostgresSettings {
            host: self.postgres.host.clone(),
            port: self.postgres.port,
            user: self.postgres.user.clone(),
            password: self.postgres.password.clone(),
            max_connections: self.postgres.max_connections,
            default_database: self.default_database.clone(),
        }
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}
