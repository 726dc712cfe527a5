//! Configuration management for the log relay.

use std::{net::SocketAddr, str::FromStr};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};

const CONFIG_FILE: &str = "config.toml";

/// Secret keys and their environment variables. These are read verbatim so
/// values like `007` are not reparsed as numbers.
const SECRET_ENV_VARS: [(&str, &str); 4] = [
    ("write_token", "WRITE_TOKEN"),
    ("ably_webhook_secret", "ABLY_WEBHOOK_SECRET"),
    ("telegram_bot_token", "TELEGRAM_BOT_TOKEN"),
    ("telegram_chat_id", "TELEGRAM_CHAT_ID"),
];

/// Complete service configuration with defaults, file, and environment
/// overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`config.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// The four secrets have no defaults. Without a write token every bearer
/// token is rejected, without a webhook secret every webhook is rejected,
/// and without both chat settings notifications are skipped.
///
/// # Example
///
/// ```no_run
/// use logrelay_api::Config;
///
/// let config = Config::load().expect("Failed to load configuration");
///
/// println!("Server will bind to {}:{}", config.host, config.port);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server
    /// Server bind address.
    ///
    /// Environment variable: `HOST`
    #[serde(default = "default_host", alias = "HOST")]
    pub host: String,
    /// Server bind port.
    ///
    /// Environment variable: `PORT`
    #[serde(default = "default_port", alias = "PORT")]
    pub port: u16,

    // Database
    /// PostgreSQL connection URL.
    ///
    /// Environment variable: `DATABASE_URL`
    #[serde(default = "default_database_url", alias = "DATABASE_URL")]
    pub database_url: String,
    /// Maximum number of database connections in the pool.
    ///
    /// Environment variable: `DATABASE_MAX_CONNECTIONS`
    #[serde(default = "default_max_connections", alias = "DATABASE_MAX_CONNECTIONS")]
    pub database_max_connections: u32,

    // Secrets
    /// Bearer token accepted by `/api`.
    ///
    /// Environment variable: `WRITE_TOKEN`
    #[serde(default, deserialize_with = "optional_text", alias = "WRITE_TOKEN")]
    pub write_token: Option<String>,
    /// Shared secret expected in `X-Ably-Auth` by `/ably`.
    ///
    /// Environment variable: `ABLY_WEBHOOK_SECRET`
    #[serde(default, deserialize_with = "optional_text", alias = "ABLY_WEBHOOK_SECRET")]
    pub ably_webhook_secret: Option<String>,

    // Notifications
    /// Telegram bot credential.
    ///
    /// Environment variable: `TELEGRAM_BOT_TOKEN`
    #[serde(default, deserialize_with = "optional_text", alias = "TELEGRAM_BOT_TOKEN")]
    pub telegram_bot_token: Option<String>,
    /// Telegram chat receiving notifications.
    ///
    /// Environment variable: `TELEGRAM_CHAT_ID`
    #[serde(default, deserialize_with = "optional_text", alias = "TELEGRAM_CHAT_ID")]
    pub telegram_chat_id: Option<String>,
    /// Base URL of the Telegram Bot API.
    ///
    /// Environment variable: `TELEGRAM_API_BASE`
    #[serde(default = "default_telegram_api_base", alias = "TELEGRAM_API_BASE")]
    pub telegram_api_base: String,

    // Logging
    /// Log level configuration.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level", alias = "RUST_LOG")]
    pub rust_log: String,
}

impl Config {
    /// Load configuration from defaults, config file, and environment variable
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or validation fails.
    pub fn load() -> Result<Self> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(""));

        for (key, var) in SECRET_ENV_VARS {
            if let Ok(value) = std::env::var(var) {
                figment = figment.merge(Serialized::global(key, value));
            }
        }

        Self::from_figment(figment)
    }

    /// Extracts and validates configuration from an assembled figment.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction or validation fails.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Parse server socket address from host and port configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if host and port do not form a socket address.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr_str).context("Invalid server address")
    }

    /// Get database URL with password masked for logging.
    pub fn database_url_masked(&self) -> String {
        if let Some(at_pos) = self.database_url.find('@') {
            if let Some(colon_pos) = self.database_url[..at_pos].rfind(':') {
                let mut masked = self.database_url.clone();
                masked.replace_range(colon_pos + 1..at_pos, "***");
                return masked;
            }
        }
        self.database_url.clone()
    }

    /// Whether a secret is configured, for logging without exposing it.
    pub fn secret_state(secret: Option<&String>) -> &'static str {
        if secret.is_some() {
            "set"
        } else {
            "unset"
        }
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.database_max_connections == 0 {
            anyhow::bail!("database max_connections must be greater than 0");
        }

        if self.telegram_api_base.trim().is_empty() {
            anyhow::bail!("telegram_api_base must not be empty");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_url: default_database_url(),
            database_max_connections: default_max_connections(),
            write_token: None,
            ably_webhook_secret: None,
            telegram_bot_token: None,
            telegram_chat_id: None,
            telegram_api_base: default_telegram_api_base(),
            rust_log: default_log_level(),
        }
    }
}

/// Accepts secrets written as bare numbers or booleans in `config.toml`, and
/// treats empty strings as unset.
fn optional_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        Str(String),
        Int(i64),
        Uint(u64),
        Float(f64),
        Bool(bool),
    }

    let text = Option::<Text>::deserialize(deserializer)?.map(|text| match text {
        Text::Str(s) => s,
        Text::Int(n) => n.to_string(),
        Text::Uint(n) => n.to_string(),
        Text::Float(n) => n.to_string(),
        Text::Bool(b) => b.to_string(),
    });

    Ok(text.filter(|s| !s.is_empty()))
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_database_url() -> String {
    "postgresql://localhost/logrelay".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
