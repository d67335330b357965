mod database;

pub use database::DatabaseConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Root configuration for the tapquest server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration.
    pub database: DatabaseConfig,

    /// Admin API configuration.
    #[serde(default)]
    pub admin: AdminConfig,

    /// Telegram bot configuration.
    #[serde(default)]
    pub telegram: TelegramConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        Self::parse_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse_toml(content: &str) -> Result<Self> {
        // Substitute environment variables
        let content = substitute_env_vars(content);

        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load configuration with defaults.
    pub fn default_with_database_url(url: &str) -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: url.to_string(),
                ..Default::default()
            },
            admin: AdminConfig::default(),
            telegram: TelegramConfig::default(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS.
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

/// Admin API configuration.
///
/// The admin surface is disabled entirely unless `enabled` is set, and
/// every admin request must carry `Authorization: Bearer <token>`. This is
/// explicit startup configuration, not an ambient per-request environment
/// lookup.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdminConfig {
    /// Whether admin routes accept any requests at all.
    #[serde(default)]
    pub enabled: bool,

    /// Service credential admin requests must present as a bearer token.
    #[serde(default)]
    pub token: String,
}

/// Telegram bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token used to verify WebApp init data signatures.
    #[serde(default)]
    pub bot_token: String,

    /// Maximum accepted age of init data in seconds (0 disables the check).
    #[serde(default = "default_init_data_max_age")]
    pub init_data_max_age_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            init_data_max_age_secs: default_init_data_max_age(),
        }
    }
}

fn default_init_data_max_age() -> u64 {
    86400
}

/// Substitute `${VAR}` references with environment variable values.
fn substitute_env_vars(content: &str) -> String {
    let mut result = content.to_string();
    let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();

    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        if let Ok(value) = std::env::var(var_name) {
            result = result.replace(&cap[0], &value);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
            [database]
            url = "sqlite://tapquest.db"
        "#;

        let config = AppConfig::parse_toml(toml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert!(config.server.cors_enabled);
        assert!(!config.admin.enabled);
        assert_eq!(config.telegram.init_data_max_age_secs, 86400);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [server]
            port = 9000
            cors_enabled = false

            [database]
            url = "sqlite::memory:"
            pool_size = 2

            [admin]
            enabled = true
            token = "super-secret"

            [telegram]
            bot_token = "12345:abcdef"
            init_data_max_age_secs = 600
        "#;

        let config = AppConfig::parse_toml(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert!(!config.server.cors_enabled);
        assert!(config.admin.enabled);
        assert_eq!(config.admin.token, "super-secret");
        assert_eq!(config.telegram.bot_token, "12345:abcdef");
        assert_eq!(config.telegram.init_data_max_age_secs, 600);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TAPQUEST_TEST_DB_URL", "sqlite://from-env.db");
        let toml = r#"
            [database]
            url = "${TAPQUEST_TEST_DB_URL}"
        "#;

        let config = AppConfig::parse_toml(toml).unwrap();
        assert_eq!(config.database.url, "sqlite://from-env.db");
    }

    #[test]
    fn test_missing_database_section_fails() {
        let result = AppConfig::parse_toml("[server]\nport = 1");
        assert!(result.is_err());
    }
}
