use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::env;
use config;

pub const DEFAULT_CATALOG_PAGE_SIZE: u32 = 12;

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub web: WebConfig,
    // Populated from the .env file
    pub database_path: String,
    pub media_path: String,
    pub allowed_origins: String,
    pub log_level: String,
    pub session_secret_key: String,
    pub admin_url_prefix: String,
    pub use_secure_cookies: bool,
    pub catalog_page_size: u32,
}

fn required_var(name: &str) -> Result<String, config::ConfigError> {
    env::var(name).map_err(|_| config::ConfigError::Message(format!(
        "FATAL: Environment variable '{}' is not set in your .env file.", name
    )))
}

impl Config {
    pub fn from_env(env_path: &Path) -> Result<Self, config::ConfigError> {
        dotenvy::from_path(env_path)
            .map_err(|e| config::ConfigError::Message(format!(
                "FATAL: Failed to load .env file from '{}'. Error: {}", env_path.display(), e
            )))?;

        let database_path = required_var("DATABASE_PATH")?;
        let media_path = required_var("MEDIA_PATH")?;
        let session_secret_key = required_var("SESSION_SECRET_KEY")?;

        // 128 hex characters, i.e. 64 bytes of key material.
        if session_secret_key.len() != 128 || !session_secret_key.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(config::ConfigError::Message(
                "FATAL: 'SESSION_SECRET_KEY' must be 128 hexadecimal characters long (64 bytes).".to_string()
            ));
        }

        let admin_url_prefix = required_var("ADMIN_URL_PREFIX")?;
        if !is_valid_url_prefix(&admin_url_prefix) {
            return Err(config::ConfigError::Message(
                "FATAL: 'ADMIN_URL_PREFIX' must not be empty and can only contain letters, numbers, underscores, and hyphens.".to_string()
            ));
        }

        let allowed_origins = env::var("ALLOWED_ORIGINS").unwrap_or_default();
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let use_secure_cookies = env::var("USE_SECURE_COOKIES")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);

        let catalog_page_size = match env::var("CATALOG_PAGE_SIZE") {
            Ok(raw) => parse_page_size(&raw)?,
            Err(_) => DEFAULT_CATALOG_PAGE_SIZE,
        };

        for (name, value) in [("DATABASE_PATH", &database_path), ("MEDIA_PATH", &media_path)] {
            if Path::new(value).is_relative() {
                return Err(config::ConfigError::Message(format!(
                    "FATAL: The '{}' in your .env file is a relative path ('{}'). It MUST be an absolute path.",
                    name, value
                )));
            }
        }

        let builder = config::Config::builder()
            // Base settings (web host/port) come from the TOML file.
            .add_source(config::File::new("config/default.toml", config::FileFormat::Toml))
            .set_override("database_path", database_path)?
            .set_override("media_path", media_path)?
            .set_override("session_secret_key", session_secret_key)?
            .set_override("allowed_origins", allowed_origins)?
            .set_override("log_level", log_level)?
            .set_override("use_secure_cookies", use_secure_cookies)?
            .set_override("admin_url_prefix", admin_url_prefix)?
            .set_override("catalog_page_size", i64::from(catalog_page_size))?
            .build()?;

        builder.try_deserialize()
    }

    /// SQLite database holding admins, settings, properties, leads, assets and schedules.
    pub fn site_db_path(&self) -> PathBuf {
        PathBuf::from(&self.database_path)
            .join("site")
            .join("site.db")
    }

    /// redb database holding CMS blocks.
    pub fn content_db_path(&self) -> PathBuf {
        PathBuf::from(&self.database_path)
            .join("content")
            .join("content.db")
    }

    pub fn admin_path(&self, suffix: &str) -> String {
        format!("/management/{}/{}", self.admin_url_prefix, suffix.trim_start_matches('/'))
    }
}

fn is_valid_url_prefix(prefix: &str) -> bool {
    !prefix.is_empty() && prefix.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

fn parse_page_size(raw: &str) -> Result<u32, config::ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(size) if (1..=100).contains(&size) => Ok(size),
        _ => Err(config::ConfigError::Message(format!(
            "FATAL: 'CATALOG_PAGE_SIZE' must be a whole number between 1 and 100 (got '{}').", raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_prefix_rejects_slashes_and_empty() {
        assert!(is_valid_url_prefix("painel-2024"));
        assert!(!is_valid_url_prefix(""));
        assert!(!is_valid_url_prefix("a/b"));
    }

    #[test]
    fn page_size_must_be_in_range() {
        assert_eq!(parse_page_size(" 24 ").ok(), Some(24));
        assert!(parse_page_size("0").is_err());
        assert!(parse_page_size("abc").is_err());
    }
}
