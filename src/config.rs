//! Configuration module for environment variables and application settings

use std::env;
use anyhow::{Result, anyhow};
use once_cell::sync::Lazy;

/// Global application configuration loaded from environment variables
pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    Config::from_env().expect("Failed to load configuration from environment")
});

#[derive(Debug, Clone)]
pub struct Config {
    /// Remote record store configuration
    pub store: StoreConfig,

    /// Magic-link authentication configuration
    pub auth: AuthConfig,

    /// Outbound email configuration
    pub mail: MailConfig,

    /// Server configuration
    pub server: ServerConfig,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Record store API root
    pub api_url: String,
    pub api_key: String,
    pub base_id: String,
    /// Collection identifiers
    pub students_table: String,
    pub deadlines_table: String,
    pub mentors_table: String,
    pub progress_table: String,
    /// Query cache TTL in seconds
    pub cache_ttl: u64,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret used to sign magic-link tokens
    pub link_secret: String,
    /// Key gating the team preview mode
    pub admin_key: String,
    /// Maximum magic-link age in seconds
    pub token_max_age: u64,
    /// Public base URL embedded in magic links
    pub app_url: String,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from_email: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            store: StoreConfig {
                api_url: env::var("STORE_API_URL")
                    .unwrap_or_else(|_| "https://api.airtable.com/v0".to_string()),
                api_key: env::var("STORE_API_KEY")
                    .map_err(|_| anyhow!("STORE_API_KEY environment variable is required"))?,
                base_id: env::var("STORE_BASE_ID")
                    .map_err(|_| anyhow!("STORE_BASE_ID environment variable is required"))?,
                students_table: env::var("STUDENT_TABLE")
                    .unwrap_or_else(|_| "Students".to_string()),
                deadlines_table: env::var("DEADLINES_TABLE")
                    .unwrap_or_else(|_| "Deadlines".to_string()),
                mentors_table: env::var("MENTOR_TABLE")
                    .unwrap_or_else(|_| "Mentors".to_string()),
                progress_table: env::var("PROGRESS_TABLE")
                    .unwrap_or_else(|_| "Progress Updates".to_string()),
                cache_ttl: env::var("QUERY_CACHE_TTL")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse()
                    .unwrap_or(300),
            },

            auth: AuthConfig {
                link_secret: env::var("MAGIC_LINK_SECRET")
                    .map_err(|_| anyhow!("MAGIC_LINK_SECRET environment variable is required"))?,
                admin_key: env::var("ADMIN_KEY")
                    .map_err(|_| anyhow!("ADMIN_KEY environment variable is required"))?,
                token_max_age: env::var("TOKEN_MAX_AGE")
                    .unwrap_or_else(|_| "3600".to_string())
                    .parse()
                    .unwrap_or(3600),
                app_url: env::var("APP_URL")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            },

            mail: MailConfig {
                api_url: env::var("MAIL_API_URL")
                    .unwrap_or_else(|_| "https://api.resend.com".to_string()),
                api_key: env::var("MAIL_API_KEY")
                    .map_err(|_| anyhow!("MAIL_API_KEY environment variable is required"))?,
                from_email: env::var("FROM_EMAIL")
                    .unwrap_or_else(|_| "Mentor Portal <onboarding@resend.dev>".to_string()),
            },

            server: ServerConfig {
                host: env::var("SERVER_HOST")
                    .unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
            },
        })
    }
}
