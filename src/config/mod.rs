use std::str::FromStr;

use anyhow::{Result, bail};
use dotenvy::dotenv;
use jsonwebtoken::Algorithm;
use serde::Deserialize;

pub const DEV_SECRET_KEY: &str = "dev-secret-key-change-in-production";

/// Ten years.
pub const MAX_TOKEN_TTL_MINUTES: i64 = 525_600 * 10;

/// Configuration for the application
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Name reported by the root endpoint
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Deployment environment; `production` turns on secure cookies
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Database connection URL
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Database name, overrides the one in the URL
    #[serde(default = "default_database_name")]
    pub database_name: String,
    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,
    /// HMAC secret used to sign access tokens
    #[serde(default = "default_secret_key")]
    pub jwt_secret_key: String,
    #[serde(default = "default_algorithm")]
    pub jwt_algorithm: String,
    /// Lifetime of an access token and of its cookie
    #[serde(default = "default_token_ttl")]
    pub access_token_expire_minutes: i64,
    /// Origins allowed to make credentialed cross-origin requests
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

fn default_app_name() -> String {
    "Freelance ClientHub API".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_database_url() -> String {
    "postgres://localhost:5432".to_string()
}

fn default_database_name() -> String {
    "clienthub".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_secret_key() -> String {
    DEV_SECRET_KEY.to_string()
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

fn default_token_ttl() -> i64 {
    60
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:8000".to_string(),
        "http://localhost:3000".to_string(),
    ]
}

fn default_bind_address() -> String {
    "0.0.0.0:8000".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            environment: default_environment(),
            database_url: default_database_url(),
            database_name: default_database_name(),
            database_max_connections: default_max_connections(),
            jwt_secret_key: default_secret_key(),
            jwt_algorithm: default_algorithm(),
            access_token_expire_minutes: default_token_ttl(),
            cors_origins: default_cors_origins(),
            bind_address: default_bind_address(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize environment variables into Config struct
    /// 3. Reject values the server cannot start with
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::from_env::<Config>()?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret_key.is_empty() {
            bail!("JWT_SECRET_KEY must not be empty");
        }
        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&self.access_token_expire_minutes) {
            bail!(
                "ACCESS_TOKEN_EXPIRE_MINUTES must be between 1 and {MAX_TOKEN_TTL_MINUTES}, got {}",
                self.access_token_expire_minutes
            );
        }
        self.signing_algorithm()?;

        if self.is_production() && self.jwt_secret_key == DEV_SECRET_KEY {
            tracing::warn!("running in production with the development JWT secret");
        }

        Ok(())
    }

    /// Get a direct reference to the database URL
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Parse the configured signing algorithm. Only the HMAC family is
    /// usable with a shared secret.
    pub fn signing_algorithm(&self) -> Result<Algorithm> {
        let algorithm = Algorithm::from_str(&self.jwt_algorithm)
            .map_err(|_| anyhow::anyhow!("unknown JWT_ALGORITHM {}", self.jwt_algorithm))?;

        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
            other => bail!(
                "JWT_ALGORITHM {other:?} needs a key pair, only HS256/HS384/HS512 are supported"
            ),
        }
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    Config::load()
}
