use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::{env, time::Duration};

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    /// Base URI this authority issues tokens under.
    pub issuer: String,
    /// Where remote providers send the user agent back after sign-in.
    pub callback_uri: String,
    /// Where the user agent lands after /logout.
    pub post_logout_redirect_uri: String,
    /// Root directory for the rp/users/op storage namespaces.
    pub storage_root: PathBuf,
    /// Cost factor handed to the account store when hashing passwords.
    pub salt_rounds: u32,
    pub discovery_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let issuer = require_url("OP_ISSUER")?;
        let callback_uri = require_url("OP_CALLBACK_URI")?;
        let post_logout_redirect_uri = require_url("OP_POST_LOGOUT_REDIRECT_URI")?;

        let storage_root = env::var("OP_STORAGE_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("db/oidc"));

        let salt_rounds = env::var("OP_SALT_ROUNDS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let discovery_timeout = Duration::from_secs(
            env::var("OP_DISCOVERY_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5),
        );

        Ok(Self {
            addr,
            app_env,
            issuer,
            callback_uri,
            post_logout_redirect_uri,
            storage_root,
            salt_rounds,
            discovery_timeout,
        })
    }
}

// Required option that must also parse as an absolute URL.
fn require_url(key: &'static str) -> Result<String, ConfigError> {
    let value = env::var(key).map_err(|_| ConfigError::Missing(key))?;
    Url::parse(&value).map_err(|_| ConfigError::Invalid(key))?;
    Ok(value)
}
