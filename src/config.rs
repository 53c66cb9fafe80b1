//! Configuration management for ytauth.
//!
//! Values come from the process environment, after an optional `.env` file in
//! the local data directory has been merged in:
//! 1. Environment variables (highest priority)
//! 2. `.env` file at `<data_local_dir>/ytauth/.env`
//! 3. Built-in defaults for everything except the client credentials

use std::{env, path::PathBuf, time::Duration};

use crate::error::AuthError;

pub const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.google.com/o/oauth2/token";
pub const DEFAULT_API_URL: &str = "https://www.googleapis.com/youtube/v3/";
pub const DEFAULT_SCOPE_PREFIX: &str = "https://www.googleapis.com/auth/";
pub const DEFAULT_SCOPES: &str = "youtube.readonly";
pub const DEFAULT_SERVICE_NAME: &str = "ytauth";
const DEFAULT_LOGIN_TIMEOUT_SECS: u64 = 300;
const DEFAULT_READ_TIMEOUT_SECS: u64 = 10;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Loads environment variables from `<data_local_dir>/ytauth/.env`.
///
/// Creates the directory if needed so users know where to put the file. A
/// missing `.env` is fine, the process environment alone may carry the
/// configuration.
pub fn load_env() -> Result<(), AuthError> {
    let path = env_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    match dotenv::from_path(&path) {
        Ok(()) => Ok(()),
        Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AuthError::Config(format!(
            "cannot read {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Location of the `.env` file read by [`load_env`].
pub fn env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("ytauth/.env");
    path
}

/// Runtime configuration for the login subsystem.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub api_key: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub scope_prefix: String,
    pub default_scopes: String,
    /// Service name under which refresh tokens are stored in the OS keychain.
    pub service_name: String,
    /// `None` waits for the browser callback indefinitely.
    pub login_timeout: Option<Duration>,
    pub read_timeout: Duration,
    pub http_timeout: Duration,
}

impl Config {
    /// Builds the configuration from the process environment.
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AuthError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AuthError::Config(format!("{key} must be set")))
        };
        let optional = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let seconds = |key: &str, default: u64| -> Result<u64, AuthError> {
            match lookup(key).filter(|v| !v.trim().is_empty()) {
                Some(raw) => raw.trim().parse().map_err(|_| {
                    AuthError::Config(format!("{key} must be a number of seconds, got {raw:?}"))
                }),
                None => Ok(default),
            }
        };

        let login_timeout = match seconds("YTAUTH_LOGIN_TIMEOUT_SECS", DEFAULT_LOGIN_TIMEOUT_SECS)? {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(Self {
            client_id: required("YTAUTH_CLIENT_ID")?,
            client_secret: required("YTAUTH_CLIENT_SECRET")?,
            api_key: required("YTAUTH_API_KEY")?,
            auth_url: optional("YTAUTH_AUTH_URL", DEFAULT_AUTH_URL),
            token_url: optional("YTAUTH_TOKEN_URL", DEFAULT_TOKEN_URL),
            api_url: optional("YTAUTH_API_URL", DEFAULT_API_URL),
            scope_prefix: optional("YTAUTH_SCOPE_PREFIX", DEFAULT_SCOPE_PREFIX),
            default_scopes: optional("YTAUTH_DEFAULT_SCOPES", DEFAULT_SCOPES),
            service_name: optional("YTAUTH_SERVICE_NAME", DEFAULT_SERVICE_NAME),
            login_timeout,
            read_timeout: Duration::from_secs(seconds(
                "YTAUTH_READ_TIMEOUT_SECS",
                DEFAULT_READ_TIMEOUT_SECS,
            )?),
            http_timeout: Duration::from_secs(seconds(
                "YTAUTH_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
        })
    }
}
