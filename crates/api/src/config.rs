//! Runtime configuration, read from the environment.
//!
//! Every setting has a development default. Defaults that are unsafe in
//! production (the session secret) are logged at `warn` when used.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, anyhow};
use chrono::Duration;

use warden_auth::MIN_PASSWORD_LENGTH;
use warden_observability::LogFormat;

const DEV_SESSION_SECRET: &str = "dev-secret";

/// Credentials for an administrator seeded at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub session_secret: String,
    pub session_ttl: Duration,
    pub reset_token_ttl: Duration,
    /// Where reset links point when the caller doesn't supply a `return_url`.
    pub reset_return_url: String,
    pub password_min_length: usize,
    pub policy_table_path: Option<PathBuf>,
    pub bootstrap_admin: Option<BootstrapAdmin>,
    pub database_url: Option<String>,
    pub log_format: LogFormat,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            session_secret: DEV_SESSION_SECRET.to_string(),
            session_ttl: Duration::minutes(60),
            reset_token_ttl: Duration::minutes(30),
            reset_return_url: "http://localhost:3000/reset-password".to_string(),
            password_min_length: MIN_PASSWORD_LENGTH,
            policy_table_path: None,
            bootstrap_admin: None,
            database_url: None,
            log_format: LogFormat::Json,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(addr) = get("BIND_ADDR") {
            config.bind_addr = addr
                .parse()
                .with_context(|| format!("BIND_ADDR is not a socket address: {addr}"))?;
        }

        match get("SESSION_SECRET") {
            Some(secret) => config.session_secret = secret,
            None => tracing::warn!("SESSION_SECRET not set; using insecure dev default"),
        }

        if let Some(minutes) = get("SESSION_TTL_MINUTES") {
            config.session_ttl = parse_minutes("SESSION_TTL_MINUTES", &minutes)?;
        }
        if let Some(minutes) = get("RESET_TOKEN_TTL_MINUTES") {
            config.reset_token_ttl = parse_minutes("RESET_TOKEN_TTL_MINUTES", &minutes)?;
        }
        if let Some(url) = get("RESET_RETURN_URL") {
            config.reset_return_url = url;
        }
        if let Some(len) = get("PASSWORD_MIN_LENGTH") {
            let len: usize = len
                .parse()
                .with_context(|| format!("PASSWORD_MIN_LENGTH is not a number: {len}"))?;
            if len < MIN_PASSWORD_LENGTH {
                tracing::warn!(requested = len, "PASSWORD_MIN_LENGTH below 8; using 8");
            }
            config.password_min_length = len.max(MIN_PASSWORD_LENGTH);
        }

        config.policy_table_path = get("POLICY_TABLE_PATH").map(PathBuf::from);

        config.bootstrap_admin = match (get("BOOTSTRAP_ADMIN_EMAIL"), get("BOOTSTRAP_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(BootstrapAdmin { email, password }),
            (None, None) => None,
            _ => {
                return Err(anyhow!(
                    "BOOTSTRAP_ADMIN_EMAIL and BOOTSTRAP_ADMIN_PASSWORD must be set together"
                ));
            }
        };

        config.database_url = get("DATABASE_URL");

        if let Some(format) = get("LOG_FORMAT") {
            config.log_format = format.parse().map_err(|e: String| anyhow!(e))?;
        }

        Ok(config)
    }
}

fn parse_minutes(key: &str, value: &str) -> anyhow::Result<Duration> {
    let minutes: i64 = value
        .parse()
        .with_context(|| format!("{key} is not a whole number of minutes: {value}"))?;
    if minutes <= 0 {
        return Err(anyhow!("{key} must be positive"));
    }
    Ok(Duration::minutes(minutes))
}
