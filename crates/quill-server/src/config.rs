use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Placeholder token secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me", "dev-secret-change-me", "secret"];

/// Longest accepted token lifetime: one year.
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// Longest accepted request budget.
const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("QUILL_TOKEN_SECRET is unset or still a placeholder")]
    MissingSecret,
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Env {
    Local,
    Dev,
    Prod,
}

impl FromStr for Env {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Self::Local),
            "dev" => Ok(Self::Dev),
            "prod" => Ok(Self::Prod),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::Dev => "dev",
            Self::Prod => "prod",
        })
    }
}

/// Process configuration. Built once in `main` and handed to whatever needs it.
pub struct Config {
    pub env: Env,
    pub token_secret: String,
    pub token_ttl: chrono::Duration,
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = parse_or(&get, "QUILL_ENV", Env::Local)?;

        let token_secret = get("QUILL_TOKEN_SECRET").unwrap_or_default();
        if token_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&token_secret.as_str()) {
            return Err(ConfigError::MissingSecret);
        }

        let ttl_hours: i64 = parse_or(&get, "QUILL_TOKEN_TTL_HOURS", 4)?;
        let token_ttl = Some(ttl_hours)
            .filter(|h| (1..=MAX_TOKEN_TTL_HOURS).contains(h))
            .and_then(chrono::TimeDelta::try_hours)
            .ok_or_else(|| ConfigError::Invalid {
                var: "QUILL_TOKEN_TTL_HOURS",
                value: ttl_hours.to_string(),
            })?;

        let db_path = get("QUILL_DB_PATH").unwrap_or_else(|| "quill.db".into()).into();

        let host = get("QUILL_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_or(&get, "QUILL_PORT", 8081)?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .map_err(|_| ConfigError::Invalid { var: "QUILL_HOST", value: host })?;

        let timeout_secs: u64 = parse_or(&get, "QUILL_REQUEST_TIMEOUT_SECS", 5)?;
        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&timeout_secs) {
            return Err(ConfigError::Invalid {
                var: "QUILL_REQUEST_TIMEOUT_SECS",
                value: timeout_secs.to_string(),
            });
        }

        Ok(Self {
            env,
            token_secret,
            token_ttl,
            db_path,
            addr,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_or<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}
