//! Centralized configuration (environment variables + defaults).

use anyhow::{anyhow, Context};
use std::fmt::Display;
use std::str::FromStr;
use tracing::info;

pub const DEFAULT_API_PORT: u16 = 3333;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            other => Err(anyhow!("unknown environment '{}'", other)),
        }
    }
}

impl Environment {
    /// Tracing filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(self) -> &'static str {
        match self {
            Environment::Development => "debug,sqlx=warn,hyper=info",
            Environment::Production | Environment::Test => "info,sqlx=warn",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub environment: Environment,
    pub api_port: u16,
    /// Database URL must be provided (no default) for safety.
    pub database_url: String,
    /// Allowed CORS origin. Any origin is allowed when unset.
    pub frontend_url: Option<String>,
    pub database_max_connections: u32,
    /// Keys that were unset and fell back to their defaults.
    pub defaults_applied: Vec<&'static str>,
}

impl Config {
    /// Reads the process environment, after loading `.env` if present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut defaults_applied = Vec::new();

        let environment = match non_empty("APP_ENV").or_else(|| non_empty("NODE_ENV")) {
            Some(raw) => raw.parse::<Environment>().context("APP_ENV")?,
            None => {
                defaults_applied.push("APP_ENV");
                Environment::default()
            }
        };
        let api_port = parse_or(
            non_empty("API_PORT"),
            "API_PORT",
            DEFAULT_API_PORT,
            &mut defaults_applied,
        )?;
        let database_max_connections = parse_or(
            non_empty("DATABASE_MAX_CONNECTIONS"),
            "DATABASE_MAX_CONNECTIONS",
            DEFAULT_MAX_CONNECTIONS,
            &mut defaults_applied,
        )?
        .max(1);

        Ok(Self {
            environment,
            api_port,
            database_url: non_empty("DATABASE_URL").context("DATABASE_URL must be set")?,
            frontend_url: non_empty("FRONTEND_URL").map(|v| v.trim().to_string()),
            database_max_connections,
            defaults_applied,
        })
    }

    /// Logs the resolved settings. Call once the tracing subscriber is installed.
    /// The database URL is left out since it may carry credentials.
    pub fn log_summary(&self) {
        for key in &self.defaults_applied {
            info!("{key} not set, using default");
        }
        info!(
            environment = ?self.environment,
            api_port = self.api_port,
            frontend_url = self.frontend_url.as_deref().unwrap_or("*"),
            max_connections = self.database_max_connections,
            "configuration loaded"
        );
    }
}

fn parse_or<T>(
    raw: Option<String>,
    key: &'static str,
    default: T,
    defaults_applied: &mut Vec<&'static str>,
) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("invalid {} value '{}': {}", key, raw, e)),
        None => {
            defaults_applied.push(key);
            Ok(default)
        }
    }
}
