use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub notification_webhook_url: Option<String>,
    pub webhook_secret: Option<String>,
    pub request_timeout_ms: u64,
    pub reschedule_grace_minutes: i64,
    pub reminder_lead_minutes: i64,
    pub reminder_poll_seconds: u64,
    pub log_format_json: bool,
}

/// Knobs the services need; copied out of [`Config`] so library code never
/// touches the process-wide configuration.
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    pub request_timeout: Duration,
    pub reschedule_grace: chrono::Duration,
    pub reminder_lead: chrono::Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_millis(5000),
            reschedule_grace: chrono::Duration::minutes(5),
            reminder_lead: chrono::Duration::minutes(60),
        }
    }
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let store_backend = match env::var("STORE_BACKEND").ok().as_deref().map(str::trim) {
            None | Some("") | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(Error::Config(format!("Invalid value for STORE_BACKEND: {}", other)))
            }
        };
        let database_url = optional_env("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(Error::Config(
                "Missing environment variable: DATABASE_URL".to_string(),
            ));
        }

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            store_backend,
            database_url,
            jwt_secret: get_env("JWT_SECRET")?,
            notification_webhook_url: optional_env("NOTIFICATION_WEBHOOK_URL"),
            webhook_secret: optional_env("WEBHOOK_SECRET"),
            request_timeout_ms: get_env_parse_or("REQUEST_TIMEOUT_MS", 5000)?,
            reschedule_grace_minutes: get_env_parse_or("RESCHEDULE_GRACE_MINUTES", 5)?,
            reminder_lead_minutes: get_env_parse_or("REMINDER_LEAD_MINUTES", 60)?,
            reminder_poll_seconds: get_env_parse_or("REMINDER_POLL_SECONDS", 60)?,
            log_format_json: optional_env("LOG_FORMAT").as_deref() == Some("json"),
        })
    }

    pub fn for_tests() -> Self {
        Self {
            server_address: "127.0.0.1:0".to_string(),
            store_backend: StoreBackend::Memory,
            database_url: None,
            jwt_secret: "test_secret_key".to_string(),
            notification_webhook_url: None,
            webhook_secret: None,
            request_timeout_ms: 5000,
            reschedule_grace_minutes: 5,
            reminder_lead_minutes: 60,
            reminder_poll_seconds: 60,
            log_format_json: false,
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            reschedule_grace: chrono::Duration::minutes(self.reschedule_grace_minutes),
            reminder_lead: chrono::Duration::minutes(self.reminder_lead_minutes),
        }
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}
