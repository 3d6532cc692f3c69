use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

pub const DEFAULT_SCORING_URL: &str = "http://localhost:5000/analyze";

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub scoring_url: String,
    pub extract_attempts: u32,
    pub extract_backoff: Duration,
    pub readiness_timeout: Duration,
    pub include_raw_html: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup; every key has a default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("PORT").unwrap_or_else(|| "3000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let scoring_url = lookup("SCORING_URL").unwrap_or_else(|| DEFAULT_SCORING_URL.to_string());

        let extract_attempts: u32 = parse_or(&lookup, "EXTRACT_ATTEMPTS", 3)?;
        if extract_attempts == 0 {
            return Err(AppError::ConfigError("EXTRACT_ATTEMPTS must be at least 1".to_string()));
        }
        let backoff_ms: u64 = parse_or(&lookup, "EXTRACT_BACKOFF_MS", 1000)?;
        let readiness_ms: u64 = parse_or(&lookup, "READINESS_TIMEOUT_MS", 10_000)?;
        let include_raw_html: bool = parse_or(&lookup, "INCLUDE_RAW_HTML", true)?;

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            scoring_url,
            extract_attempts,
            extract_backoff: Duration::from_millis(backoff_ms),
            readiness_timeout: Duration::from_millis(readiness_ms),
            include_raw_html,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            scoring_url: DEFAULT_SCORING_URL.to_string(),
            extract_attempts: 3,
            extract_backoff: Duration::from_secs(1),
            readiness_timeout: Duration::from_secs(10),
            include_raw_html: true,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| AppError::ConfigError(format!("Invalid {}: {}", key, e))),
        None => Ok(default),
    }
}
