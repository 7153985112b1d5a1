// src/config.rs

use std::env;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub log_dir: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    /// Upper bound for a single authoring or grading unit of work.
    pub transaction_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let log_dir = env::var("LOG_DIR")
            .unwrap_or_else(|_| "logs".to_string());

        Self {
            database_url,
            rust_log,
            log_dir,
            max_connections: parse_or("DB_MAX_CONNECTIONS", 5),
            acquire_timeout: Duration::from_secs(parse_or("DB_ACQUIRE_TIMEOUT_SECS", 3)),
            transaction_timeout: Duration::from_secs(parse_or("TRANSACTION_TIMEOUT_SECS", 10)),
        }
    }

    /// Configuration for an in-memory store. Used by tests and local tooling.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            rust_log: "error".to_string(),
            log_dir: "logs".to_string(),
            max_connections: 1,
            acquire_timeout: Duration::from_secs(3),
            transaction_timeout: Duration::from_secs(10),
        }
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring unparsable {}={:?}, using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_falls_back_when_unset() {
        let value: u32 = parse_or("ELEARN_QUIZ_TEST_UNSET_VARIABLE", 7);
        assert_eq!(value, 7);
    }

    #[test]
    fn test_in_memory_uses_single_connection() {
        let config = Config::in_memory();
        assert_eq!(config.max_connections, 1);
        assert_eq!(config.database_url, "sqlite::memory:");
    }
}
