use std::{env, time::Duration};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Cache TTL in seconds (default: 60)
    pub cache_ttl_seconds: u64,
    /// Maximum number of cache entries (default: 10,000)
    /// Note: Only used when the `memory` feature is enabled.
    pub cache_max_entries: usize,
    /// Messages buffered per queue topic (default: 100)
    pub queue_capacity: usize,
    /// Path to SQLite database file (default: "clientdesk.db")
    /// Note: Only used when the `sqlite` feature is enabled.
    pub sqlite_path: String,
    /// Redis connection URL (default: "redis://localhost:6379")
    /// Note: Only used when the `redis` feature is enabled.
    pub redis_url: String,
    /// Emit logs as JSON lines when `LOG_FORMAT=json`.
    pub log_json: bool,
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CACHE_TTL_SECONDS` - Cache TTL in seconds (default: 60)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 10,000)
    /// - `QUEUE_CAPACITY` - Messages buffered per topic (default: 100)
    /// - `SQLITE_PATH` - SQLite database path (default: "clientdesk.db")
    /// - `REDIS_URL` - Redis connection URL (default: "redis://localhost:6379")
    /// - `LOG_FORMAT` - `json` for JSON logs, anything else for text
    pub fn from_env() -> Self {
        Self {
            cache_ttl_seconds: parse_var("CACHE_TTL_SECONDS", 60),
            cache_max_entries: parse_var("CACHE_MAX_ENTRIES", 10_000),
            queue_capacity: parse_var("QUEUE_CAPACITY", 100),
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "clientdesk.db".to_string()),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            log_json: env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")),
        }
    }

    /// Get cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
