//! Configuration Module
//!
//! Handles loading and managing proxy configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::cache::TtlPolicy;

/// Upper bound for `SESSION_TTL_HOURS` (one year).
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Inbound request budget per client IP on `/api` routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSettings {
    /// Window length in milliseconds
    pub window_ms: u64,
    /// Requests allowed per window
    pub max_requests: u32,
}

impl RateLimitSettings {
    /// Milliseconds for one request slot to replenish, never zero.
    pub fn replenish_ms(&self) -> u64 {
        (self.window_ms / u64::from(self.max_requests.max(1))).max(1)
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            window_ms: 60_000,
            max_requests: 100,
        }
    }
}

/// Proxy configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Upstream API base URL, `/export` and `/login` are appended
    pub mfl_base_url: String,
    /// Ceiling on upstream read calls per second
    pub requests_per_second: u32,
    /// Timeout in seconds for a single upstream call
    pub request_timeout: u64,
    /// Deadline in seconds for the whole login handshake
    pub login_timeout: u64,
    /// User-Agent sent upstream
    pub user_agent: String,
    /// Session lifetime in hours
    pub session_ttl_hours: i64,
    /// Seconds between expired-session sweeps
    pub session_sweep_interval: u64,
    /// Seconds between expired-cache-entry sweeps
    pub cache_cleanup_interval: u64,
    /// TTL per cache category
    pub cache_ttl: TtlPolicy,
    /// Per-IP limit on inbound `/api` requests
    pub rate_limit: RateLimitSettings,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PORT` - HTTP server port (default: 3000)
    /// - `MFL_BASE_URL` - Upstream base URL (default: `https://api.myfantasyleague.com/2025`)
    /// - `MFL_REQUESTS_PER_SECOND` - Upstream read ceiling (default: 2)
    /// - `MFL_REQUEST_TIMEOUT_SECS` - Per-call timeout (default: 10)
    /// - `MFL_LOGIN_TIMEOUT_SECS` - Login handshake deadline (default: 8)
    /// - `MFL_USER_AGENT` - Outbound User-Agent (default: `MFL-Flutter-App/1.0`)
    /// - `SESSION_TTL_HOURS` - Session lifetime, 1 to 8760 (default: 8)
    /// - `SESSION_SWEEP_INTERVAL` - Session sweep frequency in seconds, at least 1 (default: 3600)
    /// - `CACHE_CLEANUP_INTERVAL` - Cache sweep frequency in seconds, at least 1 (default: 120)
    /// - `RATE_LIMIT_WINDOW_MS` - Inbound rate-limit window (default: 60000)
    /// - `RATE_LIMIT_MAX_REQUESTS` - Inbound requests per window and IP (default: 100)
    /// - `CACHE_TTL_LEAGUE_INFO`, `CACHE_TTL_ROSTERS`, `CACHE_TTL_LIVE_SCORES`,
    ///   `CACHE_TTL_PLAYERS`, `CACHE_TTL_STANDINGS`, `CACHE_TTL_TRANSACTIONS` -
    ///   per-category TTL in seconds (defaults: 3600, 900, 120, 86400, 1800, 600)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let ttl = defaults.cache_ttl;

        Self {
            server_port: env_or("PORT", defaults.server_port),
            mfl_base_url: env::var("MFL_BASE_URL")
                .ok()
                .map(|url| url.trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty())
                .unwrap_or(defaults.mfl_base_url),
            requests_per_second: env_or("MFL_REQUESTS_PER_SECOND", defaults.requests_per_second)
                .max(1),
            request_timeout: env_or("MFL_REQUEST_TIMEOUT_SECS", defaults.request_timeout),
            login_timeout: env_or("MFL_LOGIN_TIMEOUT_SECS", defaults.login_timeout),
            user_agent: env::var("MFL_USER_AGENT").unwrap_or(defaults.user_agent),
            session_ttl_hours: env_or("SESSION_TTL_HOURS", defaults.session_ttl_hours)
                .clamp(1, MAX_SESSION_TTL_HOURS),
            session_sweep_interval: env_or(
                "SESSION_SWEEP_INTERVAL",
                defaults.session_sweep_interval,
            )
            .max(1),
            cache_cleanup_interval: env_or(
                "CACHE_CLEANUP_INTERVAL",
                defaults.cache_cleanup_interval,
            )
            .max(1),
            cache_ttl: TtlPolicy {
                league_info: env_or("CACHE_TTL_LEAGUE_INFO", ttl.league_info),
                rosters: env_or("CACHE_TTL_ROSTERS", ttl.rosters),
                live_scores: env_or("CACHE_TTL_LIVE_SCORES", ttl.live_scores),
                players: env_or("CACHE_TTL_PLAYERS", ttl.players),
                standings: env_or("CACHE_TTL_STANDINGS", ttl.standings),
                transactions: env_or("CACHE_TTL_TRANSACTIONS", ttl.transactions),
            },
            rate_limit: RateLimitSettings {
                window_ms: env_or("RATE_LIMIT_WINDOW_MS", defaults.rate_limit.window_ms).max(1),
                max_requests: env_or(
                    "RATE_LIMIT_MAX_REQUESTS",
                    defaults.rate_limit.max_requests,
                )
                .max(1),
            },
        }
    }

    /// Points the proxy at a different upstream, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.mfl_base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            mfl_base_url: "https://api.myfantasyleague.com/2025".to_string(),
            requests_per_second: 2,
            request_timeout: 10,
            login_timeout: 8,
            user_agent: "MFL-Flutter-App/1.0".to_string(),
            session_ttl_hours: 8,
            session_sweep_interval: 3600,
            cache_cleanup_interval: 120,
            cache_ttl: TtlPolicy::default(),
            rate_limit: RateLimitSettings::default(),
        }
    }
}

/// Reads and parses an environment variable, falling back on absence or parse failure.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.requests_per_second, 2);
        assert_eq!(config.request_timeout, 10);
        assert_eq!(config.login_timeout, 8);
        assert_eq!(config.session_ttl_hours, 8);
        assert_eq!(config.session_sweep_interval, 3600);
        assert_eq!(config.cache_ttl, TtlPolicy::default());
        assert_eq!(config.rate_limit.window_ms, 60_000);
        assert_eq!(config.rate_limit.max_requests, 100);
    }

    #[test]
    fn test_from_env_clamps_out_of_range_values() {
        env::set_var("SESSION_TTL_HOURS", "9223372036854775807");
        env::set_var("SESSION_SWEEP_INTERVAL", "0");
        env::set_var("CACHE_CLEANUP_INTERVAL", "0");
        env::set_var("RATE_LIMIT_MAX_REQUESTS", "0");
        let config = Config::from_env();
        env::set_var("SESSION_TTL_HOURS", "-3");
        let negative = Config::from_env();
        for name in [
            "SESSION_TTL_HOURS",
            "SESSION_SWEEP_INTERVAL",
            "CACHE_CLEANUP_INTERVAL",
            "RATE_LIMIT_MAX_REQUESTS",
        ] {
            env::remove_var(name);
        }

        assert_eq!(config.session_ttl_hours, MAX_SESSION_TTL_HOURS);
        assert_eq!(config.session_sweep_interval, 1);
        assert_eq!(config.cache_cleanup_interval, 1);
        assert_eq!(config.rate_limit.max_requests, 1);
        assert_eq!(negative.session_ttl_hours, 1);
    }

    #[test]
    fn test_rate_limit_replenish() {
        assert_eq!(RateLimitSettings::default().replenish_ms(), 600);

        let tight = RateLimitSettings {
            window_ms: 10,
            max_requests: 1000,
        };
        assert_eq!(tight.replenish_ms(), 1);
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        env::set_var("MFL_PROXY_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_or("MFL_PROXY_TEST_GARBAGE", 42u64), 42);
        env::remove_var("MFL_PROXY_TEST_GARBAGE");

        assert_eq!(env_or("MFL_PROXY_TEST_UNSET", 7u32), 7);
    }

    #[test]
    fn test_env_or_parses_value() {
        env::set_var("MFL_PROXY_TEST_PARSE", " 15 ");
        assert_eq!(env_or("MFL_PROXY_TEST_PARSE", 0u64), 15);
        env::remove_var("MFL_PROXY_TEST_PARSE");
    }

    #[test]
    fn test_with_base_url_strips_trailing_slash() {
        let config = Config::default().with_base_url("http://127.0.0.1:9000/");
        assert_eq!(config.mfl_base_url, "http://127.0.0.1:9000");
    }
}
