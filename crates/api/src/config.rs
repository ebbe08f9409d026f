use std::time::Duration;

use watchgate_engine::ResolverConfig;
use watchgate_plex::PlexConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5555`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Media server connection. `None` when `PLEX_URL` or `PLEX_TOKEN` is unset.
    pub plex: Option<PlexConfig>,
    /// Session resolution timing.
    pub resolver: ResolverConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                 |
    /// |-----------------------------|-------------------------|
    /// | `HOST`                      | `0.0.0.0`               |
    /// | `PORT`                      | `5555`                  |
    /// | `CORS_ORIGINS`              | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                    |
    /// | `PLEX_URL` / `PLEX_TOKEN`   | unset                   |
    /// | `PLEX_TIMEOUT_SECS`         | `10`                    |
    /// | `PLEX_ACCEPT_INVALID_CERTS` | `false`                 |
    /// | `SESSION_SETTLE_MS`         | `2000`                  |
    /// | `SESSION_MAX_WAIT_MS`       | `0`                     |
    /// | `SESSION_POLL_INTERVAL_MS`  | `500`                   |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = env_parse("PORT", "5555");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_parse("REQUEST_TIMEOUT_SECS", "30");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            plex: plex_from_env(),
            resolver: resolver_from_env(),
        }
    }
}

fn plex_from_env() -> Option<PlexConfig> {
    let base_url = non_empty_var("PLEX_URL")?;
    let token = non_empty_var("PLEX_TOKEN")?;

    Some(PlexConfig {
        base_url,
        token,
        timeout: Duration::from_secs(env_parse("PLEX_TIMEOUT_SECS", "10")),
        accept_invalid_certs: env_parse("PLEX_ACCEPT_INVALID_CERTS", "false"),
    })
}

fn resolver_from_env() -> ResolverConfig {
    ResolverConfig {
        settle_delay: Duration::from_millis(env_parse("SESSION_SETTLE_MS", "2000")),
        max_wait: Duration::from_millis(env_parse("SESSION_MAX_WAIT_MS", "0")),
        poll_interval: Duration::from_millis(env_parse("SESSION_POLL_INTERVAL_MS", "500")),
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse `name` or `default`, failing fast at startup on a bad value.
fn env_parse<T>(name: &str, default: &str) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(name).unwrap_or_else(|_| default.into());
    raw.trim()
        .parse()
        .unwrap_or_else(|e| panic!("{name} must be a valid {}: {e}", std::any::type_name::<T>()))
}
