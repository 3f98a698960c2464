//! # Core Configuration
//!
//! Connection endpoints and tuning knobs, with environment overrides for
//! development setups.

use std::path::PathBuf;
use std::time::Duration;

use crate::cache::CacheConfig;

/// Base URL for the backend API server.
const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8080/api";

#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// REST endpoint prefix, without a trailing slash.
    pub api_base_url: String,
    /// Realtime telemetry endpoint.
    pub realtime_url: String,
    /// Per-request timeout; keeps a dead backend from freezing callers.
    pub request_timeout: Duration,
    pub cache: CacheConfig,
    /// Session file location; `None` means the platform default.
    pub session_file: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        let api_base_url = DEFAULT_API_BASE_URL.to_string();
        let realtime_url = realtime_url_for(&api_base_url);
        Self {
            api_base_url,
            realtime_url,
            request_timeout: Duration::from_secs(10),
            cache: CacheConfig::default(),
            session_file: None,
        }
    }
}

impl CoreConfig {
    /// Defaults with `API_BASE_URL` / `REALTIME_URL` environment overrides.
    /// When only the API url is overridden, the realtime url is derived
    /// from it.
    pub fn from_env() -> Self {
        let api_base_url =
            std::env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        let realtime_url =
            std::env::var("REALTIME_URL").unwrap_or_else(|_| realtime_url_for(&api_base_url));
        Self {
            api_base_url,
            realtime_url,
            ..Self::default()
        }
    }
}

fn realtime_url_for(api_base_url: &str) -> String {
    let origin = api_base_url.trim_end_matches("/api");
    origin
        .replace("http://", "ws://")
        .replace("https://", "wss://")
        + "/realtime"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realtime_url_derived_from_api_url() {
        assert_eq!(
            realtime_url_for("https://dispatch.example.com/api"),
            "wss://dispatch.example.com/realtime"
        );
        assert_eq!(
            realtime_url_for("http://127.0.0.1:8080/api"),
            "ws://127.0.0.1:8080/realtime"
        );
    }
}
