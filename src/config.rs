use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// Client configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // ── Backend ─────────────────────────────────────────────────────────
    /// Base URL that relative request targets are joined onto.
    pub api_base_url: String,
    /// Absolute URL of the credential refresh endpoint.
    pub refresh_url: String,
    pub request_timeout: Duration,

    // ── Session ─────────────────────────────────────────────────────────
    /// Where `FileStore` keeps the credential pair between runs.
    pub credentials_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self::for_base_url(DEFAULT_API_BASE_URL)
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let api_base_url =
            std::env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.into());
        let refresh_url =
            std::env::var("REFRESH_URL").unwrap_or_else(|_| default_refresh_url(&api_base_url));

        Ok(Config {
            refresh_url,
            request_timeout: Duration::from_secs(
                std::env::var("REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".into())
                    .parse()
                    .context("Invalid REQUEST_TIMEOUT_SECS")?,
            ),
            credentials_path: std::env::var("CREDENTIALS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".interview-prep/credentials.json")),
            api_base_url,
        })
    }

    /// Config pointing at `base_url`, everything else defaulted.
    pub fn for_base_url(base_url: &str) -> Self {
        Config {
            api_base_url: base_url.to_string(),
            refresh_url: default_refresh_url(base_url),
            request_timeout: Duration::from_secs(30),
            credentials_path: PathBuf::from(".interview-prep/credentials.json"),
        }
    }
}

/// The refresh endpoint lives under the API base unless configured otherwise.
fn default_refresh_url(base_url: &str) -> String {
    format!("{}/auth/refresh/", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_refresh_url() {
        assert_eq!(
            default_refresh_url("http://localhost:8000/api"),
            "http://localhost:8000/api/auth/refresh/"
        );
        assert_eq!(
            default_refresh_url("http://localhost:8000/api/"),
            "http://localhost:8000/api/auth/refresh/"
        );
    }

    #[test]
    fn test_for_base_url() {
        let config = Config::for_base_url("http://127.0.0.1:9000/api");
        assert_eq!(config.refresh_url, "http://127.0.0.1:9000/api/auth/refresh/");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
