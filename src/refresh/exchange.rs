use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{GatewayError, RefreshError};

/// Exchanges a refresh token for a new access token.
///
/// Called at most once per refresh episode.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<String, RefreshError>;
}

/// Refresher backed by the backend's `POST /auth/refresh/` endpoint.
///
/// The call goes out on its own absolute URL and never carries the
/// (rejected) bearer credential.
pub struct HttpRefresher {
    refresh_url: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

// Raw token response from the refresh endpoint
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
}

impl HttpRefresher {
    pub fn new(refresh_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            refresh_url: refresh_url.into(),
            http,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::new(config.refresh_url.clone(), http))
    }
}

#[async_trait]
impl TokenRefresher for HttpRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<String, RefreshError> {
        let resp = self
            .http
            .post(&self.refresh_url)
            .json(&RefreshRequest {
                refresh: refresh_token,
            })
            .send()
            .await
            .map_err(|e| RefreshError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RefreshError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let token_resp: RefreshResponse = resp
            .json()
            .await
            .map_err(|e| RefreshError::Malformed(e.to_string()))?;

        Ok(token_resp.access)
    }
}
