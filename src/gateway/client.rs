use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use super::request::{Attempt, Body, RequestDescriptor};
use super::response::ApiResponse;
use crate::config::Config;
use crate::error::GatewayError;
use crate::refresh::{HttpRefresher, RefreshCoordinator, TokenRefresher};
use crate::store::{CredentialKey, CredentialStore};

/// HTTP client that keeps callers authorized.
///
/// Cheap to clone; clones share the credential store and the refresh
/// coordinator, so concurrent calls from any clone coalesce onto one refresh.
#[derive(Clone)]
pub struct Gateway {
    http: reqwest::Client,
    base_url: Url,
    store: Arc<dyn CredentialStore>,
    refresher: Arc<dyn TokenRefresher>,
    coordinator: Arc<RefreshCoordinator>,
}

impl Gateway {
    /// Gateway talking to the configured backend, refreshing via its refresh endpoint.
    pub fn new(config: &Config, store: Arc<dyn CredentialStore>) -> Result<Self, GatewayError> {
        let refresher = Arc::new(HttpRefresher::from_config(config)?);
        Self::with_refresher(config, store, refresher, Arc::new(RefreshCoordinator::new()))
    }

    /// Gateway with an explicit refresher and coordinator.
    pub fn with_refresher(
        config: &Config,
        store: Arc<dyn CredentialStore>,
        refresher: Arc<dyn TokenRefresher>,
        coordinator: Arc<RefreshCoordinator>,
    ) -> Result<Self, GatewayError> {
        let base_url = Url::parse(&config.api_base_url).map_err(|e| {
            GatewayError::InvalidRequest(format!("bad API base URL {:?}: {e}", config.api_base_url))
        })?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url,
            store,
            refresher,
            coordinator,
        })
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    /// Send `request`, attaching the stored access token.
    ///
    /// A 401 triggers (or joins) a credential refresh and the request is
    /// replayed once with the new token. A second 401, and every other
    /// failure, goes straight back to the caller.
    pub async fn send(&self, request: &RequestDescriptor) -> Result<ApiResponse, GatewayError> {
        let mut attempt = Attempt::default();
        let mut access = self.store.get(CredentialKey::AccessToken);

        loop {
            match self.transmit(request, access.as_deref()).await {
                Err(GatewayError::Unauthorized { body }) if attempt.can_replay() => {
                    attempt = attempt.next();
                    debug!(
                        method = %request.method(),
                        target = request.target(),
                        "Unauthorized; refreshing credentials before replay"
                    );
                    let token = self
                        .coordinator
                        .refresh(self.store.as_ref(), self.refresher.as_ref(), body)
                        .await?;
                    access = Some(token);
                }
                outcome => return outcome,
            }
        }
    }

    /// GET `target` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, target: &str) -> Result<T, GatewayError> {
        self.send(&RequestDescriptor::get(target)).await?.json()
    }

    /// POST `body` as JSON to `target` and decode the JSON reply.
    pub async fn post_json<B, T>(&self, target: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = RequestDescriptor::post(target).with_json(body)?;
        self.send(&request).await?.json()
    }

    /// One network round trip, classifying the response.
    async fn transmit(
        &self,
        request: &RequestDescriptor,
        access: Option<&str>,
    ) -> Result<ApiResponse, GatewayError> {
        let url = request.resolve(&self.base_url)?;

        let mut headers = request.headers().clone();
        if let Some(token) = access {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| GatewayError::InvalidRequest(format!("unusable access token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = self
            .http
            .request(request.method().clone(), url)
            .headers(headers);
        if !request.query().is_empty() {
            builder = builder.query(request.query());
        }
        builder = match request.body() {
            Body::Empty => builder,
            Body::Json(value) => builder.json(value),
        };

        let resp = builder.send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?.to_vec();

        debug!(
            method = %request.method(),
            target = request.target(),
            status = status.as_u16(),
            authenticated = access.is_some(),
            "Backend responded"
        );

        if status == StatusCode::UNAUTHORIZED {
            return Err(GatewayError::Unauthorized {
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        if !status.is_success() {
            return Err(GatewayError::Http {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
