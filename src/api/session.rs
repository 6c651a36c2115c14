use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::GatewayError;
use crate::gateway::{ApiResponse, Gateway, RequestDescriptor};
use crate::store::{clear_credentials, CredentialKey};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Credential pair issued by the login endpoint.
#[derive(Debug, Deserialize)]
struct TokenPair {
    access: String,
    refresh: String,
}

/// Login state of the user behind a gateway.
///
/// The session is the only writer of a *fresh* credential pair; the gateway
/// itself only ever replaces the access token or clears both.
pub struct Session<'a> {
    gateway: &'a Gateway,
}

impl<'a> Session<'a> {
    pub fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    /// Exchange email/password for a credential pair and store it.
    pub async fn login(&self, request: &LoginRequest) -> Result<(), GatewayError> {
        let tokens: TokenPair = self.gateway.post_json("/auth/login/", request).await?;

        let store = self.gateway.store();
        store.set(CredentialKey::AccessToken, &tokens.access);
        store.set(CredentialKey::RefreshToken, &tokens.refresh);
        info!("Logged in as {}", request.email);
        Ok(())
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<ApiResponse, GatewayError> {
        let descriptor = RequestDescriptor::post("/auth/register/").with_json(request)?;
        let resp = self.gateway.send(&descriptor).await?;
        info!("Registered {}", request.username);
        Ok(resp)
    }

    /// Forget both credentials.
    pub fn logout(&self) {
        clear_credentials(self.gateway.store().as_ref());
        info!("Logged out");
    }

    pub fn is_authenticated(&self) -> bool {
        self.gateway
            .store()
            .get(CredentialKey::AccessToken)
            .is_some()
    }
}
