pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod refresh;
pub mod store;

pub use config::Config;
pub use error::{GatewayError, RefreshError};
pub use gateway::{ApiResponse, Gateway, RequestDescriptor};
pub use refresh::{RefreshCoordinator, TokenRefresher};
pub use store::{CredentialKey, CredentialStore};
