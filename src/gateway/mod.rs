//! Authenticated request gateway.
//!
//! Every outbound backend call goes through [`Gateway::send`], which attaches
//! the current bearer credential and transparently recovers from one
//! authorization failure per request via the shared refresh coordinator.

mod client;
mod request;
mod response;

pub use client::Gateway;
pub use request::{Attempt, Body, RequestDescriptor, RETRY_BUDGET};
pub use response::ApiResponse;
