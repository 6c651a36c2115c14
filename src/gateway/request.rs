use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use url::Url;

use crate::error::GatewayError;

/// How many times a single request may be replayed after a credential refresh.
pub const RETRY_BUDGET: u8 = 1;

/// Payload of an outbound request. Cloned on every transmission, so replays
/// send exactly what the caller described.
#[derive(Debug, Clone, Default)]
pub enum Body {
    #[default]
    Empty,
    Json(serde_json::Value),
}

/// Immutable description of one backend call.
///
/// `target` is either a path relative to the API base (`/interview/setup/`)
/// or an absolute URL.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    target: String,
    headers: HeaderMap,
    query: Vec<(String, String)>,
    body: Body,
}

impl RequestDescriptor {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: Body::Empty,
        }
    }

    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::GET, target)
    }

    pub fn post(target: impl Into<String>) -> Self {
        Self::new(Method::POST, target)
    }

    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, GatewayError> {
        let value = serde_json::to_value(body)
            .map_err(|e| GatewayError::InvalidRequest(format!("unserializable body: {e}")))?;
        self.body = Body::Json(value);
        Ok(self)
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, GatewayError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| GatewayError::InvalidRequest(format!("bad header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| GatewayError::InvalidRequest(format!("bad value for {name}: {e}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Full URL of the call. Relative targets keep the base's path prefix,
    /// so `/interview/setup/` on `http://host/api` lands on `/api/interview/setup/`.
    pub fn resolve(&self, base: &Url) -> Result<Url, GatewayError> {
        if let Ok(absolute) = Url::parse(&self.target) {
            return Ok(absolute);
        }

        let joined = format!(
            "{}/{}",
            base.as_str().trim_end_matches('/'),
            self.target.trim_start_matches('/')
        );
        Url::parse(&joined)
            .map_err(|e| GatewayError::InvalidRequest(format!("bad target {:?}: {e}", self.target)))
    }
}

/// Transmission counter carried alongside a descriptor by [`super::Gateway::send`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Attempt(u8);

impl Attempt {
    pub fn replays(&self) -> u8 {
        self.0
    }

    /// Whether an authorization failure may still be recovered by refreshing.
    pub fn can_replay(&self) -> bool {
        self.0 < RETRY_BUDGET
    }

    pub fn next(self) -> Self {
        Attempt(self.0.saturating_add(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://localhost:8000/api").unwrap()
    }

    #[test]
    fn test_resolve_keeps_base_path() {
        let url = RequestDescriptor::post("/interview/setup/").resolve(&base()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/interview/setup/");

        let url = RequestDescriptor::get("auth/me/")
            .resolve(&Url::parse("http://localhost:8000/api/").unwrap())
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/auth/me/");
    }

    #[test]
    fn test_resolve_absolute_target() {
        let url = RequestDescriptor::get("https://other.example/health")
            .resolve(&base())
            .unwrap();
        assert_eq!(url.as_str(), "https://other.example/health");
    }

    #[test]
    fn test_builder() {
        let request = RequestDescriptor::post("/interview/setup/")
            .with_json(&serde_json::json!({ "page": 2 }))
            .unwrap()
            .with_header("X-Client", "cli")
            .unwrap()
            .with_query("lang", "en");

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.headers()["x-client"], "cli");
        assert_eq!(request.query(), &[("lang".to_string(), "en".to_string())]);
        assert!(matches!(request.body(), Body::Json(v) if v["page"] == 2));
    }

    #[test]
    fn test_bad_header_rejected() {
        let err = RequestDescriptor::get("/").with_header("bad header", "x").unwrap_err();
        assert!(matches!(err, GatewayError::InvalidRequest(_)));
    }

    #[test]
    fn test_attempt_budget() {
        let first = Attempt::default();
        assert!(first.can_replay());
        let replay = first.next();
        assert_eq!(replay.replays(), 1);
        assert!(!replay.can_replay());
    }
}
