use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::GatewayError;

/// A successful (2xx) backend response, fully buffered.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, GatewayError> {
        serde_json::from_slice(&self.body).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Questions {
        questions: Vec<String>,
    }

    fn response(body: &str) -> ApiResponse {
        ApiResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_json_decode() {
        let parsed: Questions = response(r#"{"questions":["a","b"]}"#).json().unwrap();
        assert_eq!(parsed.questions, vec!["a", "b"]);
    }

    #[test]
    fn test_json_decode_error() {
        let err = response("<html>").json::<Questions>().unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }
}
