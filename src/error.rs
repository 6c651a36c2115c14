use reqwest::StatusCode;

/// Unified error type for every call issued through the gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    // ── Auth Errors ─────────────────────────────────────────────────────
    #[error("Authorization failed: {body}")]
    Unauthorized { body: String },

    #[error("Authorization failed and no refresh token is available: {body}")]
    RefreshUnavailable { body: String },

    #[error("Token refresh failed: {0}")]
    RefreshFailed(RefreshError),

    #[error("Token refresh was abandoned before completing")]
    RefreshAbandoned,

    // ── Response Errors ─────────────────────────────────────────────────
    #[error("HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    // ── Internal ────────────────────────────────────────────────────────
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl GatewayError {
    /// HTTP status carried by the error, if the backend produced one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GatewayError::Unauthorized { .. } | GatewayError::RefreshUnavailable { .. } => {
                Some(StatusCode::UNAUTHORIZED)
            }
            GatewayError::Http { status, .. } => Some(*status),
            GatewayError::RefreshFailed(RefreshError::Rejected { status, .. }) => {
                StatusCode::from_u16(*status).ok()
            }
            GatewayError::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Both stored credentials were cleared; the user has to log in again.
    ///
    /// Only a finished, failed exchange clears them. An abandoned refresh
    /// leaves the session as it was.
    pub fn is_session_ended(&self) -> bool {
        matches!(self, GatewayError::RefreshFailed(_))
    }
}

/// Outcome of a failed credential exchange.
///
/// Cloned verbatim to every caller waiting on the same refresh episode,
/// so all of them observe the identical cause.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefreshError {
    #[error("refresh endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("refresh request failed: {0}")]
    Transport(String),

    #[error("malformed refresh response: {0}")]
    Malformed(String),

    #[error("refresh was abandoned before completing")]
    Abandoned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err = GatewayError::Unauthorized { body: String::new() };
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));

        let err = GatewayError::Http {
            status: StatusCode::FORBIDDEN,
            body: "nope".into(),
        };
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert!(!err.is_session_ended());

        let err = GatewayError::RefreshFailed(RefreshError::Rejected {
            status: 401,
            body: "expired".into(),
        });
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert!(err.is_session_ended());

        let err = GatewayError::RefreshUnavailable {
            body: "No active account found".into(),
        };
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert!(err.to_string().contains("No active account found"));
        assert!(!err.is_session_ended());

        assert_eq!(GatewayError::RefreshAbandoned.status(), None);
        assert!(!GatewayError::RefreshAbandoned.is_session_ended());
    }
}
