//! Unified error types for splashkit.
//!
//! Every failure a caller can observe from a fetch maps to exactly one variant.
//! The transient empty-response condition never appears here: it is resolved
//! inside the fetcher, and only an unrecoverable retry surfaces as
//! [`Error::TransientRetryFailed`].

/// Unified error types for the Splash fetch pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Network or connection failure while talking to Splash.
    #[error("TRANSPORT_ERROR: {0}")]
    Transport(String),

    /// Splash returned a body that is not the expected JSON.
    #[error("DECODE_ERROR: {0}")]
    Decode(String),

    /// Splash answered 504.
    #[error("GATEWAY_TIMEOUT")]
    GatewayTimeout,

    /// Target page returned 404 (Splash error `http404`).
    #[error("NOT_FOUND: {0}")]
    NotFound(String),

    /// Target page returned 403 (Splash error `http403`).
    #[error("FORBIDDEN: {0}")]
    Forbidden(String),

    /// Target host could not be resolved (Splash error `network3`).
    #[error("INVALID_HOST: {0}")]
    InvalidHost(String),

    /// Any other error code reported by Splash.
    #[error("PROXY_ERROR: {0}")]
    Proxy(String),

    /// The rendered page's own response was not OK.
    #[error("UPSTREAM_HTTP_ERROR: {}", upstream_message(.status, .text))]
    UpstreamHttp { status: u16, text: String },

    /// Non-200 reply from Splash without a recognized shape; carries the raw body.
    #[error("GENERIC: {0}")]
    Generic(String),

    /// Splash produced an empty reply and the reset-and-retry cycle could not recover.
    #[error("TRANSIENT_RETRY_FAILED: {0}")]
    TransientRetryFailed(String),

    /// robots.txt content could not be base64-decoded.
    #[error("CONTENT_DECODE_ERROR: {0}")]
    ContentDecode(String),

    /// Invalid target or proxy URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// The local fetch deadline elapsed.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),
}

/// Message for a non-OK inner response: the status text alone when Splash
/// reports status 0 (no HTTP exchange happened), `"<status>. <text>"` otherwise.
pub fn upstream_message(status: &u16, text: &str) -> String {
    if *status == 0 { text.to_string() } else { format!("{status}. {text}") }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

impl Error {
    /// Whether the failure describes the target resource rather than the proxy.
    pub fn is_target_failure(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_) | Error::Forbidden(_) | Error::InvalidHost(_) | Error::UpstreamHttp { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NotFound("https://example.com/missing".to_string());
        assert!(err.to_string().contains("NOT_FOUND"));
        assert!(err.to_string().contains("https://example.com/missing"));

        assert_eq!(Error::GatewayTimeout.to_string(), "GATEWAY_TIMEOUT");
    }

    #[test]
    fn test_upstream_message_with_status() {
        let err = Error::UpstreamHttp { status: 500, text: "Internal Server Error".to_string() };
        assert_eq!(err.to_string(), "UPSTREAM_HTTP_ERROR: 500. Internal Server Error");
    }

    #[test]
    fn test_upstream_message_zero_status() {
        let err = Error::UpstreamHttp { status: 0, text: "Connection refused".to_string() };
        assert_eq!(err.to_string(), "UPSTREAM_HTTP_ERROR: Connection refused");
    }

    #[test]
    fn test_json_error_maps_to_decode() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err().into();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_is_target_failure() {
        assert!(Error::Forbidden("u".into()).is_target_failure());
        assert!(!Error::GatewayTimeout.is_target_failure());
        assert!(!Error::Transport("refused".into()).is_target_failure());
    }
}
