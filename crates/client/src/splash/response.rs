//! Replies of Splash's maintenance endpoints.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Raw reply of `/execute`: Splash's own HTTP status and the unparsed body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyReply {
    pub status: u16,
    pub body: Bytes,
}

impl ProxyReply {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self { status, body: body.into() }
    }
}

/// Reply of `POST /_gc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_args_removed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pyobjects_collected: Option<u64>,
}

impl GcResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Reply of `GET /_ping`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingResponse {
    pub status: String,
    #[serde(default)]
    pub maxrss: u64,
    /// Fields added by newer Splash versions.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_gc() {
        let gc: GcResponse =
            serde_json::from_str(r#"{"status": "ok", "cached_args_removed": 3, "pyobjects_collected": 812}"#).unwrap();
        assert!(gc.is_ok());
        assert_eq!(gc.cached_args_removed, Some(3));

        let gc: GcResponse = serde_json::from_str(r#"{"status": "error"}"#).unwrap();
        assert!(!gc.is_ok());
    }

    #[test]
    fn test_deserialize_ping() {
        let ping: PingResponse = serde_json::from_str(r#"{"status": "ok", "maxrss": 203960, "version": "3.5"}"#).unwrap();
        assert_eq!(ping.status, "ok");
        assert_eq!(ping.maxrss, 203960);
        assert_eq!(ping.extra.get("version").and_then(|v| v.as_str()), Some("3.5"));
    }
}
