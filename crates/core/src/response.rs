//! Splash `/execute` reply model and decoding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::headers::CanonicalHeaders;
use crate::request::is_robots_txt;

/// Request as echoed back by Splash for the final history entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnerRequest {
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub headers: CanonicalHeaders,
}

fn default_method() -> String {
    "GET".into()
}

/// Body of the target's response. `text` is base64 when Splash was asked for
/// the raw body (the robots script), otherwise usually empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseContent {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

/// The target's response as reported by Splash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InnerResponse {
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub headers: CanonicalHeaders,
    #[serde(default)]
    pub content: ResponseContent,
}

/// Decoded Splash reply plus the cache decision for it.
///
/// `cacheable` and `expires_at` stay at their zero values until the cache
/// evaluator has run on a successful result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    #[serde(default)]
    pub html: String,

    /// Splash error code such as `http404`; empty when none.
    #[serde(default, rename = "error")]
    pub proxy_error: String,

    #[serde(default)]
    pub request: Option<InnerRequest>,

    #[serde(default)]
    pub response: Option<InnerResponse>,

    #[serde(default)]
    pub cacheable: bool,

    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl FetchResult {
    /// Decode a Splash `/execute` body.
    ///
    /// Missing fields are not errors. Malformed JSON, or response headers in map
    /// form with non-string values, fail with [`Error::Decode`].
    pub fn decode(body: &[u8]) -> Result<Self, Error> {
        Ok(serde_json::from_slice(body)?)
    }

    /// URL Splash reports it fetched, if the request section is present.
    pub fn request_url(&self) -> Option<&str> {
        self.request.as_ref().map(|r| r.url.as_str())
    }

    /// Page content for the requested `target_url`: the decoded raw body for
    /// robots.txt, rendered HTML otherwise.
    ///
    /// The requested URL decides, not the one Splash echoes back, since it is
    /// also what picked the script and so the shape of the reply.
    pub fn content(&self, target_url: &str) -> Result<Vec<u8>, Error> {
        if !self.proxy_error.is_empty() {
            return Err(Error::Proxy(self.proxy_error.clone()));
        }
        if is_robots_txt(target_url) { self.raw_body() } else { Ok(self.html_bytes()) }
    }

    /// Rendered HTML, unmodified.
    pub fn html_bytes(&self) -> Vec<u8> {
        self.html.as_bytes().to_vec()
    }

    /// The target's raw response body, base64-decoded.
    pub fn raw_body(&self) -> Result<Vec<u8>, Error> {
        let text = self
            .response
            .as_ref()
            .map(|r| r.content.text.as_str())
            .ok_or_else(|| Error::ContentDecode("reply has no response section".into()))?;

        STANDARD.decode(text.trim()).map_err(|e| Error::ContentDecode(e.to_string()))
    }
}
