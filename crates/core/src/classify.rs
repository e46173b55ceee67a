//! Classification of Splash replies.
//!
//! Splash signals failure three ways: the HTTP status of its own reply, an
//! `error` code in the JSON body, and the `ok` flag of the target's response.
//! All of them fold into one [`Outcome`].
//!
//! Precedence, highest first:
//! 1. HTTP status of the Splash reply (504, then any other non-200)
//! 2. Splash error code
//! 3. Transient empty reply
//! 4. Target response `ok` flag

use crate::Error;
use crate::response::FetchResult;

/// Splash error code for a 404 from the target.
pub const ERROR_HTTP_404: &str = "http404";
/// Splash error code for a 403 from the target.
pub const ERROR_HTTP_403: &str = "http403";
/// Splash error code for an unresolvable host.
pub const ERROR_NETWORK_3: &str = "network3";

/// Result of one round trip to Splash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 200 from Splash, no error code, response present and OK.
    Success(Box<FetchResult>),
    /// Splash answered 504.
    GatewayTimeout,
    /// Any other non-200 from Splash; carries the raw body.
    Generic(String),
    NotFound,
    Forbidden,
    InvalidHost,
    /// Unrecognized Splash error code.
    ProxyError(String),
    /// The target's response was not OK.
    UpstreamHttpError { status: u16, text: String },
    /// Splash lost its render data for a recently fetched URL. Resolved by a
    /// reset and one retry, never reported to callers.
    TransientEmptyResponse,
}

impl Outcome {
    /// Classify a raw Splash reply.
    ///
    /// The body is only decoded for a 200 reply, so a 504 with garbage is still
    /// a gateway timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if a 200 reply is not valid JSON.
    pub fn from_reply(http_status: u16, body: &[u8]) -> Result<Self, Error> {
        match http_status {
            200 => Ok(Self::from_result(FetchResult::decode(body)?)),
            504 => Ok(Outcome::GatewayTimeout),
            _ => Ok(Outcome::Generic(String::from_utf8_lossy(body).into_owned())),
        }
    }

    /// Classify a decoded 200 reply.
    pub fn from_result(result: FetchResult) -> Self {
        match result.proxy_error.as_str() {
            "" => {}
            ERROR_HTTP_404 => return Outcome::NotFound,
            ERROR_HTTP_403 => return Outcome::Forbidden,
            ERROR_NETWORK_3 => return Outcome::InvalidHost,
            code => return Outcome::ProxyError(code.to_string()),
        }

        // splash:history() comes back empty when the same URL is rendered twice
        // in quick succession.
        if result.request.is_none() && !result.html.is_empty() {
            return Outcome::TransientEmptyResponse;
        }
        let Some(response) = result.response.as_ref() else {
            return Outcome::TransientEmptyResponse;
        };

        if !response.ok {
            return Outcome::UpstreamHttpError { status: response.status, text: response.status_text.clone() };
        }

        Outcome::Success(Box::new(result))
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Outcome::TransientEmptyResponse)
    }

    /// Turn the outcome into the caller-facing result, attaching `url` to the
    /// target-level failures.
    pub fn into_result(self, url: &str) -> Result<FetchResult, Error> {
        match self {
            Outcome::Success(result) => Ok(*result),
            Outcome::GatewayTimeout => Err(Error::GatewayTimeout),
            Outcome::Generic(message) => Err(Error::Generic(message)),
            Outcome::NotFound => Err(Error::NotFound(url.to_string())),
            Outcome::Forbidden => Err(Error::Forbidden(url.to_string())),
            Outcome::InvalidHost => Err(Error::InvalidHost(url.to_string())),
            Outcome::ProxyError(code) => Err(Error::Proxy(code)),
            Outcome::UpstreamHttpError { status, text } => Err(Error::UpstreamHttp { status, text }),
            Outcome::TransientEmptyResponse => {
                Err(Error::TransientRetryFailed(format!("empty reply from Splash for {url}")))
            }
        }
    }
}
