//! Splash HTTP API client.
//!
//! Provides the transport to a Splash rendering service.
//!
//! ### Endpoints
//!
//! - **`GET /execute`**: runs a Lua script against the target URL; the reply is
//!   the JSON the script returns (see [`scripts`]).
//! - **`POST /_gc`**: runs Splash's garbage collector and clears WebKit caches.
//!   Used to recover from empty replies.
//! - **`GET /_ping`**: health check with the service's memory usage.
//!
//! Render budgets (`timeout`, `resource_timeout`, `wait`) are enforced by
//! Splash; this client only enforces a per-call HTTP timeout.

pub mod response;
pub mod scripts;
pub mod url;

pub use response::{GcResponse, PingResponse, ProxyReply};
pub use scripts::{BASE_SCRIPT, ROBOTS_SCRIPT, script_for};
pub use self::url::{endpoint_url, execute_url, lua_table};

use reqwest::header;
use splashkit_core::{Error, FetchRequest, SplashConfig};
use std::time::Instant;

/// The three Splash calls the fetcher needs.
///
/// [`SplashClient`] talks HTTP; tests substitute scripted transports.
#[async_trait::async_trait]
pub trait SplashTransport: Send + Sync {
    /// Render `req` and return Splash's reply without interpreting it.
    async fn execute(&self, req: &FetchRequest) -> Result<ProxyReply, Error>;

    /// Clear Splash's render caches.
    async fn gc(&self) -> Result<GcResponse, Error>;

    /// Health check.
    async fn ping(&self) -> Result<PingResponse, Error>;
}

/// HTTP client for one Splash service.
#[derive(Debug, Clone)]
pub struct SplashClient {
    http: reqwest::Client,
    config: SplashConfig,
}

impl SplashClient {
    /// Create a new Splash client with the given configuration.
    pub fn new(config: SplashConfig) -> Result<Self, Error> {
        // Fail on a bad host now rather than on first use.
        self::url::base_url(&config)?;

        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.http_timeout())
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &SplashConfig {
        &self.config
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, Error> {
        let response = request.header(header::ACCEPT, "application/json").send().await.map_err(transport_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(transport_error)?;
        if !status.is_success() {
            return Err(Error::Generic(String::from_utf8_lossy(&bytes).into_owned()));
        }

        serde_json::from_slice(&bytes).map_err(|e| Error::Decode(e.to_string()))
    }
}

fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() { Error::FetchTimeout(err.to_string()) } else { Error::Transport(err.to_string()) }
}

#[async_trait::async_trait]
impl SplashTransport for SplashClient {
    async fn execute(&self, req: &FetchRequest) -> Result<ProxyReply, Error> {
        let start = Instant::now();
        let url = execute_url(&self.config, req)?;

        tracing::debug!("rendering {} via Splash at {}", req.url, self.config.host);

        let response = self.http.get(url).send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(transport_error)?;

        tracing::debug!(
            "Splash replied {} for {} in {}ms ({} bytes)",
            status,
            req.url,
            start.elapsed().as_millis(),
            body.len()
        );

        Ok(ProxyReply { status, body })
    }

    async fn gc(&self) -> Result<GcResponse, Error> {
        let url = endpoint_url(&self.config, "_gc")?;
        self.get_json(self.http.post(url)).await
    }

    async fn ping(&self) -> Result<PingResponse, Error> {
        let url = endpoint_url(&self.config, "_ping")?;
        self.get_json(self.http.get(url)).await
    }
}
