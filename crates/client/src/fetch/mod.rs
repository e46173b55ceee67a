//! Fetch pipeline through Splash with reset-and-retry and cache annotation.
//!
//! ### Pipeline
//! - Build the `/execute` URL and call Splash
//! - Classify the reply (HTTP status, Splash error code, empty reply, target status)
//! - On an empty reply: `POST /_gc`, then exactly one more attempt
//! - Evaluate the cache policy on the successful result
//!
//! ### Empty replies
//! `splash:history()` sometimes comes back empty when a URL is rendered twice
//! in quick succession (scrapinghub/splash#613). Clearing Splash's caches with
//! `/_gc` fixes it. If the reset fails, or the retry is empty again, the fetch
//! fails with `TRANSIENT_RETRY_FAILED`.
//!
//! ### Limits
//! - Per-call HTTP timeout from `SplashConfig::http_timeout_ms`
//! - Whole fetch, retry included, bounded by `SplashConfig::fetch_deadline_ms`

use std::io::Cursor;
use std::time::{Duration, Instant};

use bytes::Bytes;
use chrono::Utc;
use splashkit_core::{Error, FetchRequest, FetchResult, Outcome, SplashConfig};

use crate::splash::{SplashClient, SplashTransport};

/// Attempts per fetch: the first one plus a single retry after a reset.
pub const MAX_ATTEMPTS: usize = 2;

/// Fetches pages through Splash.
///
/// Holds only read-only state, so one fetcher can serve concurrent fetches.
pub struct Fetcher<T = SplashClient> {
    transport: T,
    deadline: Duration,
}

impl Fetcher<SplashClient> {
    /// Create a fetcher talking HTTP to the Splash service in `config`.
    pub fn new(config: SplashConfig) -> Result<Self, Error> {
        let deadline = config.fetch_deadline();
        Ok(Self { transport: SplashClient::new(config)?, deadline })
    }
}

impl<T: SplashTransport> Fetcher<T> {
    /// Create a fetcher over any transport.
    pub fn with_transport(transport: T, deadline: Duration) -> Self {
        Self { transport, deadline }
    }

    /// Fetch a page and return its content as a stream positioned at offset 0.
    ///
    /// robots.txt targets yield the raw, base64-decoded body; anything else
    /// yields the rendered HTML unmodified.
    pub async fn fetch(&self, req: &FetchRequest) -> Result<Cursor<Bytes>, Error> {
        let result = self.get_response(req).await?;
        Ok(Cursor::new(Bytes::from(result.content(&req.url)?)))
    }

    /// Fetch a page and return the classified, cache-annotated result.
    pub async fn get_response(&self, req: &FetchRequest) -> Result<FetchResult, Error> {
        tokio::time::timeout(self.deadline, self.fetch_with_retry(req))
            .await
            .map_err(|_| Error::FetchTimeout(format!("{} exceeded {}ms", req.url, self.deadline.as_millis())))?
    }

    /// Health check of the Splash service.
    pub async fn ping(&self) -> Result<crate::splash::PingResponse, Error> {
        self.transport.ping().await
    }

    /// Explicit reset of Splash's render caches.
    pub async fn gc(&self) -> Result<crate::splash::GcResponse, Error> {
        self.transport.gc().await
    }

    /// Get reference to the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn fetch_with_retry(&self, req: &FetchRequest) -> Result<FetchResult, Error> {
        let start = Instant::now();
        let mut outcome = self.attempt(req).await?;

        for attempt in 2..=MAX_ATTEMPTS {
            if !outcome.is_transient() {
                break;
            }
            tracing::warn!("empty reply from Splash for {}; resetting before attempt {}", req.url, attempt);
            self.reset().await?;
            outcome = self.attempt(req).await?;
        }

        let mut result = outcome.into_result(&req.url)?;
        result.apply_cache_policy(Utc::now());

        tracing::debug!(
            "fetched {} in {}ms (cacheable: {}, expires: {:?})",
            req.url,
            start.elapsed().as_millis(),
            result.cacheable,
            result.expires_at
        );

        Ok(result)
    }

    async fn attempt(&self, req: &FetchRequest) -> Result<Outcome, Error> {
        let reply = self.transport.execute(req).await?;
        Outcome::from_reply(reply.status, &reply.body)
    }

    async fn reset(&self) -> Result<(), Error> {
        let gc = self
            .transport
            .gc()
            .await
            .map_err(|e| Error::TransientRetryFailed(format!("Splash reset failed: {e}")))?;

        if gc.is_ok() {
            Ok(())
        } else {
            Err(Error::TransientRetryFailed(format!("Splash reset returned status {:?}", gc.status)))
        }
    }
}
