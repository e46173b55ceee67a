//! Cacheability and expiration for a single fetched page.
//!
//! Follows the RFC 7234 storage rules from the point of view of a shared cache.
//! A cacheable response without explicit freshness expires 24 hours after the
//! fetch; no `Last-Modified` heuristic is applied.

use chrono::{DateTime, TimeDelta, Utc};

use super::directives::{RequestDirectives, ResponseDirectives};
use crate::headers::CanonicalHeaders;
use crate::response::FetchResult;

/// Freshness lifetime applied when a cacheable response carries no explicit one.
pub const DEFAULT_FRESHNESS_SECS: i64 = 24 * 60 * 60;

/// Status codes cacheable by default (RFC 7231 §6.1).
const CACHEABLE_BY_DEFAULT: [u16; 11] = [200, 203, 204, 206, 300, 301, 404, 405, 410, 414, 501];

/// Why a response must not be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotCacheableReason {
    /// Method other than GET/HEAD, or POST without explicit freshness.
    RequestMethod(String),
    RequestNoStore,
    /// Authenticated request without `must-revalidate`, `public` or `s-maxage`.
    RequestAuthorization,
    ResponsePrivate,
    ResponseNoStore,
    /// No explicit freshness, not `public`, and a status that is not cacheable by default.
    ResponseUncacheableByDefault,
    /// Splash reported no response section.
    MissingResponse,
}

/// Which rule produced the expiration instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirationSource {
    SMaxAge,
    MaxAge,
    Expires,
    Default,
    /// Not cacheable: stale immediately.
    Uncacheable,
}

/// Outcome of evaluating one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheDecision {
    pub cacheable: bool,
    pub expires_at: DateTime<Utc>,
    pub source: ExpirationSource,
    pub reasons: Vec<NotCacheableReason>,
    /// Parsed `Last-Modified`, reported for revalidation by the caller.
    pub last_modified: Option<DateTime<Utc>>,
}

/// Inputs of the evaluation, extracted from a [`FetchResult`].
struct CacheObject<'a> {
    method: String,
    status: u16,
    req_headers: &'a CanonicalHeaders,
    req_directives: RequestDirectives,
    resp_directives: ResponseDirectives,
    expires: Option<DateTime<Utc>>,
    date: Option<DateTime<Utc>>,
    last_modified: Option<DateTime<Utc>>,
}

impl<'a> CacheObject<'a> {
    fn new(req_headers: &'a CanonicalHeaders, resp_headers: &CanonicalHeaders, method: &str, status: u16) -> Self {
        let method = if method.trim().is_empty() { "GET".to_string() } else { method.trim().to_ascii_uppercase() };
        Self {
            method,
            status,
            req_headers,
            req_directives: RequestDirectives::parse(&req_headers.get_joined("Cache-Control").unwrap_or_default()),
            resp_directives: ResponseDirectives::parse(&resp_headers.get_joined("Cache-Control").unwrap_or_default()),
            expires: http_date(resp_headers, "Expires"),
            date: http_date(resp_headers, "Date"),
            last_modified: http_date(resp_headers, "Last-Modified"),
        }
    }

    fn has_explicit_freshness(&self) -> bool {
        self.resp_directives.s_maxage.is_some() || self.resp_directives.max_age.is_some() || self.expires.is_some()
    }

    fn reasons(&self) -> Vec<NotCacheableReason> {
        let mut reasons = Vec::new();

        match self.method.as_str() {
            "GET" | "HEAD" => {}
            "POST" if self.has_explicit_freshness() => {}
            other => reasons.push(NotCacheableReason::RequestMethod(other.to_string())),
        }

        if self.req_directives.no_store {
            reasons.push(NotCacheableReason::RequestNoStore);
        }

        let resp = &self.resp_directives;
        if self.req_headers.contains("Authorization") && !(resp.must_revalidate || resp.public || resp.s_maxage.is_some())
        {
            reasons.push(NotCacheableReason::RequestAuthorization);
        }

        if resp.private {
            reasons.push(NotCacheableReason::ResponsePrivate);
        }
        if resp.no_store {
            reasons.push(NotCacheableReason::ResponseNoStore);
        }

        if !(self.has_explicit_freshness() || resp.public || CACHEABLE_BY_DEFAULT.contains(&self.status)) {
            reasons.push(NotCacheableReason::ResponseUncacheableByDefault);
        }

        reasons
    }

    fn expiration(&self, now: DateTime<Utc>) -> (DateTime<Utc>, ExpirationSource) {
        let resp = &self.resp_directives;
        if let Some(s_maxage) = resp.s_maxage {
            return (now + seconds(s_maxage), ExpirationSource::SMaxAge);
        }
        if let Some(max_age) = resp.max_age {
            return (now + seconds(max_age), ExpirationSource::MaxAge);
        }
        if let Some(expires) = self.expires {
            // Expires is relative to the origin's clock.
            let server_now = self.date.unwrap_or(now);
            return (now + (expires - server_now), ExpirationSource::Expires);
        }
        (now + TimeDelta::seconds(DEFAULT_FRESHNESS_SECS), ExpirationSource::Default)
    }
}

fn seconds(delta: u64) -> TimeDelta {
    TimeDelta::seconds(i64::try_from(delta).unwrap_or(i64::MAX / 1000))
}

/// Parse an HTTP-date header; absent or malformed values count as absent.
fn http_date(headers: &CanonicalHeaders, name: &str) -> Option<DateTime<Utc>> {
    let raw = headers.get(name)?;
    match httpdate::parse_http_date(raw.trim()) {
        Ok(time) => Some(DateTime::<Utc>::from(time)),
        Err(_) => {
            tracing::debug!(header = name, value = raw, "unparseable HTTP-date; treated as absent");
            None
        }
    }
}

/// Decide whether `result` may be cached and until when, as of `now`.
pub fn evaluate(result: &FetchResult, now: DateTime<Utc>) -> CacheDecision {
    let Some(response) = result.response.as_ref() else {
        return CacheDecision {
            cacheable: false,
            expires_at: now,
            source: ExpirationSource::Uncacheable,
            reasons: vec![NotCacheableReason::MissingResponse],
            last_modified: None,
        };
    };

    let empty = CanonicalHeaders::default();
    let (method, req_headers) = match result.request.as_ref() {
        Some(req) => (req.method.as_str(), &req.headers),
        None => ("GET", &empty),
    };

    let obj = CacheObject::new(req_headers, &response.headers, method, response.status);
    let reasons = obj.reasons();

    if reasons.is_empty() {
        let (expires_at, source) = obj.expiration(now);
        CacheDecision { cacheable: true, expires_at, source, reasons, last_modified: obj.last_modified }
    } else {
        CacheDecision {
            cacheable: false,
            expires_at: now,
            source: ExpirationSource::Uncacheable,
            reasons,
            last_modified: obj.last_modified,
        }
    }
}

impl FetchResult {
    /// Evaluate the cache policy as of `now` and record it on the result.
    pub fn apply_cache_policy(&mut self, now: DateTime<Utc>) -> CacheDecision {
        let decision = evaluate(self, now);
        self.cacheable = decision.cacheable;
        self.expires_at = Some(decision.expires_at);

        tracing::debug!(
            url = self.request_url().unwrap_or_default(),
            cacheable = decision.cacheable,
            expires_at = %decision.expires_at,
            source = ?decision.source,
            reasons = ?decision.reasons,
            "cache policy evaluated"
        );

        decision
    }
}

/// Cache metadata for `result`: the recorded decision if the evaluator already
/// ran, otherwise a fresh evaluation as of now.
pub fn get_cache_policy(result: &FetchResult) -> (bool, DateTime<Utc>) {
    match result.expires_at {
        Some(expires_at) => (result.cacheable, expires_at),
        None => {
            let decision = evaluate(result, Utc::now());
            (decision.cacheable, decision.expires_at)
        }
    }
}
