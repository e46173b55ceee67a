//! HTTP cache policy for fetched pages.
//!
//! This module only decides; it never stores. It supports:
//!
//! - Request and response `Cache-Control` parsing
//! - RFC 7234 storage rules for a shared cache
//! - Expiration by `s-maxage`, `max-age`, `Expires`, or a 24h default

pub mod directives;
pub mod policy;

pub use directives::{MaxStale, RequestDirectives, ResponseDirectives};
pub use policy::{
    CacheDecision, DEFAULT_FRESHNESS_SECS, ExpirationSource, NotCacheableReason, evaluate, get_cache_policy,
};
