//! Core types and response engine for splashkit.
//!
//! This crate provides:
//! - Header normalization and decoding of Splash `/execute` replies
//! - Classification of replies into a single outcome type
//! - RFC 7234 cache policy evaluation
//! - Unified error types
//! - Configuration structures
//!
//! Nothing here performs I/O; the HTTP side lives in `splashkit-client`.

pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod headers;
pub mod request;
pub mod response;

pub use cache::{CacheDecision, evaluate, get_cache_policy};
pub use classify::Outcome;
pub use config::{ConfigError, SplashConfig};
pub use error::Error;
pub use headers::{CanonicalHeaders, RawHeaders, normalize};
pub use request::FetchRequest;
pub use response::{FetchResult, InnerRequest, InnerResponse, ResponseContent};
