//! Client code for splashkit.
//!
//! This crate provides the Splash HTTP transport and the fetch pipeline
//! (retry on empty replies, deadline, cache annotation) used by the CLI.

pub mod fetch;
pub mod splash;

pub use fetch::{Fetcher, MAX_ATTEMPTS};
pub use splash::{GcResponse, PingResponse, ProxyReply, SplashClient, SplashTransport};
